#![allow(dead_code)]

pub use scripthook_test_utils::builders;
pub use scripthook_test_utils::fake_scripts;
pub use scripthook_test_utils::{init_tracing, settle, with_timeout};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use scripthook::engine::{CoreRuntime, RunSummary, Runtime, RuntimeEvent, ShutdownCoordinator};
use scripthook::events::Events;
use scripthook::exec::Scheduler;
use scripthook::loader::{ScriptMetadata, ScriptRef, ScriptUnit};

/// Unit without metadata.
pub fn unit(name: &str, entry: ScriptRef) -> ScriptUnit {
    ScriptUnit::new(name, ScriptMetadata::default(), entry)
}

/// A scheduling domain running on the test's runtime.
pub struct TestDomain {
    pub tx: mpsc::UnboundedSender<RuntimeEvent>,
    pub events: Arc<Events>,
    pub handle: JoinHandle<RunSummary>,
}

impl TestDomain {
    pub fn shutdown(&self) {
        self.tx.send(RuntimeEvent::ShutdownRequested).unwrap();
    }

    pub async fn finish(self) -> RunSummary {
        with_timeout(self.handle).await.expect("runtime task panicked")
    }
}

/// Start `units` and spawn the runtime loop with the given stop timeout.
pub fn start_domain(units: Vec<ScriptUnit>, stop_timeout: Duration) -> TestDomain {
    let events = Arc::new(Events::new());
    let mut scheduler = Scheduler::new(Arc::clone(&events));
    let registry = scheduler.start(units);

    let (tx, rx) = mpsc::unbounded_channel();
    let core = CoreRuntime::new(registry, ShutdownCoordinator::new(stop_timeout));
    let runtime = Runtime::new(core, rx, scheduler, Arc::clone(&events));
    let handle = tokio::spawn(runtime.run());

    TestDomain { tx, events, handle }
}
