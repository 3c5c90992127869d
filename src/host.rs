// src/host.rs

//! Host facade: the interface the native host (or the simulator) drives.
//!
//! Each [`ScriptHost::init`] starts a *session*: a dedicated worker thread
//! running a single-threaded Tokio runtime. That runtime is the scheduling
//! domain; the loader, the scheduler, the broadcaster and the runtime loop
//! all live on it. The host talks to a session only through an unbounded
//! channel of [`RuntimeEvent`]s, so `on_tick`/`on_key` never touch waiter
//! state from the host's own thread.

use std::collections::BTreeMap;
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::ConfigFile;
use crate::engine::classify::report_error;
use crate::engine::{
    CoreRuntime, RunSummary, Runtime, RuntimeEvent, ShutdownCoordinator, ShutdownPhase, TaskName,
    TaskState,
};
use crate::errors::{Result, ScriptError, ScripthookError};
use crate::events::{Events, KeyCode, KeyEvent, Modifiers};
use crate::exec::Scheduler;
use crate::loader::{DependencyInstaller, NoopInstaller, ScriptCatalog, ScriptLoader};
use crate::logging::{init_logging, LogTarget};

/// What the host should do after an `on_key` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    /// Delivered to the scripts (or dropped if no session is alive).
    Forwarded,
    /// Built-in stop chord (Ctrl+Delete released).
    Stop,
    /// Built-in restart chord (Ctrl+F12 released).
    Restart,
}

/// Result of [`ScriptHost::request_exit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    /// Instance number of the session that was shut down, if there was one.
    pub instance: Option<u64>,
    /// Final state per task. Empty if the worker did not report back.
    pub states: BTreeMap<TaskName, TaskState>,
    /// Scripts that ignored cancellation past the stop timeout.
    pub bad_behaving: Vec<TaskName>,
    /// Phase the shutdown coordinator ended in.
    pub phase: ShutdownPhase,
    /// Whether the worker terminated within the join timeout.
    pub graceful: bool,
}

impl ExitReport {
    fn no_session() -> Self {
        Self {
            instance: None,
            states: BTreeMap::new(),
            bad_behaving: Vec::new(),
            phase: ShutdownPhase::Idle,
            graceful: true,
        }
    }

    fn from_summary(instance: u64, summary: RunSummary) -> Self {
        Self {
            instance: Some(instance),
            states: summary.states,
            bad_behaving: summary.bad_behaving,
            phase: summary.phase,
            graceful: true,
        }
    }

    fn ungraceful(instance: u64) -> Self {
        Self {
            instance: Some(instance),
            graceful: false,
            ..Self::no_session()
        }
    }
}

struct Session {
    instance: u64,
    tx: mpsc::UnboundedSender<RuntimeEvent>,
    worker: thread::JoinHandle<()>,
    done_rx: std_mpsc::Receiver<RunSummary>,
}

/// Owner of the scheduling-domain lifecycle.
pub struct ScriptHost {
    catalog: Arc<ScriptCatalog>,
    config: Arc<ConfigFile>,
    installer: Arc<dyn DependencyInstaller>,
    session: Option<Session>,
    instances: u64,
}

impl std::fmt::Debug for ScriptHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptHost")
            .field("catalog", &self.catalog)
            .field("instance", &self.instance())
            .finish_non_exhaustive()
    }
}

impl ScriptHost {
    /// Host with the no-op dependency installer.
    pub fn new(catalog: ScriptCatalog, config: ConfigFile) -> Self {
        Self::with_installer(catalog, config, Arc::new(NoopInstaller))
    }

    pub fn with_installer(
        catalog: ScriptCatalog,
        config: ConfigFile,
        installer: Arc<dyn DependencyInstaller>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(config),
            installer,
            session: None,
            instances: 0,
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Instance number of the live session, if any.
    pub fn instance(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.instance)
    }

    /// True while a session's worker thread is still running.
    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.worker.is_finished())
    }

    /// Start a new session: load the scripts and run them.
    ///
    /// A session still alive from an earlier `init` is shut down first.
    /// Only thread creation errors are returned; script failures are
    /// classified and logged inside the session.
    pub fn init(&mut self, console_logging: bool) -> Result<()> {
        let target = LogTarget::for_host(console_logging, &self.config.host.log_file);
        init_logging(target, None)?;

        if let Some(previous) = self.session.take() {
            info!(instance = previous.instance, "tearing down previous session");
            self.shutdown_session(previous);
        }

        self.instances += 1;
        let instance = self.instances;
        let (tx, rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = std_mpsc::channel();

        let catalog = Arc::clone(&self.catalog);
        let config = Arc::clone(&self.config);
        let installer = Arc::clone(&self.installer);

        let worker = thread::Builder::new()
            .name(format!("scripthook-session-{instance}"))
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        error!(instance, error = %err, "failed to build session runtime");
                        return;
                    }
                };
                let summary = runtime.block_on(run_session(catalog, config, installer, rx));
                // Blocking work started by scripts must not hold the worker.
                runtime.shutdown_background();
                if done_tx.send(summary).is_err() {
                    debug!(instance, "host stopped waiting for this session");
                }
            })
            .map_err(ScripthookError::IoError)?;

        info!(instance, "session started");
        self.session = Some(Session {
            instance,
            tx,
            worker,
            done_rx,
        });
        Ok(())
    }

    /// Deliver a tick pulse to the scripts.
    pub fn on_tick(&self) {
        self.send(RuntimeEvent::Tick);
    }

    /// Deliver a key event to the scripts, unless it is one of the host's
    /// built-in chords.
    pub fn on_key(&self, code: KeyCode, pressed: bool, modifiers: Modifiers) -> HostAction {
        let action = builtin_action(code, pressed, modifiers);
        match action {
            HostAction::Forwarded => {
                self.send(RuntimeEvent::Key(KeyEvent::new(code, pressed, modifiers)));
            }
            HostAction::Stop | HostAction::Restart => {
                info!(?action, code = %code, "built-in key chord");
            }
        }
        action
    }

    /// Shut the live session down and wait for its worker.
    ///
    /// Blocks for at most the configured join timeout.
    pub fn request_exit(&mut self) -> ExitReport {
        match self.session.take() {
            Some(session) => self.shutdown_session(session),
            None => {
                debug!("exit requested without a live session");
                ExitReport::no_session()
            }
        }
    }

    fn send(&self, event: RuntimeEvent) {
        match &self.session {
            Some(session) => {
                if session.tx.send(event).is_err() {
                    debug!(instance = session.instance, "session no longer running; event dropped");
                }
            }
            None => debug!(?event, "no session; event dropped"),
        }
    }

    fn shutdown_session(&self, session: Session) -> ExitReport {
        let Session {
            instance,
            tx,
            worker,
            done_rx,
        } = session;

        if tx.send(RuntimeEvent::ShutdownRequested).is_err() {
            debug!(instance, "session already finished");
        }

        let timeout = self.config.host.join_timeout;
        let deadline = Instant::now() + timeout;
        match done_rx.recv_timeout(timeout) {
            Ok(summary) => {
                info!(
                    instance,
                    bad_behaving = summary.bad_behaving.len(),
                    "session stopped"
                );
                let mut report = ExitReport::from_summary(instance, summary);
                if wait_finished(&worker, deadline) {
                    if worker.join().is_err() {
                        warn!(instance, "session worker panicked after reporting");
                    }
                } else {
                    report_error(&ScriptError::ShutdownJoin { timeout });
                    warn!(instance, "session worker still busy after reporting; detaching");
                    report.graceful = false;
                }
                report
            }
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                report_error(&ScriptError::ShutdownJoin { timeout });
                warn!(instance, "ungraceful termination; detaching session worker");
                drop(worker);
                ExitReport::ungraceful(instance)
            }
            Err(std_mpsc::RecvTimeoutError::Disconnected) => {
                if worker.join().is_err() {
                    error!(instance, "session worker panicked");
                } else {
                    warn!(instance, "session worker exited without a summary");
                }
                ExitReport::ungraceful(instance)
            }
        }
    }
}

impl Drop for ScriptHost {
    fn drop(&mut self) {
        if self.session.is_some() {
            self.request_exit();
        }
    }
}

/// Poll `worker` until it has exited or `deadline` passes.
fn wait_finished(worker: &thread::JoinHandle<()>, deadline: Instant) -> bool {
    while !worker.is_finished() {
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
    true
}

/// Body of a session's worker: load, start and supervise the scripts.
async fn run_session(
    catalog: Arc<ScriptCatalog>,
    config: Arc<ConfigFile>,
    installer: Arc<dyn DependencyInstaller>,
    event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
) -> RunSummary {
    let units = ScriptLoader::new(&catalog, &config, installer.as_ref()).discover();

    let events = Arc::new(Events::new());
    let mut scheduler = Scheduler::new(Arc::clone(&events));
    let registry = scheduler.start(units);

    let coordinator = ShutdownCoordinator::new(config.host.stop_timeout);
    let core = CoreRuntime::new(registry, coordinator);
    Runtime::new(core, event_rx, scheduler, events).run().await
}

/// Ctrl+Delete release stops, Ctrl+F12 release restarts.
fn builtin_action(code: KeyCode, pressed: bool, modifiers: Modifiers) -> HostAction {
    if pressed || !modifiers.ctrl {
        return HostAction::Forwarded;
    }
    match code {
        KeyCode::DELETE => HostAction::Stop,
        KeyCode::F12 => HostAction::Restart,
        _ => HostAction::Forwarded,
    }
}
