// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`RuntimeEvent`]s and produces:
//! - an updated registry and shutdown phase
//! - a list of commands describing what the async shell should do next
//!
//! The shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from the host channel and the task set
//! - firing ticks/keys into the broadcaster
//! - cancelling and abandoning task handles
//! - arming the shutdown timer
//!
//! The core has no channels, no timers and no task handles, so it can be
//! driven step by step in tests.

use std::time::Duration;

use tracing::{debug, info};

use crate::engine::classify::{self, report};
use crate::engine::registry::Registry;
use crate::engine::shutdown::{ShutdownCoordinator, ShutdownPhase};
use crate::engine::{RunSummary, RuntimeEvent, TaskName, TaskOutcome};
use crate::events::KeyEvent;

/// Command produced by the pure core, to be executed by the async shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    FireTick,
    FireKey(KeyEvent),
    /// Trip the cancellation tokens of these tasks.
    CancelTasks(Vec<TaskName>),
    /// Deliver `ShutdownTimeoutElapsed` after this long.
    ArmShutdownTimer(Duration),
    /// Stop waiting for these tasks and abort them where possible.
    AbandonTasks(Vec<TaskName>),
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn cont(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn exit(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: false,
        }
    }
}

#[derive(Debug)]
pub struct CoreRuntime {
    registry: Registry,
    coordinator: ShutdownCoordinator,
    bad_behaving: Vec<TaskName>,
}

impl CoreRuntime {
    pub fn new(registry: Registry, coordinator: ShutdownCoordinator) -> Self {
        Self {
            registry,
            coordinator,
            bad_behaving: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn coordinator(&self) -> &ShutdownCoordinator {
        &self.coordinator
    }

    /// True once no task is pending or running.
    pub fn is_idle(&self) -> bool {
        self.registry.is_idle()
    }

    /// Handle a single runtime event.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::Tick => CoreStep::cont(vec![CoreCommand::FireTick]),
            RuntimeEvent::Key(key) => CoreStep::cont(vec![CoreCommand::FireKey(key)]),
            RuntimeEvent::TaskCompleted { task, outcome } => self.handle_completion(task, outcome),
            RuntimeEvent::ShutdownRequested => self.handle_shutdown_request(),
            RuntimeEvent::ShutdownTimeoutElapsed => self.handle_shutdown_timeout(),
        }
    }

    /// Consume the core and summarise the session.
    pub fn into_summary(mut self) -> RunSummary {
        let phase = self.coordinator.finish();
        RunSummary {
            states: self.registry.snapshot(),
            bad_behaving: self.bad_behaving,
            phase,
        }
    }

    fn handle_completion(&mut self, task: TaskName, outcome: TaskOutcome) -> CoreStep {
        let classification = classify::classify(&task, outcome);
        if self.registry.complete(&task, classification.state()) {
            report(&task, &classification);
        }

        if !self.registry.is_idle() {
            return CoreStep::cont(Vec::new());
        }

        if self.coordinator.phase() == ShutdownPhase::Cancelling {
            self.coordinator.on_all_stopped();
        } else {
            info!("all scripts finished; complete");
        }
        CoreStep::exit(Vec::new())
    }

    fn handle_shutdown_request(&mut self) -> CoreStep {
        if !self.coordinator.request_stop() {
            return CoreStep::cont(Vec::new());
        }

        let names = self.coordinator.begin_cancelling(&self.registry);
        if names.is_empty() {
            self.coordinator.on_all_stopped();
            return CoreStep::exit(Vec::new());
        }

        self.registry.request_cancel(&names);
        let timeout = self.coordinator.timeout();
        CoreStep::cont(vec![
            CoreCommand::CancelTasks(names),
            CoreCommand::ArmShutdownTimer(timeout),
        ])
    }

    fn handle_shutdown_timeout(&mut self) -> CoreStep {
        let abandoned = self.coordinator.force_stop(&self.registry);
        if self.coordinator.phase() != ShutdownPhase::ForcedStop {
            debug!(phase = ?self.coordinator.phase(), "stale shutdown timer; ignoring");
            return CoreStep::cont(Vec::new());
        }

        for name in &abandoned {
            let classification = classify::timed_out(name);
            if self.registry.complete(name, classification.state()) {
                report(name, &classification);
            }
        }
        self.bad_behaving.extend(abandoned.iter().cloned());

        CoreStep::exit(vec![CoreCommand::AbandonTasks(abandoned)])
    }
}
