// src/engine/mod.rs

//! Orchestration engine for scripthook.
//!
//! This module ties together:
//! - the task registry (per-script lifecycle bookkeeping)
//! - the shutdown coordinator (cooperative stop, timeout, forced stop)
//! - the failure classifier
//! - the runtime event loop that reacts to:
//!   - host ticks and key events
//!   - task completions
//!   - stop requests and the shutdown timer
//!
//! The pure core state machine lives in [`core`]; the async shell that owns
//! the event broadcaster and the spawned tasks is implemented in
//! [`runtime`].

use std::collections::BTreeMap;

use crate::events::KeyEvent;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Lifecycle state of a task.
///
/// `Pending -> Running -> {Completed, Failed, Cancelled, TimedOut}`; the
/// terminal transition happens exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    TimedOut,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskState::Pending | TaskState::Running)
    }
}

/// Raw outcome of a task, before classification.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The entry point returned normally.
    Returned(Option<String>),
    /// The entry point propagated [`Cancelled`](crate::exec::Cancelled).
    Cancelled,
    /// The entry point returned an error.
    Failed(anyhow::Error),
    /// The entry point panicked.
    Panicked(String),
    /// The task was aborted by the runtime before it finished.
    Aborted,
}

/// Events flowing into the runtime loop.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// Host tick pulse.
    Tick,
    /// Host key event.
    Key(KeyEvent),
    /// A task reached the end of its entry point (or was torn down).
    TaskCompleted { task: TaskName, outcome: TaskOutcome },
    /// Stop requested by the host.
    ShutdownRequested,
    /// The stop timeout armed after cancellation has elapsed.
    ShutdownTimeoutElapsed,
}

/// What a scheduling domain reports once its runtime loop has exited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Final state per task.
    pub states: BTreeMap<TaskName, TaskState>,
    /// Tasks that ignored cancellation and were forcibly marked `TimedOut`.
    pub bad_behaving: Vec<TaskName>,
    /// Phase the shutdown coordinator ended in before resetting.
    pub phase: shutdown::ShutdownPhase,
}

pub mod classify;
pub mod core;
pub mod registry;
pub mod runtime;
pub mod shutdown;

pub use classify::{classify, Classification};
pub use self::core::{CoreCommand, CoreRuntime, CoreStep};
pub use registry::Registry;
pub use runtime::Runtime;
pub use shutdown::{ShutdownCoordinator, ShutdownPhase};
