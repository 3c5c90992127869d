// src/engine/registry.rs

//! Task registry: script name to task state.
//!
//! Built once per scheduling-domain session by
//! [`Scheduler::start`](crate::exec::Scheduler::start), which keeps the task
//! handles and hands the bookkeeping to the core runtime. Both halves live
//! on the domain's thread and the core is the registry's only writer; the
//! shutdown coordinator only reads it.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::engine::{TaskName, TaskState};

#[derive(Debug, Clone)]
struct TaskRecord {
    state: TaskState,
    cancel_requested: bool,
}

/// Per-session mapping from script name to its task.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tasks: BTreeMap<TaskName, TaskRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new task in `Pending` state.
    ///
    /// Returns `false` (and leaves the existing record alone) if the name is
    /// already registered.
    pub fn insert(&mut self, name: impl Into<TaskName>) -> bool {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            warn!(task = %name, "task already registered; ignoring duplicate");
            return false;
        }
        self.tasks.insert(
            name,
            TaskRecord {
                state: TaskState::Pending,
                cancel_requested: false,
            },
        );
        true
    }

    /// `Pending -> Running`.
    pub fn mark_running(&mut self, name: &str) {
        if let Some(record) = self.tasks.get_mut(name) {
            if record.state == TaskState::Pending {
                record.state = TaskState::Running;
                debug!(task = %name, "task running");
            }
        }
    }

    /// Record the terminal state of a task.
    ///
    /// Returns `true` only for the first terminal transition. Completions
    /// for unknown or already-terminal tasks (e.g. a task that finished
    /// after being forcibly marked `TimedOut`) are ignored.
    pub fn complete(&mut self, name: &str, state: TaskState) -> bool {
        debug_assert!(state.is_terminal());
        match self.tasks.get_mut(name) {
            Some(record) if !record.state.is_terminal() => {
                record.state = state;
                true
            }
            Some(record) => {
                debug!(
                    task = %name,
                    recorded = ?record.state,
                    late = ?state,
                    "ignoring completion of already-terminal task"
                );
                false
            }
            None => {
                warn!(task = %name, "completion for unknown task");
                false
            }
        }
    }

    /// Set the cancellation flag on every given task. The flag is never
    /// cleared again.
    pub fn request_cancel(&mut self, names: &[TaskName]) {
        for name in names {
            if let Some(record) = self.tasks.get_mut(name) {
                record.cancel_requested = true;
            }
        }
    }

    pub fn is_cancel_requested(&self, name: &str) -> bool {
        self.tasks.get(name).is_some_and(|r| r.cancel_requested)
    }

    /// Names of tasks that are not terminal yet, in lexical order.
    pub fn running(&self) -> Vec<TaskName> {
        self.tasks
            .iter()
            .filter(|(_, r)| !r.state.is_terminal())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// True if no task is pending or running.
    pub fn is_idle(&self) -> bool {
        self.tasks.values().all(|r| r.state.is_terminal())
    }

    pub fn state_of(&self, name: &str) -> Option<TaskState> {
        self.tasks.get(name).map(|r| r.state)
    }

    pub fn snapshot(&self) -> BTreeMap<TaskName, TaskState> {
        self.tasks
            .iter()
            .map(|(name, r)| (name.clone(), r.state))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
