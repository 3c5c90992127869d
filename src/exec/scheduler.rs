// src/exec/scheduler.rs

//! Task scheduler: one Tokio task per loaded script unit.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::task::{AbortHandle, Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::{Registry, TaskName, TaskOutcome};
use crate::events::Events;
use crate::exec::context::ScriptContext;
use crate::exec::task_runner::{outcome_from_join, run_script};
use crate::loader::{ScriptResult, ScriptUnit};

struct TaskHandle {
    cancel: CancellationToken,
    abort: AbortHandle,
}

/// Owns the running script tasks of one scheduling domain.
pub struct Scheduler {
    events: Arc<Events>,
    tasks: JoinSet<ScriptResult>,
    handles: HashMap<TaskName, TaskHandle>,
    names: HashMap<Id, TaskName>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    pub fn new(events: Arc<Events>) -> Self {
        Self {
            events,
            tasks: JoinSet::new(),
            handles: HashMap::new(),
            names: HashMap::new(),
        }
    }

    /// Spawn one task per unit and return the registry describing them.
    ///
    /// Returns as soon as every task is spawned. Must be called from within
    /// a Tokio runtime; the tasks run on that runtime.
    pub fn start(&mut self, units: Vec<ScriptUnit>) -> Registry {
        let mut registry = Registry::new();

        for unit in units {
            let name = unit.name().to_string();
            if !registry.insert(name.clone()) {
                continue;
            }

            let cancel = CancellationToken::new();
            let ctx = ScriptContext::new(
                unit.shared_name(),
                Arc::clone(&self.events),
                cancel.clone(),
            );
            let abort = self.tasks.spawn(run_script(Arc::clone(unit.entry()), ctx));

            debug!(script = %name, task_id = %abort.id(), "spawned script task");
            self.names.insert(abort.id(), name.clone());
            self.handles.insert(name.clone(), TaskHandle { cancel, abort });
            registry.mark_running(&name);
        }

        info!(tasks = registry.len(), "scripts started");
        registry
    }

    /// Request cooperative cancellation of the given tasks.
    pub fn cancel(&self, names: &[TaskName]) {
        for name in names {
            if let Some(handle) = self.handles.get(name) {
                debug!(script = %name, "requesting cancellation");
                handle.cancel.cancel();
            }
        }
    }

    /// Stop waiting for the given tasks.
    ///
    /// The tasks are aborted, which only takes effect at their next
    /// suspension point. A task blocking its thread is not interrupted.
    pub fn abandon(&mut self, names: &[TaskName]) {
        for name in names {
            if let Some(handle) = self.handles.remove(name) {
                warn!(script = %name, "abandoning script task");
                handle.cancel.cancel();
                handle.abort.abort();
            }
        }
    }

    /// Next finished task, or `None` once no task is left.
    pub async fn join_next(&mut self) -> Option<(TaskName, TaskOutcome)> {
        loop {
            let (id, joined) = match self.tasks.join_next_with_id().await? {
                Ok((id, result)) => (id, Ok(result)),
                Err(err) => (err.id(), Err(err)),
            };

            let outcome = outcome_from_join(joined);
            match self.names.remove(&id) {
                Some(name) => {
                    self.handles.remove(&name);
                    return Some((name, outcome));
                }
                None => warn!(task_id = %id, "finished task has no registered name"),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}
