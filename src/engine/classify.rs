// src/engine/classify.rs

//! Failure classifier.
//!
//! Turns raw task outcomes into one of a closed set of classifications and
//! routes each to the log. Nothing here ever returns an error to the
//! caller: a single script's fault must not reach the scheduler.

use anyhow::anyhow;
use tracing::{error, info, warn};

use crate::engine::{TaskOutcome, TaskState};
use crate::errors::{ErrorKind, ScriptError};

/// Classified result of a finished (or forcibly finished) task.
#[derive(Debug)]
pub enum Classification {
    Completed { value: Option<String> },
    Cancelled,
    Failed(ScriptError),
    TimedOut(ScriptError),
}

impl Classification {
    /// Terminal state the task is recorded with.
    pub fn state(&self) -> TaskState {
        match self {
            Classification::Completed { .. } => TaskState::Completed,
            Classification::Cancelled => TaskState::Cancelled,
            Classification::Failed(_) => TaskState::Failed,
            Classification::TimedOut(_) => TaskState::TimedOut,
        }
    }
}

/// Classify the outcome of task `name`.
pub fn classify(name: &str, outcome: TaskOutcome) -> Classification {
    match outcome {
        TaskOutcome::Returned(value) => Classification::Completed { value },
        // Aborted only happens when the runtime tore the task down; from the
        // script's point of view that is a cancellation.
        TaskOutcome::Cancelled | TaskOutcome::Aborted => Classification::Cancelled,
        TaskOutcome::Failed(cause) => Classification::Failed(ScriptError::ScriptExecution {
            name: name.to_string(),
            cause,
        }),
        TaskOutcome::Panicked(message) => Classification::Failed(ScriptError::ScriptExecution {
            name: name.to_string(),
            cause: anyhow!("panicked: {message}"),
        }),
    }
}

/// Classification for a task still running after the stop timeout.
pub fn timed_out(name: &str) -> Classification {
    Classification::TimedOut(ScriptError::BadBehavingScript {
        name: name.to_string(),
    })
}

/// Log a classification.
pub fn report(name: &str, classification: &Classification) {
    match classification {
        Classification::Completed { value: Some(value) } if !value.is_empty() => {
            info!(script = %name, value = %value, "script returned");
        }
        Classification::Completed { .. } => {
            info!(script = %name, "script completed");
        }
        Classification::Cancelled => {
            info!(script = %name, "script cancelled");
        }
        Classification::Failed(err) | Classification::TimedOut(err) => report_error(err),
    }
}

/// Log a classified error at the level its kind calls for.
pub fn report_error(err: &ScriptError) {
    let script = err.script().unwrap_or("-");
    match err.kind() {
        ErrorKind::BadBehavior | ErrorKind::ShutdownJoin => {
            warn!(script, kind = err.as_label(), "{err}");
        }
        ErrorKind::Load | ErrorKind::Dependency | ErrorKind::Execution => {
            error!(script, kind = err.as_label(), "{err}");
        }
    }
}
