// src/exec/task_runner.rs

//! Individual script task runner.

use std::any::Any;

use tokio::task::JoinError;
use tracing::{debug, info};

use crate::engine::TaskOutcome;
use crate::exec::context::{Cancelled, ScriptContext};
use crate::loader::{ScriptRef, ScriptResult};

/// Run one script's entry point to its end.
pub async fn run_script(entry: ScriptRef, ctx: ScriptContext) -> ScriptResult {
    let name = ctx.name().to_string();
    info!(script = %name, "starting script");
    let result = entry.main(ctx).await;
    debug!(script = %name, ok = result.is_ok(), "script entry point returned");
    result
}

/// Map what the task set hands back for a script task onto a
/// [`TaskOutcome`].
pub fn outcome_from_join(joined: Result<ScriptResult, JoinError>) -> TaskOutcome {
    match joined {
        Ok(result) => outcome_from_result(result),
        Err(err) if err.is_panic() => TaskOutcome::Panicked(panic_message(err.into_panic())),
        Err(_) => TaskOutcome::Aborted,
    }
}

/// `Cancelled` anywhere in the error chain counts as a cancellation.
pub fn outcome_from_result(result: ScriptResult) -> TaskOutcome {
    match result {
        Ok(value) => TaskOutcome::Returned(value),
        Err(err) if err.chain().any(|cause| cause.is::<Cancelled>()) => TaskOutcome::Cancelled,
        Err(err) => TaskOutcome::Failed(err),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
