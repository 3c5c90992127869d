// src/exec/context.rs

//! The handle a running script uses to suspend.
//!
//! Every suspension point observes the task's cancellation token and
//! resolves to `Err(Cancelled)` as soon as cancellation is requested. A
//! script that propagates the error with `?` ends up in the `Cancelled`
//! state; a script may also catch it to clean up first.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::events::{Events, KeyEvent, KeyFilter};

/// Returned from a suspension point once the task has been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("script cancelled")]
pub struct Cancelled;

/// A requirement polled by [`ScriptContext::wait`] is not fulfilled yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("requirement not fulfilled: {requirement}")]
pub struct RequirementError {
    /// Human-readable name of what is missing (e.g. "player entity").
    pub requirement: String,
}

impl RequirementError {
    pub fn new(requirement: impl Into<String>) -> Self {
        Self {
            requirement: requirement.into(),
        }
    }
}

/// Per-task capability handle passed to a script's entry point.
#[derive(Debug, Clone)]
pub struct ScriptContext {
    name: Arc<str>,
    events: Arc<Events>,
    cancel: CancellationToken,
}

impl ScriptContext {
    pub fn new(name: impl Into<Arc<str>>, events: Arc<Events>, cancel: CancellationToken) -> Self {
        Self {
            name: name.into(),
            events,
            cancel,
        }
    }

    /// Name of the script this task belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Wait for `count` ticks fired after this call.
    pub async fn tick(&self, count: u32) -> Result<(), Cancelled> {
        let ticks = self.events.await_tick(count);
        self.until_cancelled(ticks).await
    }

    /// Wait for the next key event matching `filter`.
    pub async fn key(&self, filter: KeyFilter) -> Result<KeyEvent, Cancelled> {
        let key = self.events.await_key(filter);
        self.until_cancelled(key).await
    }

    /// Timed delay.
    pub async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        self.until_cancelled(tokio::time::sleep(duration)).await
    }

    /// Poll `require` until it yields a value, waiting `precision` ticks
    /// between attempts.
    pub async fn wait<T, F>(&self, mut require: F, precision: u32) -> Result<T, Cancelled>
    where
        F: FnMut() -> Result<T, RequirementError>,
    {
        loop {
            match require() {
                Ok(value) => {
                    debug!(script = %self.name, "requirement fulfilled");
                    return Ok(value);
                }
                Err(err) => {
                    debug!(
                        script = %self.name,
                        missing = %err.requirement,
                        "requirement not fulfilled"
                    );
                }
            }
            self.tick(precision.max(1)).await?;
        }
    }

    /// Run `fut` unless cancellation wins first.
    ///
    /// Cancellation is checked first, so an already-cancelled task never
    /// starts a new wait. It still yields once before returning, so a script
    /// that discards the error and waits again cannot starve the shutdown
    /// timer.
    pub async fn until_cancelled<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        if self.cancel.is_cancelled() {
            tokio::task::yield_now().await;
            return Err(Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Cancelled),
            out = fut => Ok(out),
        }
    }
}
