// src/engine/shutdown.rs

//! Shutdown coordinator.
//!
//! `Idle -> StopRequested -> Cancelling -> {AllStopped, ForcedStop} -> Idle`
//!
//! The coordinator decides *which* tasks to cancel and *when* to give up
//! on them. It reads the registry but never writes it; the core applies
//! the resulting state changes.

use std::time::Duration;

use tracing::{debug, info};

use crate::engine::registry::Registry;
use crate::engine::TaskName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShutdownPhase {
    #[default]
    Idle,
    StopRequested,
    Cancelling,
    AllStopped,
    ForcedStop,
}

#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    phase: ShutdownPhase,
    timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            phase: ShutdownPhase::Idle,
            timeout,
        }
    }

    pub fn phase(&self) -> ShutdownPhase {
        self.phase
    }

    /// How long cancelled tasks get before they are forcibly stopped.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `Idle -> StopRequested`. Returns `false` if a shutdown is already in
    /// progress.
    pub fn request_stop(&mut self) -> bool {
        if self.phase != ShutdownPhase::Idle {
            debug!(phase = ?self.phase, "stop already requested; ignoring");
            return false;
        }
        info!("stop requested");
        self.phase = ShutdownPhase::StopRequested;
        true
    }

    /// `StopRequested -> Cancelling`; returns the tasks that must receive a
    /// cancellation request.
    pub fn begin_cancelling(&mut self, registry: &Registry) -> Vec<TaskName> {
        if self.phase != ShutdownPhase::StopRequested {
            return Vec::new();
        }
        self.phase = ShutdownPhase::Cancelling;
        let running = registry.running();
        info!(
            tasks = running.len(),
            timeout = ?self.timeout,
            "cancelling running scripts"
        );
        running
    }

    /// `Cancelling -> AllStopped`.
    pub fn on_all_stopped(&mut self) {
        if self.phase == ShutdownPhase::Cancelling {
            info!("all scripts stopped");
            self.phase = ShutdownPhase::AllStopped;
        }
    }

    /// `Cancelling -> ForcedStop`; returns the tasks of `registry` that are
    /// still not terminal.
    pub fn force_stop(&mut self, registry: &Registry) -> Vec<TaskName> {
        if self.phase != ShutdownPhase::Cancelling {
            return Vec::new();
        }
        self.phase = ShutdownPhase::ForcedStop;
        registry.running()
    }

    /// Back to `Idle`; returns the phase the shutdown ended in.
    pub fn finish(&mut self) -> ShutdownPhase {
        std::mem::replace(&mut self.phase, ShutdownPhase::Idle)
    }
}
