// src/engine/runtime.rs

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Instant, Sleep};
use tracing::{debug, info};

use crate::events::Events;
use crate::exec::Scheduler;

use super::core::CoreRuntime;
use super::{CoreCommand, RunSummary, RuntimeEvent};

/// Async shell around [`CoreRuntime`].
///
/// Runs inside the scheduling domain and is the only place that touches the
/// event broadcaster and the task handles. Host events arrive over a single
/// unbounded channel; task completions come from the [`Scheduler`].
pub struct Runtime {
    core: CoreRuntime,
    event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
    scheduler: Scheduler,
    events: Arc<Events>,
    shutdown_timer: Option<Pin<Box<Sleep>>>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::UnboundedReceiver<RuntimeEvent>,
        scheduler: Scheduler,
        events: Arc<Events>,
    ) -> Self {
        Self {
            core,
            event_rx,
            scheduler,
            events,
            shutdown_timer: None,
        }
    }

    /// Main event loop.
    ///
    /// - Feeds host events, task completions and the shutdown timer into the
    ///   core.
    /// - Executes the commands the core returns.
    /// - Exits once the core says so: every task finished on its own, the
    ///   shutdown completed, or the shutdown timed out.
    ///
    /// A closed host channel counts as a stop request.
    pub async fn run(mut self) -> RunSummary {
        info!(tasks = self.core.registry().len(), "scripthook runtime started");

        if self.core.is_idle() {
            info!("no scripts running; complete");
            return self.core.into_summary();
        }

        let mut host_open = true;
        loop {
            let event = tokio::select! {
                biased;

                Some((task, outcome)) = self.scheduler.join_next() => {
                    RuntimeEvent::TaskCompleted { task, outcome }
                }

                _ = wait_timer(&mut self.shutdown_timer), if self.shutdown_timer.is_some() => {
                    self.shutdown_timer = None;
                    RuntimeEvent::ShutdownTimeoutElapsed
                }

                received = self.event_rx.recv(), if host_open => match received {
                    Some(event) => event,
                    None => {
                        info!("host event channel closed; stopping");
                        host_open = false;
                        RuntimeEvent::ShutdownRequested
                    }
                },

                else => {
                    info!("nothing left to wait for; exiting");
                    break;
                }
            };

            if !matches!(event, RuntimeEvent::Tick) {
                debug!(?event, "runtime received event");
            }

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        self.core.into_summary()
    }

    fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::FireTick => self.events.fire_tick(),
            CoreCommand::FireKey(key) => self.events.fire_key(key),
            CoreCommand::CancelTasks(names) => self.scheduler.cancel(&names),
            CoreCommand::ArmShutdownTimer(timeout) => {
                debug!(?timeout, "arming shutdown timer");
                let deadline = Instant::now() + timeout;
                self.shutdown_timer = Some(Box::pin(tokio::time::sleep_until(deadline)));
            }
            CoreCommand::AbandonTasks(names) => self.scheduler.abandon(&names),
        }
    }
}

async fn wait_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
