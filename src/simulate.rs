// src/simulate.rs

//! Host simulator.
//!
//! Drives a [`ScriptHost`] the way the native host would, without the
//! native application: pulses ticks, injects a short key sequence and
//! finally requests exit.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::events::{KeyCode, KeyEvent, Modifiers};
use crate::host::{ExitReport, HostAction, ScriptHost};

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Total run time before exit is requested.
    pub duration: Duration,
    pub tick_interval: Duration,
    pub console_logging: bool,
    /// Key events injected at the given offsets from the start.
    pub keys: Vec<(Duration, KeyEvent)>,
}

impl SimulationOptions {
    pub fn new(duration: Duration, tick_interval: Duration, console_logging: bool) -> Self {
        Self {
            duration,
            tick_interval,
            console_logging,
            keys: default_key_script(),
        }
    }
}

/// `+` released, `+` released with Shift, `-` released.
pub fn default_key_script() -> Vec<(Duration, KeyEvent)> {
    vec![
        (Duration::from_millis(1000), KeyEvent::release(KeyCode::ADD)),
        (
            Duration::from_millis(1500),
            KeyEvent::release(KeyCode::ADD).with_modifiers(Modifiers::shift()),
        ),
        (Duration::from_millis(2000), KeyEvent::release(KeyCode::SUBTRACT)),
    ]
}

/// Run the simulation to the end and return the host's exit report.
///
/// The blocking host calls (`init`, `request_exit`) run on the blocking
/// pool so the async context stays responsive.
pub async fn simulate(host: ScriptHost, options: SimulationOptions) -> Result<ExitReport> {
    let console = options.console_logging;
    let mut host = init_host(host, console).await?;

    let start = Instant::now();
    let deadline = time::sleep_until(start + options.duration);
    tokio::pin!(deadline);

    let mut ticker = time::interval(options.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut keys = options.keys.clone();
    keys.sort_by_key(|(offset, _)| *offset);
    let mut keys = keys.into_iter().peekable();
    let mut ticks = 0u64;

    loop {
        tokio::select! {
            _ = &mut deadline => {
                info!(ticks, "simulation time is up");
                break;
            }
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = res {
                    warn!(error = %err, "failed to listen for Ctrl+C");
                }
                info!("Ctrl+C received");
                break;
            }
            _ = ticker.tick() => {
                host.on_tick();
                ticks += 1;

                let elapsed = start.elapsed();
                let mut action = HostAction::Forwarded;
                while let Some((_, key)) = keys.next_if(|(offset, _)| *offset <= elapsed) {
                    info!(code = %key.code, pressed = key.pressed, shift = key.modifiers.shift, "injecting key");
                    action = host.on_key(key.code, key.pressed, key.modifiers);
                    if action != HostAction::Forwarded {
                        break;
                    }
                }

                match action {
                    HostAction::Forwarded => {}
                    HostAction::Stop => break,
                    HostAction::Restart => host = init_host(host, console).await?,
                }
            }
        }
    }

    let report = tokio::task::spawn_blocking(move || host.request_exit())
        .await
        .context("joining request_exit")?;
    info!(
        graceful = report.graceful,
        bad_behaving = ?report.bad_behaving,
        "simulation finished"
    );
    Ok(report)
}

async fn init_host(mut host: ScriptHost, console: bool) -> Result<ScriptHost> {
    tokio::task::spawn_blocking(move || host.init(console).map(|()| host))
        .await
        .context("joining host init")?
        .context("initialising host")
}
