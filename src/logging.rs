// src/logging.rs

//! Logging setup for `scripthook` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `SCRIPTHOOK_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs go either to STDERR (console logging) or are appended to a log
//! file without ANSI colours.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Console,
    File(PathBuf),
}

impl LogTarget {
    /// Target used by [`ScriptHost::init`](crate::host::ScriptHost::init).
    pub fn for_host(console_logging: bool, log_file: &std::path::Path) -> Self {
        if console_logging {
            LogTarget::Console
        } else {
            LogTarget::File(log_file.to_path_buf())
        }
    }
}

/// Install the global logging subscriber.
///
/// Only the first call installs anything; later calls (e.g. a second host
/// `init`) are no-ops. Returns whether this call installed the subscriber.
pub fn init_logging(target: LogTarget, cli_level: Option<LogLevel>) -> Result<bool> {
    if tracing::dispatcher::has_been_set() {
        debug!(?target, "logging already initialised; keeping existing subscriber");
        return Ok(false);
    }

    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("SCRIPTHOOK_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    let installed = match target {
        LogTarget::Console => fmt()
            .with_max_level(level)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            fmt()
                .with_max_level(level)
                .with_target(true)
                .with_thread_names(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
    };

    Ok(installed)
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
