// src/cli.rs

//! CLI argument parsing using `clap`.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::types::parse_duration;

/// Command-line arguments for `scripthook`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "scripthook",
    version,
    about = "Run scripts against a simulated host that pulses ticks and key events.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Scripthook.toml` in the current working directory. A
    /// missing default file means default settings.
    #[arg(long, value_name = "PATH", default_value = "Scripthook.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SCRIPTHOOK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Log to stderr instead of the configured log file.
    #[arg(long)]
    pub console: bool,

    /// How long the simulated host runs before requesting exit.
    #[arg(long, value_name = "N", default_value_t = 5.0)]
    pub seconds: f64,

    /// Tick period, e.g. `250ms`. Overrides `[host] tick_interval`.
    #[arg(long, value_name = "DUR", value_parser = parse_duration)]
    pub tick_interval: Option<Duration>,

    /// Load config and discover scripts, print them, but don't run any.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
