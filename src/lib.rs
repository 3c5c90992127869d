// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod exec;
pub mod fs;
pub mod host;
pub mod loader;
pub mod logging;
pub mod scripts;
pub mod simulate;
pub mod types;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile};
use crate::fs::RealFileSystem;
use crate::host::ScriptHost;
use crate::loader::{NoopInstaller, ScriptCatalog, ScriptLoader};
use crate::simulate::{simulate, SimulationOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the built-in script catalog
/// - either a dry-run listing or the host simulator
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_or_default(&RealFileSystem, &config_path)?;
    let catalog = scripts::builtin_catalog();

    if args.dry_run {
        print_dry_run(&catalog, &cfg);
        return Ok(());
    }

    let duration = match Duration::try_from_secs_f64(args.seconds) {
        Ok(duration) => duration,
        Err(err) => bail!("invalid --seconds {}: {err}", args.seconds),
    };

    let tick_interval = args.tick_interval.unwrap_or(cfg.host.tick_interval);
    if tick_interval.is_zero() {
        bail!("--tick-interval must be greater than zero");
    }

    let options = SimulationOptions::new(duration, tick_interval, args.console);
    info!(
        seconds = args.seconds,
        tick_interval = ?options.tick_interval,
        "starting host simulation"
    );

    let host = ScriptHost::new(catalog, cfg);
    let report = simulate(host, options).await?;
    if !report.graceful {
        eprintln!("scripthook: scheduling domain did not terminate in time");
    }
    Ok(())
}

/// Dry-run output: discovered scripts with their metadata, and the skipped
/// ones with the reason.
fn print_dry_run(catalog: &ScriptCatalog, cfg: &ConfigFile) {
    println!("scripthook dry-run");
    println!("  host.stop_timeout = {:?}", cfg.host.stop_timeout);
    println!("  host.join_timeout = {:?}", cfg.host.join_timeout);
    println!("  host.tick_interval = {:?}", cfg.host.tick_interval);
    if !cfg.loader.blacklist.is_empty() {
        println!("  loader.blacklist = {:?}", cfg.loader.blacklist);
    }
    println!();

    let report = ScriptLoader::new(catalog, cfg, &NoopInstaller).discover_with_report();

    println!("scripts ({}):", report.units.len());
    for unit in &report.units {
        println!("  - {}", unit.name());
        println!("      metadata: {}", unit.metadata());
    }

    if !report.skipped.is_empty() {
        println!();
        println!("skipped ({}):", report.skipped.len());
        for err in &report.skipped {
            println!(
                "  - {} [{}]: {}",
                err.script().unwrap_or("-"),
                err.as_label(),
                err
            );
        }
    }
}
