// src/scripts/mod.rs

//! Demo scripts shipped with the binary.
//!
//! Their metadata lives in the repository's `Scripthook.toml`.

pub mod wanted;

use std::time::Duration;

use tracing::{debug, info};

use crate::exec::ScriptContext;
use crate::loader::{ScriptCatalog, ScriptResult};

/// Catalog with every demo script registered under its name.
pub fn builtin_catalog() -> ScriptCatalog {
    let mut catalog = ScriptCatalog::new();
    catalog
        .register_fn("helper", helper)
        .register_fn("metadata", metadata)
        .register_fn("running", running)
        .register_fn("wanted", wanted::main);
    catalog
}

/// Logs a counter every second until cancelled.
pub async fn running(ctx: ScriptContext) -> ScriptResult {
    let mut counter = 0u64;
    loop {
        counter += 1;
        info!(script = ctx.name(), counter, "running");
        ctx.sleep(Duration::from_secs(1)).await?;
    }
}

/// Does nothing; exists to show how metadata is declared.
pub async fn metadata(ctx: ScriptContext) -> ScriptResult {
    debug!(script = ctx.name(), "hello from the metadata example");
    Ok(None)
}

/// Returns right away with a value.
pub async fn helper(ctx: ScriptContext) -> ScriptResult {
    Ok(Some(format!("{} ready", ctx.name())))
}
