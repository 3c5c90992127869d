//! Entry points with well-known behaviour for scheduler and shutdown tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use scripthook::exec::ScriptContext;
use scripthook::loader::{ScriptFn, ScriptRef, ScriptResult};

/// Returns `value` immediately.
pub fn returns(value: &str) -> ScriptRef {
    let value = value.to_string();
    ScriptFn::arc(move |_ctx: ScriptContext| {
        std::future::ready::<ScriptResult>(Ok(Some(value.clone())))
    })
}

/// Fails immediately with "boom".
pub async fn fails(_ctx: ScriptContext) -> ScriptResult {
    Err(anyhow!("boom"))
}

/// Panics on its first poll.
pub async fn panics(_ctx: ScriptContext) -> ScriptResult {
    panic!("script panicked on purpose");
}

/// Waits on ticks forever; stops as soon as it is cancelled.
pub async fn cooperative(ctx: ScriptContext) -> ScriptResult {
    loop {
        ctx.tick(1).await?;
    }
}

/// Catches its cancellation and returns a value instead.
pub async fn cleans_up(ctx: ScriptContext) -> ScriptResult {
    ctx.cancelled().await;
    Ok(Some("cleaned up".to_string()))
}

/// Discards every `Cancelled` and goes straight back to waiting on ticks.
pub async fn swallows_cancel(ctx: ScriptContext) -> ScriptResult {
    loop {
        let _ = ctx.tick(1).await;
    }
}

/// Keeps sleeping and never looks at its cancellation flag.
pub async fn ignores_cancel(_ctx: ScriptContext) -> ScriptResult {
    loop {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Blocks the thread it runs on for `duration` without ever yielding.
pub fn blocks_thread(duration: Duration) -> ScriptRef {
    ScriptFn::arc(move |_ctx: ScriptContext| {
        std::thread::sleep(duration);
        std::future::ready::<ScriptResult>(Ok(None))
    })
}

/// Hands a `duration` long blocking job to the runtime's blocking pool,
/// then waits on ticks until cancelled.
pub fn spawns_blocking(duration: Duration) -> ScriptRef {
    ScriptFn::arc(move |ctx: ScriptContext| spawn_blocking_job(ctx, duration))
}

async fn spawn_blocking_job(ctx: ScriptContext, duration: Duration) -> ScriptResult {
    let _detached = tokio::task::spawn_blocking(move || std::thread::sleep(duration));
    loop {
        ctx.tick(1).await?;
    }
}

/// Adds one to `counter` per observed tick until cancelled.
pub fn counts_ticks(counter: Arc<AtomicUsize>) -> ScriptRef {
    ScriptFn::arc(move |ctx: ScriptContext| count_ticks(ctx, Arc::clone(&counter)))
}

async fn count_ticks(ctx: ScriptContext, counter: Arc<AtomicUsize>) -> ScriptResult {
    loop {
        ctx.tick(1).await?;
        counter.fetch_add(1, Ordering::SeqCst);
    }
}
