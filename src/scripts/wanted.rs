// src/scripts/wanted.rs

//! `wanted`: keeps a wanted level between 0 and 5.
//!
//! Releasing `+` raises it by one, `-` lowers it by one; with Shift held
//! the step is two.

use tracing::debug;

use crate::events::{KeyCode, KeyFilter};
use crate::exec::ScriptContext;
use crate::loader::ScriptResult;

pub const MAX_LEVEL: u8 = 5;

/// New level after a key release of `code`.
pub fn adjust(level: u8, code: KeyCode, shift: bool) -> u8 {
    let step = if shift { 2 } else { 1 };
    match code {
        KeyCode::ADD => level.saturating_add(step).min(MAX_LEVEL),
        KeyCode::SUBTRACT => level.saturating_sub(step),
        _ => level,
    }
}

pub async fn main(ctx: ScriptContext) -> ScriptResult {
    let filter = KeyFilter::any()
        .codes([KeyCode::ADD, KeyCode::SUBTRACT])
        .pressed(false);
    let mut level = 0u8;

    loop {
        let event = ctx.key(filter.clone()).await?;
        let next = adjust(level, event.code, event.modifiers.shift);
        if next != level {
            debug!(script = ctx.name(), from = level, to = next, "wanted level changed");
            level = next;
        } else {
            debug!(script = ctx.name(), level, "wanted level unchanged");
        }
    }
}
