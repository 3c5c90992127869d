// src/exec/mod.rs

//! Script execution layer.
//!
//! - [`context`] is the capability handle a script's entry point receives:
//!   its suspension points and cancellation flag.
//! - [`scheduler`] spawns one task per loaded unit and hands finished tasks
//!   back to the runtime loop.
//! - [`task_runner`] runs a single entry point and maps how it ended onto a
//!   [`TaskOutcome`](crate::engine::TaskOutcome).

pub mod context;
pub mod scheduler;
pub mod task_runner;

pub use context::{Cancelled, RequirementError, ScriptContext};
pub use scheduler::Scheduler;
