// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ScripthookError`] covers host-level plumbing (config, IO, TOML).
//! - [`ScriptError`] is the closed set of classified per-script failures.
//!   Every variant is caught at the boundary nearest its origin (per-unit
//!   load, per-task completion, host join) and only ever logged; none of
//!   them propagate into the scheduler's own control flow.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScripthookError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ScripthookError>;

/// Coarse failure category of a [`ScriptError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The unit could not be loaded and was skipped.
    Load,
    /// A declared dependency was rejected or could not be installed.
    Dependency,
    /// The entry point failed while running.
    Execution,
    /// The task ignored cancellation past the stop timeout.
    BadBehavior,
    /// The scheduling domain's worker did not terminate in time.
    ShutdownJoin,
}

/// A classified failure of a single script (or of the host join).
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("could not import script \"{name}\": {reason}")]
    ImportScript { name: String, reason: String },

    #[error("dependency \"{dependency}\" of script \"{script}\" needs to be installed manually: {reason}")]
    InstallDependency {
        script: String,
        dependency: String,
        reason: String,
    },

    #[error("dependency \"{dependency}\" of script \"{script}\" is blacklisted")]
    DependencyBlacklisted { script: String, dependency: String },

    #[error("script \"{name}\" returned with an error: {cause:#}")]
    ScriptExecution { name: String, cause: anyhow::Error },

    #[error("script \"{name}\" did not stop in time")]
    BadBehavingScript { name: String },

    #[error("scheduling domain did not terminate within {timeout:?}")]
    ShutdownJoin { timeout: Duration },
}

impl ScriptError {
    pub fn import(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ScriptError::ImportScript {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScriptError::ImportScript { .. } => ErrorKind::Load,
            ScriptError::InstallDependency { .. } | ScriptError::DependencyBlacklisted { .. } => {
                ErrorKind::Dependency
            }
            ScriptError::ScriptExecution { .. } => ErrorKind::Execution,
            ScriptError::BadBehavingScript { .. } => ErrorKind::BadBehavior,
            ScriptError::ShutdownJoin { .. } => ErrorKind::ShutdownJoin,
        }
    }

    /// Short stable label (snake_case) for structured logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ScriptError::ImportScript { .. } => "import_script",
            ScriptError::InstallDependency { .. } => "install_dependency",
            ScriptError::DependencyBlacklisted { .. } => "dependency_blacklisted",
            ScriptError::ScriptExecution { .. } => "script_execution",
            ScriptError::BadBehavingScript { .. } => "bad_behaving_script",
            ScriptError::ShutdownJoin { .. } => "shutdown_join",
        }
    }

    /// Name of the script this failure belongs to, if any.
    pub fn script(&self) -> Option<&str> {
        match self {
            ScriptError::ImportScript { name, .. }
            | ScriptError::ScriptExecution { name, .. }
            | ScriptError::BadBehavingScript { name } => Some(name),
            ScriptError::InstallDependency { script, .. }
            | ScriptError::DependencyBlacklisted { script, .. } => Some(script),
            ScriptError::ShutdownJoin { .. } => None,
        }
    }
}
