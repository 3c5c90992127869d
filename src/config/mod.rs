// src/config/mod.rs

//! Configuration loading and validation for scripthook.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file through the [`FileSystem`](crate::fs::FileSystem)
//!   abstraction (`loader.rs`).
//! - Validate host timings and loader policy (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, HostOptions, HostSection, LoaderSection, RawConfigFile};
pub use validate::validate_config;
