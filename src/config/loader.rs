// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::FileSystem;

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Parses durations and checks their relationships.
///
/// Per-script metadata tables are left raw; the script loader interprets
/// them unit by unit.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(fs, &path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file at the *default* path
/// yields the default configuration instead of an error.
pub fn load_or_default(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if path == default_config_path() && !fs.is_file(path) {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(ConfigFile::default());
    }
    load_and_validate(fs, path)
}

/// Helper to resolve a default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Scripthook.toml")
}
