// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [host]
/// stop_timeout = "1s"
/// join_timeout = "1500ms"
///
/// [loader]
/// blacklist = ["pip"]
///
/// [script.wanted]
/// author = "Jane Doe <jane@example.com>"
/// status = "Production"
/// version = "2.0.0"
/// dependencies = ["aiohttp>=0.15.3"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Host timing and logging from `[host]`.
    #[serde(default)]
    pub host: HostSection,

    /// Loader policy from `[loader]`.
    #[serde(default)]
    pub loader: LoaderSection,

    /// Per-script metadata tables from `[script.<name>]`.
    ///
    /// These are kept as raw tables: each one is interpreted by the loader
    /// on its own, so a malformed field only disqualifies that script.
    #[serde(default)]
    pub script: BTreeMap<String, toml::Table>,
}

/// `[host]` section; every duration is a string like `"250ms"` or `"1s"`.
#[derive(Debug, Clone, Deserialize)]
pub struct HostSection {
    /// How long cancelled scripts get to finish before they are reported
    /// as bad-behaving.
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout: String,

    /// How long `request_exit` waits for the scheduling domain's worker.
    /// Must be larger than `stop_timeout`.
    #[serde(default = "default_join_timeout")]
    pub join_timeout: String,

    /// Pulse period used by the host simulator.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: String,

    /// Log file used when console logging is off.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_stop_timeout() -> String {
    "1s".to_string()
}

fn default_join_timeout() -> String {
    "1500ms".to_string()
}

fn default_tick_interval() -> String {
    "50ms".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("scripthook.log")
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            stop_timeout: default_stop_timeout(),
            join_timeout: default_join_timeout(),
            tick_interval: default_tick_interval(),
            log_file: default_log_file(),
        }
    }
}

/// `[loader]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoaderSection {
    /// Dependency names that must never be installed.
    #[serde(default)]
    pub blacklist: Vec<String>,
}

/// Validated host options with parsed durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOptions {
    pub stop_timeout: Duration,
    pub join_timeout: Duration,
    pub tick_interval: Duration,
    pub log_file: PathBuf,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            stop_timeout: Duration::from_secs(1),
            join_timeout: Duration::from_millis(1500),
            tick_interval: Duration::from_millis(50),
            log_file: default_log_file(),
        }
    }
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`)
/// or [`ConfigFile::default`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub host: HostOptions,
    pub loader: LoaderSection,
    pub script: BTreeMap<String, toml::Table>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        host: HostOptions,
        loader: LoaderSection,
        script: BTreeMap<String, toml::Table>,
    ) -> Self {
        Self {
            host,
            loader,
            script,
        }
    }

    /// Raw metadata table for a script, if the manifest declares one.
    pub fn metadata_table(&self, name: &str) -> Option<&toml::Table> {
        self.script.get(name)
    }
}
