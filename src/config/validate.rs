// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{ConfigFile, HostOptions, HostSection, RawConfigFile};
use crate::errors::{Result, ScripthookError};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ScripthookError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        let host = host_options(&raw.host)?;
        Ok(ConfigFile::new_unchecked(host, raw.loader, raw.script))
    }
}

/// Validate a raw config without converting it.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    let host = host_options(&cfg.host)?;
    validate_host(&host)?;
    validate_loader(cfg)?;
    validate_script_names(cfg)?;
    Ok(())
}

fn host_options(host: &HostSection) -> Result<HostOptions> {
    Ok(HostOptions {
        stop_timeout: duration_field("host.stop_timeout", &host.stop_timeout)?,
        join_timeout: duration_field("host.join_timeout", &host.join_timeout)?,
        tick_interval: duration_field("host.tick_interval", &host.tick_interval)?,
        log_file: host.log_file.clone(),
    })
}

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| ScripthookError::ConfigError(format!("[{field}] {e}")))
}

fn validate_host(host: &HostOptions) -> Result<()> {
    if host.stop_timeout.is_zero() {
        return Err(ScripthookError::ConfigError(
            "[host].stop_timeout must be > 0".to_string(),
        ));
    }

    if host.join_timeout <= host.stop_timeout {
        return Err(ScripthookError::ConfigError(format!(
            "[host].join_timeout ({:?}) must be larger than stop_timeout ({:?})",
            host.join_timeout, host.stop_timeout
        )));
    }

    if host.tick_interval.is_zero() {
        return Err(ScripthookError::ConfigError(
            "[host].tick_interval must be > 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_loader(cfg: &RawConfigFile) -> Result<()> {
    for entry in cfg.loader.blacklist.iter() {
        if entry.trim().is_empty() {
            return Err(ScripthookError::ConfigError(
                "[loader].blacklist must not contain empty names".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_script_names(cfg: &RawConfigFile) -> Result<()> {
    for name in cfg.script.keys() {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ScripthookError::ConfigError(format!(
                "invalid script name '{name}' in [script.<name>]"
            )));
        }
    }
    Ok(())
}
