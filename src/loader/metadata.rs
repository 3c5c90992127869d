// src/loader/metadata.rs

//! Best-effort extraction of per-script metadata from the manifest.
//!
//! A missing table or a missing field is fine. A field that *is* present
//! but has the wrong shape disqualifies the script it belongs to.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::errors::ScriptError;
use crate::loader::dependency::Requirement;
use crate::types::ScriptStatus;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("version regex is valid"));

const KNOWN_KEYS: [&str; 4] = ["author", "status", "version", "dependencies"];

/// Declared metadata of a script unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptMetadata {
    pub author: Option<String>,
    pub status: Option<ScriptStatus>,
    /// `x.y.z` version string.
    pub version: Option<String>,
    pub dependencies: Vec<Requirement>,
}

impl ScriptMetadata {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.status.is_none()
            && self.version.is_none()
            && self.dependencies.is_empty()
    }
}

impl fmt::Display for ScriptMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(author) = &self.author {
            parts.push(format!("author={author}"));
        }
        if let Some(status) = &self.status {
            parts.push(format!("status={status}"));
        }
        if let Some(version) = &self.version {
            parts.push(format!("version={version}"));
        }
        if !self.dependencies.is_empty() {
            let deps: Vec<String> = self.dependencies.iter().map(|d| d.to_string()).collect();
            parts.push(format!("dependencies=[{}]", deps.join(", ")));
        }
        if parts.is_empty() {
            f.write_str("(none)")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

/// Interpret the `[script.<name>]` table of `name`.
pub fn parse_metadata(name: &str, table: Option<&toml::Table>) -> Result<ScriptMetadata, ScriptError> {
    let Some(table) = table else {
        return Ok(ScriptMetadata::default());
    };

    for key in table.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            debug!(script = name, key = %key, "ignoring unknown metadata key");
        }
    }

    let author = string_field(name, table, "author")?;

    let status = string_field(name, table, "status")?
        .map(|s| s.parse::<ScriptStatus>())
        .transpose()
        .map_err(|e| ScriptError::import(name, format!("metadata field `status`: {e}")))?;

    let version = string_field(name, table, "version")?;
    if let Some(v) = &version {
        if !VERSION_RE.is_match(v) {
            return Err(ScriptError::import(
                name,
                format!("metadata field `version`: '{v}' is not in x.y.z notation"),
            ));
        }
    }

    let dependencies = match table.get("dependencies") {
        Some(value) => parse_dependencies(name, value)?,
        None => Vec::new(),
    };

    Ok(ScriptMetadata {
        author,
        status,
        version,
        dependencies,
    })
}

fn string_field(name: &str, table: &toml::Table, key: &str) -> Result<Option<String>, ScriptError> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ScriptError::import(
            name,
            format!(
                "metadata field `{key}` must be a string, got {}",
                other.type_str()
            ),
        )),
    }
}

/// A single string is the same as a one-element array.
fn parse_dependencies(name: &str, value: &toml::Value) -> Result<Vec<Requirement>, ScriptError> {
    let items: Vec<&toml::Value> = match value {
        toml::Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    items
        .into_iter()
        .map(|item| match item {
            toml::Value::String(spec) => {
                spec.parse::<Requirement>()
                    .map_err(|reason| ScriptError::InstallDependency {
                        script: name.to_string(),
                        dependency: spec.clone(),
                        reason,
                    })
            }
            other => Err(ScriptError::InstallDependency {
                script: name.to_string(),
                dependency: other.to_string(),
                reason: format!("expected a requirement string, got {}", other.type_str()),
            }),
        })
        .collect()
}
