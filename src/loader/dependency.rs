// src/loader/dependency.rs

//! Declared script dependencies and the installer collaborator.
//!
//! Dependencies are requirement specifiers like `aiohttp>=0.15.3` or
//! `requests[socks]==2.0`. The loader parses them, checks them against the
//! configured blacklist and hands each one to a [`DependencyInstaller`].
//! Installing is an external concern; this crate ships only
//! [`NoopInstaller`], which accepts everything.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::errors::ScriptError;

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(\[[A-Za-z0-9._,\s-]*\])?\s*((?:[<>=!~]=?|===)\s*[^\s;]+(?:\s*,\s*(?:[<>=!~]=?|===)\s*[^\s;,]+)*)?\s*$")
        .expect("requirement regex is valid")
});

/// A parsed requirement specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    name: String,
    extras: Option<String>,
    constraint: Option<String>,
}

impl Requirement {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version constraint, e.g. `>=0.15.3`.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    /// Name normalised for comparisons: lowercase, `_` and `.` as `-`.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl FromStr for Requirement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = REQUIREMENT_RE
            .captures(s)
            .ok_or_else(|| format!("malformed requirement specifier '{s}'"))?;

        let name = caps[1].to_string();
        let extras = caps.get(2).map(|m| m.as_str().to_string());
        let constraint = caps
            .get(3)
            .map(|m| m.as_str().split_whitespace().collect::<String>());

        Ok(Self {
            name,
            extras,
            constraint,
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(extras) = &self.extras {
            f.write_str(extras)?;
        }
        if let Some(constraint) = &self.constraint {
            f.write_str(constraint)?;
        }
        Ok(())
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == '.' { '-' } else { c })
        .collect()
}

/// Installs a single dependency. Implementations may block; the loader
/// runs before any script task is started.
pub trait DependencyInstaller: Send + Sync {
    fn install(&self, requirement: &Requirement) -> anyhow::Result<()>;
}

/// Installer that accepts every requirement without doing anything.
#[derive(Debug, Clone, Default)]
pub struct NoopInstaller;

impl DependencyInstaller for NoopInstaller {
    fn install(&self, requirement: &Requirement) -> anyhow::Result<()> {
        debug!(dependency = %requirement, "noop installer: assuming dependency is present");
        Ok(())
    }
}

/// Dependency names that must never be installed.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    names: BTreeSet<String>,
}

impl Blacklist {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| normalize_name(n.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, requirement: &Requirement) -> bool {
        self.names.contains(&requirement.normalized_name())
    }
}

/// Check and install every requirement of `script`, stopping at the first
/// failure. An empty list is a no-op.
pub fn install_dependencies(
    script: &str,
    requirements: &[Requirement],
    blacklist: &Blacklist,
    installer: &dyn DependencyInstaller,
) -> Result<(), ScriptError> {
    for requirement in requirements {
        if blacklist.contains(requirement) {
            return Err(ScriptError::DependencyBlacklisted {
                script: script.to_string(),
                dependency: requirement.to_string(),
            });
        }

        info!(script, dependency = %requirement, "installing dependency");
        installer
            .install(requirement)
            .map_err(|e| ScriptError::InstallDependency {
                script: script.to_string(),
                dependency: requirement.to_string(),
                reason: format!("{e:#}"),
            })?;
    }
    Ok(())
}
