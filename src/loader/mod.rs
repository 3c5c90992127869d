// src/loader/mod.rs

//! Script discovery.
//!
//! The loader turns the startup-time [`ScriptCatalog`] plus the manifest's
//! `[script.<name>]` tables into a list of runnable [`ScriptUnit`]s:
//!
//! 1. enumerate every name known to either source, in lexical order
//! 2. extract metadata ([`metadata`])
//! 3. check and install dependencies ([`dependency`])
//! 4. resolve the entry point ([`catalog`])
//!
//! A unit failing any step is reported through the failure classifier and
//! skipped; the remaining units are unaffected.

pub mod catalog;
pub mod dependency;
pub mod metadata;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::engine::classify::report_error;
use crate::errors::ScriptError;

pub use catalog::{Script, ScriptCatalog, ScriptFn, ScriptFuture, ScriptRef, ScriptResult};
pub use dependency::{
    install_dependencies, Blacklist, DependencyInstaller, NoopInstaller, Requirement,
};
pub use metadata::{parse_metadata, ScriptMetadata};

/// A loaded, runnable script. Immutable once loaded.
#[derive(Clone)]
pub struct ScriptUnit {
    name: Arc<str>,
    metadata: ScriptMetadata,
    entry: ScriptRef,
}

impl fmt::Debug for ScriptUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptUnit")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl ScriptUnit {
    pub fn new(name: impl Into<Arc<str>>, metadata: ScriptMetadata, entry: ScriptRef) -> Self {
        Self {
            name: name.into(),
            metadata,
            entry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub fn metadata(&self) -> &ScriptMetadata {
        &self.metadata
    }

    pub fn entry(&self) -> &ScriptRef {
        &self.entry
    }
}

/// Result of a discovery pass: runnable units plus the classified reasons
/// for every skipped one.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub units: Vec<ScriptUnit>,
    pub skipped: Vec<ScriptError>,
}

/// Discovers script units from a catalog and a manifest.
pub struct ScriptLoader<'a> {
    catalog: &'a ScriptCatalog,
    config: &'a ConfigFile,
    blacklist: Blacklist,
    installer: &'a dyn DependencyInstaller,
}

impl<'a> ScriptLoader<'a> {
    pub fn new(
        catalog: &'a ScriptCatalog,
        config: &'a ConfigFile,
        installer: &'a dyn DependencyInstaller,
    ) -> Self {
        Self {
            catalog,
            config,
            blacklist: Blacklist::new(&config.loader.blacklist),
            installer,
        }
    }

    /// Enumerate all loadable units in lexical name order.
    ///
    /// Units that fail to load are logged and skipped.
    pub fn discover(&self) -> Vec<ScriptUnit> {
        self.discover_with_report().units
    }

    /// Like [`discover`](Self::discover), also returning the skipped units'
    /// errors.
    pub fn discover_with_report(&self) -> LoadReport {
        info!("discovering scripts");

        let names: BTreeSet<&str> = self
            .catalog
            .names()
            .chain(self.config.script.keys().map(String::as_str))
            .collect();

        let mut report = LoadReport::default();
        for name in names {
            match self.load_unit(name) {
                Ok(unit) => {
                    debug!(script = name, metadata = %unit.metadata(), "script loaded");
                    report.units.push(unit);
                }
                Err(err) => {
                    // Not propagated: one broken script must not keep the
                    // others from loading.
                    report_error(&err);
                    report.skipped.push(err);
                }
            }
        }

        info!(
            loaded = report.units.len(),
            skipped = report.skipped.len(),
            "script discovery finished"
        );
        report
    }

    fn load_unit(&self, name: &str) -> Result<ScriptUnit, ScriptError> {
        let metadata = parse_metadata(name, self.config.metadata_table(name))?;

        install_dependencies(name, &metadata.dependencies, &self.blacklist, self.installer)?;

        debug!(script = name, "resolving entry point");
        let entry = match self.catalog.entry(name) {
            Some(entry) => entry,
            None if self.catalog.contains(name) => {
                return Err(ScriptError::import(name, "script declares no entry point"));
            }
            None => {
                return Err(ScriptError::import(
                    name,
                    "no entry point registered for manifest entry",
                ));
            }
        };

        Ok(ScriptUnit::new(name, metadata, entry))
    }
}
