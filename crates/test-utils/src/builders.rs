#![allow(dead_code)]

use std::collections::BTreeMap;

use scripthook::config::{ConfigFile, HostSection, LoaderSection, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                host: HostSection::default(),
                loader: LoaderSection::default(),
                script: BTreeMap::new(),
            },
        }
    }

    pub fn stop_timeout(mut self, value: &str) -> Self {
        self.config.host.stop_timeout = value.to_string();
        self
    }

    pub fn join_timeout(mut self, value: &str) -> Self {
        self.config.host.join_timeout = value.to_string();
        self
    }

    pub fn tick_interval(mut self, value: &str) -> Self {
        self.config.host.tick_interval = value.to_string();
        self
    }

    pub fn blacklist(mut self, name: &str) -> Self {
        self.config.loader.blacklist.push(name.to_string());
        self
    }

    pub fn with_script(mut self, name: &str, table: toml::Table) -> Self {
        self.config.script.insert(name.to_string(), table);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a `[script.<name>]` metadata table.
#[derive(Default)]
pub struct ScriptTableBuilder {
    table: toml::Table,
}

impl ScriptTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author(self, author: &str) -> Self {
        self.field("author", toml::Value::String(author.to_string()))
    }

    pub fn status(self, status: &str) -> Self {
        self.field("status", toml::Value::String(status.to_string()))
    }

    pub fn version(self, version: &str) -> Self {
        self.field("version", toml::Value::String(version.to_string()))
    }

    /// `dependencies = "<spec>"`
    pub fn dependency(self, spec: &str) -> Self {
        self.field("dependencies", toml::Value::String(spec.to_string()))
    }

    /// `dependencies = ["<spec>", ...]`
    pub fn dependencies(self, specs: &[&str]) -> Self {
        let items = specs
            .iter()
            .map(|s| toml::Value::String((*s).to_string()))
            .collect();
        self.field("dependencies", toml::Value::Array(items))
    }

    /// Arbitrary field, for malformed-metadata cases.
    pub fn field(mut self, key: &str, value: toml::Value) -> Self {
        self.table.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> toml::Table {
        self.table
    }
}
