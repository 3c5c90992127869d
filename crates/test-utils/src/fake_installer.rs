use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use anyhow::bail;
use scripthook::loader::{DependencyInstaller, Requirement};

/// A fake installer that:
/// - records every requirement it was asked to install
/// - fails for the names configured with [`RecordingInstaller::failing`].
#[derive(Debug, Clone, Default)]
pub struct RecordingInstaller {
    installed: Arc<Mutex<Vec<String>>>,
    failing: BTreeSet<String>,
}

impl RecordingInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Requirements passed to `install`, in call order.
    pub fn installed(&self) -> Vec<String> {
        self.installed.lock().unwrap().clone()
    }
}

impl DependencyInstaller for RecordingInstaller {
    fn install(&self, requirement: &Requirement) -> anyhow::Result<()> {
        self.installed.lock().unwrap().push(requirement.to_string());
        if self.failing.contains(requirement.name()) {
            bail!("package index unreachable");
        }
        Ok(())
    }
}
