//! Mock catalog for testing.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{Result, SupplyError};

use super::{Dependency, Manifest};

/// In-memory catalog with configurable versions and defaults.
///
/// Records which names had their default version requested, so tests can
/// assert that the default-version policy was (or was not) applied.
#[derive(Debug, Default)]
pub struct MockManifest {
    versions: HashMap<String, Vec<String>>,
    defaults: HashMap<String, Dependency>,
    default_requests: RefCell<Vec<String>>,
}

impl MockManifest {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the available versions of a dependency.
    pub fn with_versions(mut self, name: &str, versions: &[&str]) -> Self {
        self.versions.insert(
            name.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Set the default version of a dependency.
    pub fn with_default(mut self, dep: Dependency) -> Self {
        self.defaults.insert(dep.name.clone(), dep);
        self
    }

    /// Names passed to `default_version`, in order.
    pub fn default_requests(&self) -> Vec<String> {
        self.default_requests.borrow().clone()
    }
}

impl Manifest for MockManifest {
    fn all_dependency_versions(&self, name: &str) -> Vec<String> {
        self.versions.get(name).cloned().unwrap_or_default()
    }

    fn default_version(&self, name: &str) -> Result<Dependency> {
        self.default_requests.borrow_mut().push(name.to_string());
        self.defaults
            .get(name)
            .cloned()
            .ok_or_else(|| SupplyError::DefaultVersionUnavailable {
                name: name.to_string(),
                message: "no default configured".to_string(),
            })
    }
}
