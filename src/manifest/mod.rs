//! Dependency catalog.
//!
//! The [`Manifest`] trait is the boundary between the supply logic and the
//! buildpack's list of installable dependencies. [`BuildpackManifest`] reads
//! it from `manifest.yml`; [`MockManifest`] stands in for it in tests.

pub mod catalog;
pub mod mock;

pub use catalog::{BuildpackManifest, DefaultVersion, ManifestEntry};
pub use mock::MockManifest;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One installable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Catalog name, e.g. `dotnet-sdk`.
    pub name: String,
    /// Concrete version, e.g. `2.1.302`.
    pub version: String,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Source of available dependency versions.
pub trait Manifest {
    /// Every available version of `name`, in catalog order.
    fn all_dependency_versions(&self, name: &str) -> Vec<String>;

    /// The version to install when the application requests none.
    fn default_version(&self, name: &str) -> Result<Dependency>;
}
