//! Buildpack `manifest.yml` loading.
//!
//! ```yaml
//! language: dotnet-core
//! default_versions:
//!   - name: dotnet-sdk
//!     version: 2.1.x
//! dependencies:
//!   - name: dotnet-sdk
//!     version: 2.1.302
//!     uri: https://buildpacks.example.com/dotnet-sdk.2.1.302.linux-amd64.tar.xz
//!     sha256: 5d0a1a9f...
//!     cf_stacks: [cflinuxfs3]
//! ```
//!
//! Entries that list `cf_stacks` are only available on those stacks.

use crate::error::{Result, SupplyError};
use crate::manifest::{Dependency, Manifest};
use crate::version;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A downloadable dependency listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub version: String,
    pub uri: String,
    #[serde(default)]
    pub sha256: String,
    #[serde(default)]
    pub cf_stacks: Vec<String>,
}

impl ManifestEntry {
    /// Whether the entry can be installed on `stack` (any stack when unset).
    pub fn supports_stack(&self, stack: Option<&str>) -> bool {
        match stack {
            Some(stack) if !self.cf_stacks.is_empty() => self.cf_stacks.iter().any(|s| s == stack),
            _ => true,
        }
    }
}

/// Default version declaration; `version` may be a floating expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DefaultVersion {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    language: String,
    #[serde(default)]
    default_versions: Vec<DefaultVersion>,
    #[serde(default)]
    dependencies: Vec<ManifestEntry>,
}

/// The buildpack's dependency catalog.
#[derive(Debug, Clone)]
pub struct BuildpackManifest {
    path: PathBuf,
    language: String,
    stack: Option<String>,
    default_versions: Vec<DefaultVersion>,
    dependencies: Vec<ManifestEntry>,
}

impl BuildpackManifest {
    /// Load `manifest.yml`, keeping only entries available on `stack`.
    ///
    /// # Errors
    ///
    /// Returns `ManifestParseError` if the file is missing or invalid.
    pub fn load(path: &Path, stack: Option<&str>) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SupplyError::ManifestParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path, stack)
    }

    /// Parse manifest YAML.
    ///
    /// # Arguments
    ///
    /// * `content` - The YAML content to parse
    /// * `source_path` - Path for error reporting
    /// * `stack` - Stack to filter dependencies by
    pub fn parse(content: &str, source_path: &Path, stack: Option<&str>) -> Result<Self> {
        let file: ManifestFile =
            serde_yaml::from_str(content).map_err(|e| SupplyError::ManifestParseError {
                path: source_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let dependencies: Vec<ManifestEntry> = file
            .dependencies
            .into_iter()
            .filter(|d| d.supports_stack(stack))
            .collect();

        tracing::debug!(
            "Loaded {} dependencies from {}",
            dependencies.len(),
            source_path.display()
        );

        Ok(Self {
            path: source_path.to_path_buf(),
            language: file.language,
            stack: stack.map(String::from),
            default_versions: file.default_versions,
            dependencies,
        })
    }

    /// Path the manifest was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The buildpack language, e.g. `dotnet-core`.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The stack dependencies were filtered by.
    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    /// The entry for an exact dependency.
    pub fn entry(&self, dep: &Dependency) -> Option<&ManifestEntry> {
        self.dependencies
            .iter()
            .find(|d| d.name == dep.name && d.version == dep.version)
    }
}

impl Manifest for BuildpackManifest {
    fn all_dependency_versions(&self, name: &str) -> Vec<String> {
        let mut versions: Vec<String> = Vec::new();
        for entry in self.dependencies.iter().filter(|d| d.name == name) {
            if !versions.contains(&entry.version) {
                versions.push(entry.version.clone());
            }
        }
        versions
    }

    fn default_version(&self, name: &str) -> Result<Dependency> {
        let declared = self
            .default_versions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| SupplyError::DefaultVersionUnavailable {
                name: name.to_string(),
                message: format!("no default_versions entry in {}", self.path.display()),
            })?;

        let versions = self.all_dependency_versions(name);
        let resolved = version::resolve(&declared.version, &versions).map_err(|e| {
            SupplyError::DefaultVersionUnavailable {
                name: name.to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(Dependency::new(name, resolved))
    }
}
