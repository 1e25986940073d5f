//! Supply phase settings.
//!
//! Built once by the CLI from flags and environment variables and passed
//! into the [`Supplier`](crate::supply::Supplier); nothing below the CLI
//! reads the process environment.
//!
//! # Example
//!
//! ```
//! use dotnet_supply::config::SupplyConfig;
//!
//! let config = SupplyConfig::default()
//!     .with_install_node(true)
//!     .with_stack("cflinuxfs3");
//! assert!(config.install_node);
//! assert_eq!(config.stack.as_deref(), Some("cflinuxfs3"));
//! ```

use std::fs;
use std::path::Path;

/// Name written to the dep dir `config.yml`.
pub const BUILDPACK_NAME: &str = "dotnet-core";

/// File in the buildpack root holding its release version.
pub const VERSION_FILE: &str = "VERSION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyConfig {
    /// Install Node.js even when the project does not ask for it.
    pub install_node: bool,
    /// Stack the application is staged on, e.g. `cflinuxfs3`.
    pub stack: Option<String>,
    /// Buildpack release recorded in `config.yml`.
    pub buildpack_version: String,
}

impl Default for SupplyConfig {
    fn default() -> Self {
        Self {
            install_node: false,
            stack: None,
            buildpack_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl SupplyConfig {
    pub fn with_install_node(mut self, install_node: bool) -> Self {
        self.install_node = install_node;
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_buildpack_version(mut self, version: impl Into<String>) -> Self {
        self.buildpack_version = version.into();
        self
    }
}

/// Read the trimmed `VERSION` file of a buildpack, if present and non-empty.
pub fn read_buildpack_version(buildpack_dir: &Path) -> Option<String> {
    let content = fs::read_to_string(buildpack_dir.join(VERSION_FILE)).ok()?;
    let version = content.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}
