//! Dependency download and installation.
//!
//! The [`Installer`] trait is what the supply logic delegates physical
//! installs to. [`ManifestInstaller`] downloads entries of the buildpack
//! manifest, verifies their checksum and unpacks them; [`MockInstaller`]
//! records calls for tests.

pub mod fetch;
pub mod mock;

pub use fetch::{archive_kind, sha256_file, ArchiveKind, ManifestInstaller};
pub use mock::{InstallerCall, MockInstaller};

use crate::error::Result;
use crate::manifest::Dependency;
use std::path::Path;

/// Fetches and unpacks catalog dependencies.
pub trait Installer {
    /// Download `dep` to the file `dest_file` without unpacking it.
    fn fetch_dependency(&self, dep: &Dependency, dest_file: &Path) -> Result<()>;

    /// Download `dep` and unpack it into `dest_dir`.
    fn install_dependency(&self, dep: &Dependency, dest_dir: &Path) -> Result<()>;

    /// Install the single catalog version of `name` into `dest_dir`.
    ///
    /// Fails when the catalog has zero or several versions of `name`.
    fn install_only_version(&self, name: &str, dest_dir: &Path) -> Result<()>;
}
