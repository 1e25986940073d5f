//! Error types for supply operations.
//!
//! This module defines [`SupplyError`], the single terminal error type of the
//! supply phase, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every variant aborts the supply phase; there is no partial success
//! - Presence checks (`node -v`, `bower -v`) never surface as errors, they
//!   are reinterpreted as "not installed" by the caller
//! - Messages embed the literal inputs (expressions, catalogs, paths) so a
//!   failed staging log is actionable without re-running in debug mode

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for supply operations.
#[derive(Debug, Error)]
pub enum SupplyError {
    /// Requested version expression is not satisfiable by the catalog.
    #[error("no match found for {expression} in [{}]", .versions.join(" "))]
    NoMatchingVersion {
        expression: String,
        versions: Vec<String>,
    },

    /// A catalog version could not be compared numerically.
    #[error("version `{version}` has a non-numeric segment")]
    InvalidVersion { version: String },

    /// Version file exists but is not parseable.
    #[error("Failed to parse {path}: {message}")]
    MalformedVersionFile { path: PathBuf, message: String },

    /// A tool needed to install another dependency is not callable.
    #[error("Trying to install {required_by} but {tool} is not installed")]
    MissingHostTool { tool: String, required_by: String },

    /// The installer collaborator failed.
    #[error("Failed to install {dependency}: {message}")]
    InstallFailed { dependency: String, message: String },

    /// No version could be chosen and the catalog has no usable default.
    #[error("No default version available for {name}: {message}")]
    DefaultVersionUnavailable { name: String, message: String },

    /// Buildpack manifest could not be loaded.
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParseError { path: PathBuf, message: String },

    /// Downloaded artifact does not match the catalog checksum.
    #[error("dependency sha256 mismatch for {dependency}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        dependency: String,
        expected: String,
        actual: String,
    },

    /// Subprocess failed to start or exited non-zero.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SupplyError {
    /// Creates a new NoMatchingVersion error
    pub fn no_match(expression: impl Into<String>, versions: &[String]) -> Self {
        SupplyError::NoMatchingVersion {
            expression: expression.into(),
            versions: versions.to_vec(),
        }
    }

    /// Wraps an installer failure with the identity of what was being installed.
    pub fn install_failed(dependency: impl ToString, source: SupplyError) -> Self {
        SupplyError::InstallFailed {
            dependency: dependency.to_string(),
            message: source.to_string(),
        }
    }
}

/// Result type alias for supply operations.
pub type Result<T> = std::result::Result<T, SupplyError>;
