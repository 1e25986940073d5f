//! Requested SDK version discovery.
//!
//! Two files at the project root may pin the SDK:
//!
//! 1. `buildpack.yml`: `dotnet-core.sdk`, exact or floating. A file that
//!    cannot be read or parsed is ignored.
//! 2. `global.json`: `sdk.version`, the .NET SDK pin. Only consulted when
//!    `buildpack.yml` yields nothing. A file that is not JSON is fatal.

use crate::error::{Result, SupplyError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Buildpack configuration file name.
pub const BUILDPACK_YML: &str = "buildpack.yml";

/// SDK pin file name.
pub const GLOBAL_JSON: &str = "global.json";

const BOM: char = '\u{FEFF}';

/// Where the requested SDK version came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSource {
    /// `dotnet-core.sdk` in `buildpack.yml`.
    BuildpackConfig(String),
    /// `sdk.version` in `global.json`.
    LockFile(String),
    /// No version was requested.
    None,
}

impl VersionSource {
    /// The requested expression, if any.
    pub fn expression(&self) -> Option<&str> {
        match self {
            VersionSource::BuildpackConfig(expr) | VersionSource::LockFile(expr) => Some(expr),
            VersionSource::None => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct BuildpackYml {
    #[serde(rename = "dotnet-core", default)]
    dotnet_core: Option<DotnetCoreSection>,
}

#[derive(Debug, Default, Deserialize)]
struct DotnetCoreSection {
    #[serde(default)]
    sdk: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalJson {
    #[serde(default)]
    sdk: Option<GlobalJsonSdk>,
}

#[derive(Debug, Default, Deserialize)]
struct GlobalJsonSdk {
    #[serde(default)]
    version: Option<String>,
}

/// Read the requested SDK version for a project.
///
/// `buildpack.yml` wins; `global.json` is not opened at all when it does.
///
/// # Errors
///
/// Returns `MalformedVersionFile` if `global.json` is consulted and is not
/// valid JSON of the expected shape.
pub fn read_requested_version(project_root: &Path) -> Result<VersionSource> {
    if let Some(expr) = buildpack_yml_sdk_version(project_root) {
        tracing::debug!("{} requests SDK {}", BUILDPACK_YML, expr);
        return Ok(VersionSource::BuildpackConfig(expr));
    }

    if let Some(expr) = global_json_sdk_version(project_root)? {
        tracing::debug!("{} requests SDK {}", GLOBAL_JSON, expr);
        return Ok(VersionSource::LockFile(expr));
    }

    Ok(VersionSource::None)
}

/// `dotnet-core.sdk` from `buildpack.yml`, or `None` if absent or unusable.
pub fn buildpack_yml_sdk_version(project_root: &Path) -> Option<String> {
    let path = project_root.join(BUILDPACK_YML);
    if !path.exists() {
        return None;
    }

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };

    let parsed: BuildpackYml = match serde_yaml::from_str(&content) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            return None;
        }
    };

    let expr = parsed.dotnet_core?.sdk?;
    let expr = expr.trim();
    if expr.is_empty() {
        None
    } else {
        Some(expr.to_string())
    }
}

/// `sdk.version` from `global.json`.
///
/// Returns `Ok(None)` when the file, the `sdk` object or the `version` field
/// is missing, or the version is empty.
///
/// # Errors
///
/// Returns `MalformedVersionFile` if the file exists but cannot be parsed.
pub fn global_json_sdk_version(project_root: &Path) -> Result<Option<String>> {
    let path = project_root.join(GLOBAL_JSON);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|e| SupplyError::MalformedVersionFile {
        path: path.clone(),
        message: e.to_string(),
    })?;

    let parsed: GlobalJson = serde_json::from_str(content.trim_start_matches(BOM)).map_err(
        |e| SupplyError::MalformedVersionFile {
            path: path.clone(),
            message: e.to_string(),
        },
    )?;

    Ok(parsed
        .sdk
        .and_then(|sdk| sdk.version)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}
