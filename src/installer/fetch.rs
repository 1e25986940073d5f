//! Manifest-backed installer.
//!
//! Downloads come from the entry's `uri`: `http(s)://` through a blocking
//! HTTP client, `file://` (offline buildpacks) by copying. Every download is
//! checked against the entry's `sha256` before use.

use crate::error::{Result, SupplyError};
use crate::installer::Installer;
use crate::manifest::{BuildpackManifest, Dependency, Manifest, ManifestEntry};
use crate::shell::Executor;
use anyhow::anyhow;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

/// Default download timeout.
const DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// Archive formats the installer can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    TarXz,
    Tar,
}

impl ArchiveKind {
    /// `tar` flags that extract this format.
    fn tar_flags(self) -> &'static str {
        match self {
            ArchiveKind::TarGz => "xzf",
            ArchiveKind::TarXz => "xJf",
            ArchiveKind::Tar => "xf",
        }
    }
}

/// Archive format implied by a download URI.
pub fn archive_kind(uri: &str) -> Option<ArchiveKind> {
    let uri = uri.split(['?', '#']).next().unwrap_or(uri);
    if uri.ends_with(".tar.gz") || uri.ends_with(".tgz") {
        Some(ArchiveKind::TarGz)
    } else if uri.ends_with(".tar.xz") {
        Some(ArchiveKind::TarXz)
    } else if uri.ends_with(".tar") {
        Some(ArchiveKind::Tar)
    } else {
        None
    }
}

/// Hex-encoded SHA-256 of a file.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(&hasher.finalize()[..]))
}

/// Installs dependencies listed in the buildpack manifest.
pub struct ManifestInstaller<'a> {
    manifest: &'a BuildpackManifest,
    executor: &'a dyn Executor,
    client: reqwest::blocking::Client,
}

impl<'a> ManifestInstaller<'a> {
    /// Create an installer with the default download timeout.
    pub fn new(manifest: &'a BuildpackManifest, executor: &'a dyn Executor) -> Result<Self> {
        Self::with_timeout(manifest, executor, Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
    }

    /// Create an installer with a custom download timeout.
    pub fn with_timeout(
        manifest: &'a BuildpackManifest,
        executor: &'a dyn Executor,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("dotnet-supply/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SupplyError::Other(e.into()))?;

        Ok(Self {
            manifest,
            executor,
            client,
        })
    }

    fn entry(&self, dep: &Dependency) -> Result<&ManifestEntry> {
        self.manifest.entry(dep).ok_or_else(|| {
            SupplyError::Other(anyhow!(
                "dependency {} not found in {}",
                dep,
                self.manifest.path().display()
            ))
        })
    }

    fn download(&self, entry: &ManifestEntry, dest_file: &Path) -> Result<()> {
        if let Some(parent) = dest_file.parent() {
            fs::create_dir_all(parent)?;
        }

        if let Some(local) = entry.uri.strip_prefix("file://") {
            fs::copy(local, dest_file)?;
            return Ok(());
        }

        let mut response = self
            .client
            .get(&entry.uri)
            .send()
            .map_err(|e| SupplyError::Other(anyhow!("Failed to fetch {}: {}", entry.uri, e)))?;

        if !response.status().is_success() {
            return Err(SupplyError::Other(anyhow!(
                "HTTP {} fetching {}",
                response.status(),
                entry.uri
            )));
        }

        let mut file = fs::File::create(dest_file)?;
        if let Err(e) = response.copy_to(&mut file) {
            drop(file);
            let _ = fs::remove_file(dest_file);
            return Err(SupplyError::Other(anyhow!(
                "Failed to read {}: {}",
                entry.uri,
                e
            )));
        }
        Ok(())
    }

    fn verify(&self, dep: &Dependency, entry: &ManifestEntry, file: &Path) -> Result<()> {
        if entry.sha256.is_empty() {
            tracing::warn!("No sha256 listed for {}, skipping verification", dep);
            return Ok(());
        }

        let actual = sha256_file(file)?;
        if !actual.eq_ignore_ascii_case(&entry.sha256) {
            let _ = fs::remove_file(file);
            return Err(SupplyError::ChecksumMismatch {
                dependency: dep.to_string(),
                expected: entry.sha256.clone(),
                actual,
            });
        }
        Ok(())
    }

    fn extract(&self, kind: ArchiveKind, archive: &Path, dest_dir: &Path) -> Result<()> {
        let archive = archive.to_string_lossy();
        let dest = dest_dir.to_string_lossy();
        self.executor.execute(
            dest_dir,
            &mut io::sink(),
            &mut io::stderr(),
            "tar",
            &[kind.tar_flags(), archive.as_ref(), "-C", dest.as_ref()],
        )
    }
}

impl Installer for ManifestInstaller<'_> {
    fn fetch_dependency(&self, dep: &Dependency, dest_file: &Path) -> Result<()> {
        let entry = self.entry(dep)?;
        tracing::info!("Downloading {}", dep);
        tracing::debug!("Download [{}]", entry.uri);

        self.download(entry, dest_file)?;
        self.verify(dep, entry, dest_file)
    }

    fn install_dependency(&self, dep: &Dependency, dest_dir: &Path) -> Result<()> {
        let entry = self.entry(dep)?;
        let kind = archive_kind(&entry.uri)
            .ok_or_else(|| SupplyError::Other(anyhow!("unsupported archive: {}", entry.uri)))?;

        tracing::info!("Installing {}", dep);
        fs::create_dir_all(dest_dir)?;

        let archive = dest_dir.join(format!(".{}-{}.download", dep.name, dep.version));
        self.fetch_dependency(dep, &archive)?;
        let extracted = self.extract(kind, &archive, dest_dir);
        fs::remove_file(&archive)?;
        extracted
    }

    fn install_only_version(&self, name: &str, dest_dir: &Path) -> Result<()> {
        let versions = self.manifest.all_dependency_versions(name);
        match versions.as_slice() {
            [version] => self.install_dependency(&Dependency::new(name, version.clone()), dest_dir),
            [] => Err(SupplyError::Other(anyhow!("no versions of {} found", name))),
            _ => Err(SupplyError::Other(anyhow!(
                "more than one version of {} found",
                name
            ))),
        }
    }
}
