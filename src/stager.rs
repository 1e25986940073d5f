//! Staging directory layout.
//!
//! The stager tracks the application build dir, the shared deps dir, and
//! this buildpack's index within it. Everything the phase installs lands under `<deps_dir>/<deps_idx>`:
//!
//! ```text
//! <deps_dir>/<deps_idx>/
//!     bin/            links to executables, put on PATH by the platform
//!     env/NAME        one file per environment variable for later phases
//!     profile.d/      scripts sourced when the application starts
//!     config.yml      buildpack name and version
//! ```

use crate::error::{Result, SupplyError};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directories of a single staging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stager {
    build_dir: PathBuf,
    deps_dir: PathBuf,
    deps_idx: String,
}

#[derive(Serialize)]
struct ConfigYml<'a> {
    name: &'a str,
    config: ConfigVersion<'a>,
}

#[derive(Serialize)]
struct ConfigVersion<'a> {
    version: &'a str,
}

impl Stager {
    pub fn new(
        build_dir: impl Into<PathBuf>,
        deps_dir: impl Into<PathBuf>,
        deps_idx: impl Into<String>,
    ) -> Self {
        Self {
            build_dir: build_dir.into(),
            deps_dir: deps_dir.into(),
            deps_idx: deps_idx.into(),
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn deps_dir(&self) -> &Path {
        &self.deps_dir
    }

    pub fn deps_idx(&self) -> &str {
        &self.deps_idx
    }

    /// This buildpack's dependency directory, `<deps_dir>/<deps_idx>`.
    pub fn dep_dir(&self) -> PathBuf {
        self.deps_dir.join(&self.deps_idx)
    }

    /// Verify the build dir exists and create the dep dir.
    pub fn check(&self) -> Result<()> {
        if !self.build_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("build dir {} does not exist", self.build_dir.display()),
            )
            .into());
        }
        fs::create_dir_all(self.dep_dir())?;
        Ok(())
    }

    /// Link every entry of `src_dir` into `<dep_dir>/<dest_subdir>`.
    pub fn link_directory_in_dep_dir(&self, src_dir: &Path, dest_subdir: &str) -> Result<()> {
        let dest = self.dep_dir().join(dest_subdir);
        fs::create_dir_all(&dest)?;

        let mut entries: Vec<PathBuf> = fs::read_dir(src_dir)?
            .map(|e| e.map(|e| e.path()))
            .collect::<io::Result<_>>()?;
        entries.sort();

        for target in entries {
            if let Some(name) = target.file_name() {
                replace_link(&target, &dest.join(name))?;
            }
        }
        Ok(())
    }

    /// Link `target` as `<dep_dir>/bin/<name>`.
    pub fn add_bin_dependency_link(&self, target: &Path, name: &str) -> Result<()> {
        let bin = self.dep_dir().join("bin");
        fs::create_dir_all(&bin)?;
        replace_link(target, &bin.join(name))?;
        Ok(())
    }

    /// Write `<dep_dir>/env/<name>` holding `value`.
    pub fn write_env_file(&self, name: &str, value: &str) -> Result<()> {
        let env = self.dep_dir().join("env");
        fs::create_dir_all(&env)?;
        fs::write(env.join(name), value)?;
        Ok(())
    }

    /// Write `<dep_dir>/profile.d/<file>`.
    pub fn write_profile_d(&self, file: &str, contents: &str) -> Result<()> {
        let dir = self.dep_dir().join("profile.d");
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(file), contents)?;
        Ok(())
    }

    /// Write `<dep_dir>/config.yml` naming the buildpack and its version.
    pub fn write_config_yml(&self, name: &str, version: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(&ConfigYml {
            name,
            config: ConfigVersion { version },
        })
        .map_err(|e| SupplyError::Other(e.into()))?;

        fs::create_dir_all(self.dep_dir())?;
        fs::write(self.dep_dir().join("config.yml"), yaml)?;
        Ok(())
    }
}

fn replace_link(target: &Path, link: &Path) -> io::Result<()> {
    if link.symlink_metadata().is_ok() {
        if link.is_dir() && !link.is_symlink() {
            fs::remove_dir_all(link)?;
        } else {
            fs::remove_file(link)?;
        }
    }
    symlink(target, link)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    fs::copy(target, link).map(|_| ())
}
