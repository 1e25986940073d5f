//! Mock installer for testing.

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SupplyError};
use crate::manifest::Dependency;

use super::Installer;

/// A call the mock received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerCall {
    Fetch(Dependency, PathBuf),
    Install(Dependency, PathBuf),
    InstallOnlyVersion(String, PathBuf),
}

type SideEffect = Box<dyn Fn(&str, &Path) -> std::io::Result<()>>;

/// Records installs instead of performing them.
///
/// `fetch_dependency` writes an empty placeholder at the destination so
/// later steps can reference the file. An optional side effect runs on
/// `install_only_version` to lay out whatever the real archive would.
#[derive(Default)]
pub struct MockInstaller {
    calls: RefCell<Vec<InstallerCall>>,
    failure: Option<String>,
    on_install_only_version: Option<SideEffect>,
}

impl fmt::Debug for MockInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockInstaller")
            .field("calls", &self.calls)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

impl MockInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Run `effect(name, dest_dir)` on each `install_only_version`.
    pub fn on_install_only_version(
        mut self,
        effect: impl Fn(&str, &Path) -> std::io::Result<()> + 'static,
    ) -> Self {
        self.on_install_only_version = Some(Box::new(effect));
        self
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<InstallerCall> {
        self.calls.borrow().clone()
    }

    /// Dependencies passed to `install_dependency`.
    pub fn installed(&self) -> Vec<Dependency> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                InstallerCall::Install(dep, _) => Some(dep.clone()),
                _ => None,
            })
            .collect()
    }

    /// Dependencies passed to `fetch_dependency`.
    pub fn fetched(&self) -> Vec<Dependency> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                InstallerCall::Fetch(dep, _) => Some(dep.clone()),
                _ => None,
            })
            .collect()
    }

    fn check(&self, what: &str) -> Result<()> {
        match &self.failure {
            Some(message) => Err(SupplyError::Other(anyhow::anyhow!(
                "{}: {}",
                what,
                message
            ))),
            None => Ok(()),
        }
    }
}

impl Installer for MockInstaller {
    fn fetch_dependency(&self, dep: &Dependency, dest_file: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(InstallerCall::Fetch(dep.clone(), dest_file.to_path_buf()));
        self.check(&dep.to_string())?;

        if let Some(parent) = dest_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest_file, b"")?;
        Ok(())
    }

    fn install_dependency(&self, dep: &Dependency, dest_dir: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(InstallerCall::Install(dep.clone(), dest_dir.to_path_buf()));
        self.check(&dep.to_string())?;
        fs::create_dir_all(dest_dir)?;
        Ok(())
    }

    fn install_only_version(&self, name: &str, dest_dir: &Path) -> Result<()> {
        self.calls.borrow_mut().push(InstallerCall::InstallOnlyVersion(
            name.to_string(),
            dest_dir.to_path_buf(),
        ));
        self.check(name)?;
        fs::create_dir_all(dest_dir)?;

        if let Some(effect) = &self.on_install_only_version {
            effect(name, dest_dir)?;
        }
        Ok(())
    }
}
