//! The supply phase.
//!
//! [`Supplier`] decides, per dependency, whether to install it and which
//! version, then delegates the physical work to its collaborators:
//!
//! | Dependency   | Installed when                                          |
//! |--------------|---------------------------------------------------------|
//! | `dotnet-sdk` | always                                                  |
//! | `node`       | forced by config, or absent and needed by a source build |
//! | `bower`      | absent and needed by a source build                     |
//!
//! SDK version precedence is `buildpack.yml`, then `global.json`, then the
//! catalog default. A `global.json` pin missing from the catalog rolls
//! forward to the newest patch of its `major.minor` line before falling
//! back to the default.

pub mod decision;

pub use decision::{InstallDecision, InstallOutcome, SkipReason, SupplyReport};

use crate::config::{SupplyConfig, BUILDPACK_NAME};
use crate::error::{Result, SupplyError};
use crate::installer::Installer;
use crate::manifest::{Dependency, Manifest};
use crate::project::{Project, ProjectClassification};
use crate::shell::Executor;
use crate::stager::Stager;
use crate::version::{self, VersionExpression, VersionSource};
use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Catalog name of the .NET SDK.
pub const DOTNET_SDK: &str = "dotnet-sdk";

/// Catalog name of Node.js.
pub const NODE: &str = "node";

/// Catalog name of Bower.
pub const BOWER: &str = "bower";

/// Dep dir subdirectory holding the SDK.
const SDK_DIR: &str = "dotnet-sdk";

/// Dep dir subdirectory holding Node.js.
const NODE_DIR: &str = "node";

/// Scratch directories inside the dep dir, removed after use.
const NODE_SCRATCH_DIR: &str = "node-dist";
const BOWER_SCRATCH_DIR: &str = "bower-dist";

/// Runs the supply phase for one application.
pub struct Supplier<'a> {
    stager: &'a Stager,
    manifest: &'a dyn Manifest,
    installer: &'a dyn Installer,
    executor: &'a dyn Executor,
    config: &'a SupplyConfig,
    project: Project,
    classification: Cell<Option<ProjectClassification>>,
}

impl<'a> Supplier<'a> {
    pub fn new(
        stager: &'a Stager,
        manifest: &'a dyn Manifest,
        installer: &'a dyn Installer,
        executor: &'a dyn Executor,
        config: &'a SupplyConfig,
    ) -> Self {
        Self {
            stager,
            manifest,
            installer,
            executor,
            config,
            project: Project::new(stager.build_dir()),
            classification: Cell::new(None),
        }
    }

    /// Install the SDK, Node.js and Bower, then wire the SDK into the
    /// application environment.
    pub fn run(&self) -> Result<SupplyReport> {
        tracing::info!("Supplying Dotnet Core");
        self.stager.check()?;

        let mut report = SupplyReport::default();
        report.push(self.install_dotnet_sdk()?);
        report.push(self.install_node()?);
        report.push(self.install_bower()?);

        self.wire_dotnet_sdk()?;
        self.stager
            .write_config_yml(BUILDPACK_NAME, &self.config.buildpack_version)?;

        for decision in &report.decisions {
            tracing::debug!("{}", decision);
        }
        Ok(report)
    }

    /// Install the selected SDK into `<dep_dir>/dotnet-sdk`.
    pub fn install_dotnet_sdk(&self) -> Result<InstallDecision> {
        let dep = self.select_sdk_version()?;
        self.installer
            .install_dependency(&dep, &self.sdk_dir())
            .map_err(|e| SupplyError::install_failed(&dep, e))?;
        Ok(InstallDecision::installed(dep))
    }

    /// Choose the SDK version to install.
    pub fn select_sdk_version(&self) -> Result<Dependency> {
        let versions = self.manifest.all_dependency_versions(DOTNET_SDK);

        let source = version::read_requested_version(self.stager.build_dir())?;
        tracing::debug!(
            "Requested SDK {:?} against {} catalog versions",
            source.expression(),
            versions.len()
        );

        match source {
            VersionSource::BuildpackConfig(expression) => {
                let resolved = version::resolve(&expression, &versions)?;
                tracing::info!("Using dotnet-sdk {} from buildpack.yml", resolved);
                Ok(Dependency::new(DOTNET_SDK, resolved))
            }
            VersionSource::LockFile(expression) => {
                match self.resolve_lock_file_version(&expression, &versions) {
                    Some(resolved) => Ok(Dependency::new(DOTNET_SDK, resolved)),
                    None => {
                        tracing::warn!(
                            "SDK {} in global.json is not available, using the default",
                            expression
                        );
                        self.default_sdk()
                    }
                }
            }
            VersionSource::None => self.default_sdk(),
        }
    }

    fn resolve_lock_file_version(&self, expression: &str, versions: &[String]) -> Option<String> {
        match version::resolve(expression, versions) {
            Ok(resolved) => return Some(resolved),
            Err(e) => tracing::debug!("global.json version not in catalog: {}", e),
        }

        let line = VersionExpression::parse(expression)?.version_line()?;
        match version::resolve(&line, versions) {
            Ok(resolved) => {
                tracing::warn!(
                    "SDK {} in global.json is not available, using {} from the same line",
                    expression,
                    resolved
                );
                Some(resolved)
            }
            Err(e) => {
                tracing::debug!("No SDK on line {}: {}", line, e);
                None
            }
        }
    }

    fn default_sdk(&self) -> Result<Dependency> {
        let dep = self.manifest.default_version(DOTNET_SDK)?;
        tracing::info!("Using default {}", dep);
        Ok(dep)
    }

    /// Install Node.js into `<dep_dir>/node` when needed.
    pub fn install_node(&self) -> Result<InstallDecision> {
        if self.config.install_node {
            tracing::info!("INSTALL_NODE is set, installing Node.js");
        } else {
            if self.tool_available(NODE) {
                return Ok(self.skip(NODE, SkipReason::AlreadyInstalled));
            }
            let classification = self.classification()?;
            if classification.is_published {
                return Ok(self.skip(NODE, SkipReason::Published));
            }
            if !classification.needs_node() {
                return Ok(self.skip(NODE, SkipReason::NotRequired));
            }
        }

        let dep = self.first_catalog_version(NODE)?;
        let dep_dir = self.stager.dep_dir();
        let scratch = dep_dir.join(NODE_SCRATCH_DIR);
        let node_dir = dep_dir.join(NODE_DIR);

        if let Err(e) = self.installer.install_only_version(NODE, &scratch) {
            discard_scratch(&scratch);
            return Err(SupplyError::install_failed(&dep, e));
        }

        let unpacked = scratch.join(format!("node-v{}-linux-x64", dep.version));
        if node_dir.exists() {
            fs::remove_dir_all(&node_dir)?;
        }
        if unpacked.is_dir() {
            fs::rename(&unpacked, &node_dir)?;
            fs::remove_dir_all(&scratch)?;
        } else {
            fs::rename(&scratch, &node_dir)?;
        }

        self.link_node_bin(&node_dir)?;
        Ok(InstallDecision::installed(dep))
    }

    /// Install Bower globally through npm when needed.
    pub fn install_bower(&self) -> Result<InstallDecision> {
        let classification = self.classification()?;
        if classification.is_published {
            return Ok(self.skip(BOWER, SkipReason::Published));
        }
        if !classification.needs_package_manager_script {
            return Ok(self.skip(BOWER, SkipReason::NotRequired));
        }
        if !self.tool_available("npm") {
            return Err(SupplyError::MissingHostTool {
                tool: "npm".to_string(),
                required_by: BOWER.to_string(),
            });
        }
        if self.tool_available(BOWER) {
            return Ok(self.skip(BOWER, SkipReason::AlreadyInstalled));
        }

        let dep = self.first_catalog_version(BOWER)?;
        let scratch = self.stager.dep_dir().join(BOWER_SCRATCH_DIR);
        let tarball = scratch.join(format!("bower-{}.tgz", dep.version));

        tracing::info!("Installing {}", dep);
        let tarball_arg = tarball.to_string_lossy();
        let installed = self
            .installer
            .fetch_dependency(&dep, &tarball)
            .and_then(|()| {
                self.executor.execute(
                    self.stager.build_dir(),
                    &mut io::stdout(),
                    &mut io::stderr(),
                    "npm",
                    &["install", "-g", tarball_arg.as_ref()],
                )
            });
        if let Err(e) = installed {
            discard_scratch(&scratch);
            return Err(SupplyError::install_failed(&dep, e));
        }
        fs::remove_dir_all(&scratch)?;

        self.link_node_bin(&self.stager.dep_dir().join(NODE_DIR))?;
        Ok(InstallDecision::installed(dep))
    }

    /// Export `DOTNET_ROOT` and put `dotnet` on the PATH.
    fn wire_dotnet_sdk(&self) -> Result<()> {
        let sdk_dir = self.sdk_dir();
        self.stager
            .write_env_file("DOTNET_ROOT", &sdk_dir.to_string_lossy())?;
        self.stager
            .add_bin_dependency_link(&sdk_dir.join("dotnet"), "dotnet")?;

        let script = format!(
            "export DOTNET_ROOT=$DEPS_DIR/{idx}/{sdk}\nexport PATH=$DOTNET_ROOT:$PATH\n",
            idx = self.stager.deps_idx(),
            sdk = SDK_DIR,
        );
        self.stager.write_profile_d("dotnet.sh", &script)
    }

    fn sdk_dir(&self) -> PathBuf {
        self.stager.dep_dir().join(SDK_DIR)
    }

    fn link_node_bin(&self, node_dir: &Path) -> Result<()> {
        let bin = node_dir.join("bin");
        if bin.is_dir() {
            self.stager.link_directory_in_dep_dir(&bin, "bin")
        } else {
            tracing::warn!("{} has no bin directory", node_dir.display());
            Ok(())
        }
    }

    fn first_catalog_version(&self, name: &str) -> Result<Dependency> {
        self.manifest
            .all_dependency_versions(name)
            .into_iter()
            .next()
            .map(|version| Dependency::new(name, version))
            .ok_or_else(|| SupplyError::DefaultVersionUnavailable {
                name: name.to_string(),
                message: "no versions in manifest".to_string(),
            })
    }

    fn classification(&self) -> Result<ProjectClassification> {
        if let Some(classification) = self.classification.get() {
            return Ok(classification);
        }
        let classification = self.project.classify()?;
        self.classification.set(Some(classification));
        Ok(classification)
    }

    /// Whether `<tool> -v` runs successfully. Failures mean "absent".
    fn tool_available(&self, tool: &str) -> bool {
        match self.executor.execute(
            self.stager.build_dir(),
            &mut io::sink(),
            &mut io::sink(),
            tool,
            &["-v"],
        ) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("{} not available: {}", tool, e);
                false
            }
        }
    }

    fn skip(&self, name: &str, reason: SkipReason) -> InstallDecision {
        tracing::info!("Skipping {}: {}", name, reason);
        InstallDecision::skipped(name, reason)
    }
}

/// Best-effort removal of a scratch dir after a failed install.
fn discard_scratch(scratch: &Path) {
    if scratch.exists() {
        if let Err(e) = fs::remove_dir_all(scratch) {
            tracing::debug!("Could not remove {}: {}", scratch.display(), e);
        }
    }
}
