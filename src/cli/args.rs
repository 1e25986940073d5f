//! CLI argument definitions.
//!
//! The platform invokes `bin/supply` with four positional directories; the
//! remaining settings come from flags or their environment variables.

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::{read_buildpack_version, SupplyConfig};
use crate::error::Result;

/// Supply the .NET Core SDK, Node.js and Bower for an application.
#[derive(Debug, Parser)]
#[command(name = "supply")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Application build directory
    pub build_dir: PathBuf,

    /// Buildpack cache directory (accepted, not used by supply)
    pub cache_dir: PathBuf,

    /// Shared dependencies directory
    pub deps_dir: PathBuf,

    /// This buildpack's index within the dependencies directory
    pub deps_idx: String,

    /// Buildpack root (defaults to the parent of the binary's directory)
    #[arg(long, env = "BUILDPACK_DIR")]
    pub buildpack_dir: Option<PathBuf>,

    /// Dependency manifest (defaults to <buildpack-dir>/manifest.yml)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Install Node.js even if the application does not need it
    #[arg(long, env = "INSTALL_NODE", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub install_node: bool,

    /// Stack the application is staged on
    #[arg(long, env = "CF_STACK")]
    pub stack: Option<String>,

    /// Enable debug logging
    #[arg(long, env = "BP_DEBUG", action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub debug: bool,
}

impl Cli {
    /// The buildpack root: `--buildpack-dir`, else two levels above the binary.
    pub fn buildpack_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.buildpack_dir {
            return Ok(dir.clone());
        }

        let exe = std::env::current_exe()?;
        Ok(exe
            .parent()
            .and_then(|bin| bin.parent())
            .map(PathBuf::from)
            .unwrap_or_default())
    }

    /// Path of the dependency manifest.
    pub fn manifest_path(&self) -> Result<PathBuf> {
        match &self.manifest {
            Some(path) => Ok(path.clone()),
            None => Ok(self.buildpack_dir()?.join("manifest.yml")),
        }
    }

    /// Settings for the supply phase.
    pub fn supply_config(&self) -> Result<SupplyConfig> {
        let mut config = SupplyConfig::default().with_install_node(self.install_node);
        if let Some(stack) = &self.stack {
            config = config.with_stack(stack.clone());
        }
        if let Some(version) = read_buildpack_version(&self.buildpack_dir()?) {
            config = config.with_buildpack_version(version);
        }
        Ok(config)
    }
}
