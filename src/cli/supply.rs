//! The `supply` command.
//!
//! Wires the production collaborators together: the manifest catalog, a
//! system executor that also searches the dep dir `bin`, and the
//! manifest-backed installer.

use crate::cli::args::Cli;
use crate::error::Result;
use crate::installer::ManifestInstaller;
use crate::manifest::BuildpackManifest;
use crate::shell::SystemExecutor;
use crate::stager::Stager;
use crate::supply::{Supplier, SupplyReport};

/// Runs the supply phase for parsed arguments.
pub struct SupplyCommand {
    cli: Cli,
}

impl SupplyCommand {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    pub fn execute(&self) -> Result<SupplyReport> {
        let config = self.cli.supply_config()?;
        let stager = Stager::new(
            &self.cli.build_dir,
            &self.cli.deps_dir,
            self.cli.deps_idx.clone(),
        );

        let manifest_path = self.cli.manifest_path()?;
        tracing::debug!("Loading manifest from {}", manifest_path.display());
        let manifest = BuildpackManifest::load(&manifest_path, config.stack.as_deref())?;
        tracing::debug!("Manifest language: {}", manifest.language());

        let executor = SystemExecutor::new().with_path_prefix(stager.dep_dir().join("bin"));
        let installer = ManifestInstaller::new(&manifest, &executor)?;

        Supplier::new(&stager, &manifest, &installer, &executor, &config).run()
    }
}
