//! Project inspection.
//!
//! Classifies the application in the build directory:
//!
//! - **published**: `dotnet publish` output (a root-level
//!   `*.runtimeconfig.json`); nothing needs compiling, so no Node.js tooling
//!   is installed for it
//! - **source**: one or more MSBuild project files whose `Exec` tasks may
//!   call `npm` or `bower` during publish

pub mod files;
pub mod scripts;

pub use files::{project_files, runtime_config_files, PROJECT_EXTENSIONS};

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Tool invoked by project files that need the Bower package manager.
pub const BOWER_COMMAND: &str = "bower";

/// Tool invoked by project files that need the Node.js runtime.
pub const NPM_COMMAND: &str = "npm";

/// What the supply phase needs to know about an application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectClassification {
    /// The build dir holds published output.
    pub is_published: bool,
    /// A project file runs `bower`.
    pub needs_package_manager_script: bool,
    /// A project file runs `npm`.
    pub needs_js_runtime_script: bool,
}

impl ProjectClassification {
    /// Whether Node.js is needed to run the project's publish scripts.
    pub fn needs_node(&self) -> bool {
        self.needs_js_runtime_script || self.needs_package_manager_script
    }
}

/// An application source tree.
#[derive(Debug, Clone)]
pub struct Project {
    build_dir: PathBuf,
}

impl Project {
    /// Create a project rooted at the build directory.
    pub fn new(build_dir: &Path) -> Self {
        Self {
            build_dir: build_dir.to_path_buf(),
        }
    }

    /// The build directory.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Classify the project in a single pass over its files.
    pub fn classify(&self) -> Result<ProjectClassification> {
        let is_published = self.is_published()?;
        let tools = self.invoked_tools()?;

        let classification = ProjectClassification {
            is_published,
            needs_package_manager_script: tools.iter().any(|t| t == BOWER_COMMAND),
            needs_js_runtime_script: tools.iter().any(|t| t == NPM_COMMAND),
        };
        tracing::debug!("Project classification: {:?}", classification);
        Ok(classification)
    }

    /// Whether the build dir holds published output.
    pub fn is_published(&self) -> Result<bool> {
        Ok(!runtime_config_files(&self.build_dir)?.is_empty())
    }

    /// MSBuild project files in the build dir.
    pub fn project_files(&self) -> Result<Vec<PathBuf>> {
        Ok(project_files(&self.build_dir)?)
    }

    /// Whether any project file runs `bower`.
    pub fn needs_bower(&self) -> Result<bool> {
        Ok(self.invoked_tools()?.iter().any(|t| t == BOWER_COMMAND))
    }

    /// Whether any project file runs `npm` or `bower`.
    pub fn needs_node(&self) -> Result<bool> {
        Ok(self
            .invoked_tools()?
            .iter()
            .any(|t| t == NPM_COMMAND || t == BOWER_COMMAND))
    }

    fn invoked_tools(&self) -> Result<Vec<String>> {
        let mut tools = Vec::new();
        for path in self.project_files()? {
            let bytes = fs::read(&path)?;
            tools.extend(scripts::invoked_tools(&String::from_utf8_lossy(&bytes)));
        }
        Ok(tools)
    }
}
