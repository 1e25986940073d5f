//! Per-dependency outcomes of a supply run.

use crate::manifest::Dependency;
use std::fmt;

/// Why a dependency was not installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The application is published output.
    Published,
    /// The tool is already callable.
    AlreadyInstalled,
    /// Nothing in the application uses it.
    NotRequired,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Published => write!(f, "published application"),
            SkipReason::AlreadyInstalled => write!(f, "already installed"),
            SkipReason::NotRequired => write!(f, "not required"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(Dependency),
    Skipped(SkipReason),
}

/// What happened to one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDecision {
    pub name: String,
    pub outcome: InstallOutcome,
}

impl InstallDecision {
    pub fn installed(dep: Dependency) -> Self {
        Self {
            name: dep.name.clone(),
            outcome: InstallOutcome::Installed(dep),
        }
    }

    pub fn skipped(name: &str, reason: SkipReason) -> Self {
        Self {
            name: name.to_string(),
            outcome: InstallOutcome::Skipped(reason),
        }
    }

    /// The installed dependency, if any.
    pub fn dependency(&self) -> Option<&Dependency> {
        match &self.outcome {
            InstallOutcome::Installed(dep) => Some(dep),
            InstallOutcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.outcome {
            InstallOutcome::Skipped(reason) => Some(reason),
            InstallOutcome::Installed(_) => None,
        }
    }
}

impl fmt::Display for InstallDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            InstallOutcome::Installed(dep) => write!(f, "installed {}", dep),
            InstallOutcome::Skipped(reason) => write!(f, "skipped {} ({})", self.name, reason),
        }
    }
}

/// Decisions of a supply run, in the order they were made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyReport {
    pub decisions: Vec<InstallDecision>,
}

impl SupplyReport {
    pub fn push(&mut self, decision: InstallDecision) {
        self.decisions.push(decision);
    }

    /// The decision recorded for `name`.
    pub fn decision(&self, name: &str) -> Option<&InstallDecision> {
        self.decisions.iter().find(|d| d.name == name)
    }

    /// Every dependency that was installed.
    pub fn installed(&self) -> Vec<&Dependency> {
        self.decisions.iter().filter_map(|d| d.dependency()).collect()
    }
}
