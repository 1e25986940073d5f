//! Subprocess execution.

use crate::error::{Result, SupplyError};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs external programs on behalf of the supply phase.
///
/// Output is copied to the given writers; pass [`std::io::sink`] to discard it.
pub trait Executor {
    /// Run `program args...` in `dir`, failing unless it exits zero.
    fn execute(
        &self,
        dir: &Path,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        program: &str,
        args: &[&str],
    ) -> Result<()>;
}

/// Render a command line for logs and error messages.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Executor backed by `std::process::Command`.
///
/// Directories in `path_prefix` are searched before the inherited `PATH`,
/// so tools staged into the dep dir are callable by later steps.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    path_prefix: Vec<PathBuf>,
}

impl SystemExecutor {
    /// Create an executor that inherits the process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `dir` before the inherited `PATH`.
    pub fn with_path_prefix(mut self, dir: impl Into<PathBuf>) -> Self {
        self.path_prefix.push(dir.into());
        self
    }

    fn search_path(&self) -> Option<OsString> {
        if self.path_prefix.is_empty() {
            return None;
        }

        let inherited = std::env::var_os("PATH").unwrap_or_default();
        let entries = self
            .path_prefix
            .iter()
            .cloned()
            .chain(std::env::split_paths(&inherited));
        std::env::join_paths(entries).ok()
    }
}

impl Executor for SystemExecutor {
    fn execute(
        &self,
        dir: &Path,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        program: &str,
        args: &[&str],
    ) -> Result<()> {
        let line = command_line(program, args);
        tracing::debug!("Running `{}` in {}", line, dir.display());

        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);

        if let Some(path) = self.search_path() {
            cmd.env("PATH", path);
        }

        let output = cmd.output().map_err(|_| SupplyError::CommandFailed {
            command: line.clone(),
            code: None,
        })?;

        stdout.write_all(&output.stdout)?;
        stderr.write_all(&output.stderr)?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SupplyError::CommandFailed {
                command: line,
                code: output.status.code(),
            })
        }
    }
}
