//! Mock executor for testing.
//!
//! `MockExecutor` records every command it is asked to run and answers with
//! pre-configured outcomes, so presence checks like `node -v` can be
//! scripted without the tools being installed.
//!
//! # Example
//!
//! ```
//! use dotnet_supply::shell::{Executor, MockExecutor};
//! use std::io;
//! use std::path::Path;
//!
//! let executor = MockExecutor::new();
//! executor.fail("node -v");
//!
//! let dir = Path::new("/tmp");
//! assert!(executor
//!     .execute(dir, &mut io::sink(), &mut io::sink(), "node", &["-v"])
//!     .is_err());
//! assert!(executor
//!     .execute(dir, &mut io::sink(), &mut io::sink(), "npm", &["-v"])
//!     .is_ok());
//! assert!(executor.was_called("node -v"));
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SupplyError};

use super::command::{command_line, Executor};

/// A command the mock was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    /// Working directory.
    pub dir: PathBuf,
    /// Full command line, e.g. `npm install -g /tmp/bower.tgz`.
    pub command: String,
}

/// Mock executor implementation for testing.
///
/// Commands succeed unless their command line (or program name) was
/// registered with [`MockExecutor::fail`].
#[derive(Debug, Default)]
pub struct MockExecutor {
    failing: RefCell<HashSet<String>>,
    calls: RefCell<Vec<RecordedCommand>>,
}

impl MockExecutor {
    /// Create a mock where every command succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a command line (`node -v`) or every use of a program (`npm`) fail.
    pub fn fail(&self, command: &str) {
        self.failing.borrow_mut().insert(command.to_string());
    }

    /// Make a previously failing command succeed.
    pub fn succeed(&self, command: &str) {
        self.failing.borrow_mut().remove(command);
    }

    /// All commands run so far, in order.
    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls.borrow().clone()
    }

    /// Whether a command line was run.
    pub fn was_called(&self, command: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.command == command)
    }

    /// Whether any command line starting with `prefix` was run.
    pub fn was_called_with_prefix(&self, prefix: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|c| c.command.starts_with(prefix))
    }
}

impl Executor for MockExecutor {
    fn execute(
        &self,
        dir: &Path,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        program: &str,
        args: &[&str],
    ) -> Result<()> {
        let line = command_line(program, args);
        self.calls.borrow_mut().push(RecordedCommand {
            dir: dir.to_path_buf(),
            command: line.clone(),
        });

        let failing = self.failing.borrow();
        if failing.contains(&line) || failing.contains(program) {
            Err(SupplyError::CommandFailed {
                command: line,
                code: Some(1),
            })
        } else {
            Ok(())
        }
    }
}
