//! Subprocess execution.

pub mod command;
pub mod mock;

pub use command::{command_line, Executor, SystemExecutor};
pub use mock::{MockExecutor, RecordedCommand};
