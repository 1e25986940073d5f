//! Command-line interface for the supply phase.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`supply`] - Builds the collaborators and runs the [`Supplier`](crate::supply::Supplier)

pub mod args;
pub mod supply;

pub use args::Cli;
pub use supply::SupplyCommand;
