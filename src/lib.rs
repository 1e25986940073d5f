//! Supply phase of the .NET Core buildpack.
//!
//! Resolves which .NET SDK an application needs and stages it, together
//! with the Node.js and Bower tooling that source builds may call during
//! `dotnet publish`.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Supply phase settings
//! - [`error`] - Error types and result aliases
//! - [`installer`] - Dependency download, verification and unpacking
//! - [`manifest`] - The buildpack's dependency catalog
//! - [`project`] - Application classification
//! - [`shell`] - Subprocess execution
//! - [`stager`] - Dep dir layout and environment files
//! - [`supply`] - Install decisions for the SDK, Node.js and Bower
//! - [`version`] - Version expressions, matching and version files
//!
//! # Example
//!
//! ```
//! use dotnet_supply::version::resolve;
//!
//! let catalog = vec!["6.7.7".to_string(), "6.7.8".to_string(), "6.9.0".to_string()];
//! assert_eq!(resolve("6.7.x", &catalog).unwrap(), "6.7.8");
//! ```
//!
//! For full supply runs against mock collaborators, see the integration tests.

pub mod cli;
pub mod config;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod project;
pub mod shell;
pub mod stager;
pub mod supply;
pub mod version;

pub use error::{Result, SupplyError};
