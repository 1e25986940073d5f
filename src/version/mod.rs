//! Version expressions, catalog matching, and requested-version discovery.

pub mod expression;
pub mod matcher;
pub mod source;

pub use expression::{compare_versions, VersionExpression};
pub use matcher::resolve;
pub use source::{read_requested_version, VersionSource};
