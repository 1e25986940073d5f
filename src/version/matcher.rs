//! Version matching against a dependency catalog.
//!
//! [`resolve`] never fabricates a version: the result is always an element of
//! the catalog it was given.

use crate::error::{Result, SupplyError};
use crate::version::expression::{compare_versions, VersionExpression};
use std::cmp::Ordering;

/// Resolve a requested version expression against the available versions.
///
/// - Exact expressions resolve to themselves when present in `versions`.
/// - Floating expressions resolve to the greatest entry of their version line.
///
/// # Errors
///
/// Returns `NoMatchingVersion` (carrying the expression and the full catalog)
/// when nothing matches, and `InvalidVersion` when two matching entries cannot
/// be compared numerically.
pub fn resolve(expression: &str, versions: &[String]) -> Result<String> {
    let Some(parsed) = VersionExpression::parse(expression) else {
        return Err(SupplyError::no_match(expression, versions));
    };

    let found = match &parsed {
        VersionExpression::Exact(exact) => versions.iter().find(|v| *v == exact).cloned(),
        VersionExpression::Floating { .. } => latest_matching(&parsed, versions)?,
    };

    found.ok_or_else(|| SupplyError::no_match(parsed.raw(), versions))
}

/// Find the greatest catalog entry on a floating expression's version line.
fn latest_matching(expression: &VersionExpression, versions: &[String]) -> Result<Option<String>> {
    let mut best: Option<&String> = None;

    for candidate in versions.iter().filter(|v| expression.matches(v)) {
        best = match best {
            Some(current) if compare_versions(candidate, current)? != Ordering::Greater => {
                Some(current)
            }
            _ => Some(candidate),
        };
    }

    Ok(best.cloned())
}
