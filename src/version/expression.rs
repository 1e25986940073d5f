//! Version expressions and numeric version ordering.
//!
//! A requested version is either an exact version (`6.7.8`) or a floating
//! version line whose trailing segments are wildcards (`6.7.x`, `6.x.x`,
//! `6.x`). Versions are compared segment by segment as integers, never
//! lexicographically.

use crate::error::{Result, SupplyError};
use std::cmp::Ordering;
use std::fmt;

/// Segment values accepted as wildcards.
const WILDCARDS: &[&str] = &["x", "X", "*"];

/// Returns true if a single dot-separated segment is a wildcard.
pub fn is_wildcard(segment: &str) -> bool {
    WILDCARDS.contains(&segment)
}

/// A parsed version expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionExpression {
    /// Matches only a catalog entry with the identical text.
    Exact(String),

    /// Matches the greatest catalog entry sharing `prefix`.
    Floating {
        /// The expression as written.
        raw: String,
        /// Leading segments that must match exactly.
        prefix: Vec<String>,
    },
}

impl VersionExpression {
    /// Parse an expression, returning `None` when it is absent (empty).
    ///
    /// Wildcards only float when every segment after the first wildcard is
    /// also a wildcard; `6.x.7` is kept as an exact string and therefore never
    /// matches a numeric catalog entry.
    pub fn parse(expression: &str) -> Option<Self> {
        let raw = expression.trim();
        if raw.is_empty() {
            return None;
        }

        let segments: Vec<&str> = raw.split('.').collect();
        let Some(first_wildcard) = segments.iter().position(|s| is_wildcard(s)) else {
            return Some(VersionExpression::Exact(raw.to_string()));
        };

        if !segments[first_wildcard..].iter().all(|s| is_wildcard(s)) {
            return Some(VersionExpression::Exact(raw.to_string()));
        }

        Some(VersionExpression::Floating {
            raw: raw.to_string(),
            prefix: segments[..first_wildcard]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        })
    }

    /// The expression as written.
    pub fn raw(&self) -> &str {
        match self {
            VersionExpression::Exact(raw) => raw,
            VersionExpression::Floating { raw, .. } => raw,
        }
    }

    /// Whether this expression selects a version line rather than a version.
    pub fn is_floating(&self) -> bool {
        matches!(self, VersionExpression::Floating { .. })
    }

    /// The patch-level version line of an exact version: `1.2.3` → `1.2.x`.
    ///
    /// Returns `None` for floating expressions and for versions with fewer
    /// than two segments.
    pub fn version_line(&self) -> Option<String> {
        let VersionExpression::Exact(raw) = self else {
            return None;
        };

        let mut segments = raw.split('.');
        let major = segments.next()?;
        let minor = segments.next()?;
        Some(format!("{}.{}.x", major, minor))
    }

    /// Whether a catalog entry belongs to this expression's version line.
    ///
    /// Exact expressions match by string equality only.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            VersionExpression::Exact(raw) => raw == candidate,
            VersionExpression::Floating { prefix, .. } => {
                let segments: Vec<&str> = candidate.split('.').collect();
                segments.len() > prefix.len()
                    && prefix.iter().zip(&segments).all(|(p, s)| p == s)
            }
        }
    }
}

impl fmt::Display for VersionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}

fn numeric_segments(version: &str) -> Result<Vec<u64>> {
    version
        .split('.')
        .map(|segment| {
            segment.parse::<u64>().map_err(|_| SupplyError::InvalidVersion {
                version: version.to_string(),
            })
        })
        .collect()
}

/// Compare two versions component-wise as integers.
///
/// Missing trailing segments count as zero, so `6.7` and `6.7.0` are equal.
///
/// # Errors
///
/// Returns `InvalidVersion` if either version has a non-numeric segment.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    let left = numeric_segments(a)?;
    let right = numeric_segments(b)?;

    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }

    Ok(Ordering::Equal)
}
