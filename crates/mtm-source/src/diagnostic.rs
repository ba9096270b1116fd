//! Diagnostic primitives shared by the type checker and the error categorizer.

use crate::SourceRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is.
///
/// Only `Error` blocks a strict compile; `Warning` and `Info` are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Severity> for miette::Severity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        }
    }
}

/// Confidence attached to inferred types and type hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        })
    }
}

/// A proposed literal text replacement.
///
/// `range` always denotes a span of the original source and `replacement`
/// is the complete new text for that span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuickFix {
    pub description: String,
    pub replacement: String,
    pub range: SourceRange,
}

impl QuickFix {
    pub fn new(description: impl Into<String>, replacement: impl Into<String>, range: SourceRange) -> Self {
        Self {
            description: description.into(),
            replacement: replacement.into(),
            range,
        }
    }

    /// Returns `source` with the fix applied, or `None` if the range does
    /// not fit the text.
    pub fn apply(&self, source: &str) -> Option<String> {
        let start = self.range.start.index;
        let end = self.range.end.index;
        if start > end || end > source.len() || !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return None;
        }
        let mut fixed = String::with_capacity(source.len() + self.replacement.len());
        fixed.push_str(&source[..start]);
        fixed.push_str(&self.replacement);
        fixed.push_str(&source[end..]);
        Some(fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineIndex;

    #[test]
    fn test_apply_replaces_exact_span() {
        let source = "count! = 0\n$x = 1";
        let index = LineIndex::new(source);
        let fix = QuickFix::new("Add dollar prefix", "$count! = 0", index.line_range(1).unwrap());
        assert_eq!(fix.apply(source).as_deref(), Some("$count! = 0\n$x = 1"));
    }

    #[test]
    fn test_apply_rejects_out_of_bounds_range() {
        let index = LineIndex::new("abc");
        let mut range = index.line_range(1).unwrap();
        range.end.index = 10;
        assert!(QuickFix::new("bad", "", range).apply("abc").is_none());
    }

    #[test]
    fn test_severity_maps_to_miette() {
        assert_eq!(miette::Severity::from(Severity::Info), miette::Severity::Advice);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
