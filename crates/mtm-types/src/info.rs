use mtm_source::{Confidence, QuickFix, Severity, SourceLocation};
use mtm_syntax::TypeInfo;
use serde::Serialize;
use std::fmt;

/// Category of a type diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeErrorKind {
    TypeConflict,
    MissingTypeAnnotation,
    InferenceFailure,
    InvalidReactiveType,
}

impl TypeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeErrorKind::TypeConflict => "TYPE_CONFLICT",
            TypeErrorKind::MissingTypeAnnotation => "MISSING_TYPE_ANNOTATION",
            TypeErrorKind::InferenceFailure => "INFERENCE_FAILURE",
            TypeErrorKind::InvalidReactiveType => "INVALID_REACTIVE_TYPE",
        }
    }
}

impl fmt::Display for TypeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal type diagnostic.
///
/// Only diagnostics with `Severity::Error` block a strict compile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeErrorInfo {
    pub kind: TypeErrorKind,
    pub message: String,
    /// Variable the diagnostic is about; `None` for program-wide checks
    pub variable_name: Option<String>,
    pub location: SourceLocation,
    pub severity: Severity,
    pub declared: Option<TypeInfo>,
    pub inferred: Option<TypeInfo>,
    pub suggestions: Vec<String>,
    pub quick_fixes: Vec<QuickFix>,
}

impl TypeErrorInfo {
    pub(crate) fn new(kind: TypeErrorKind, severity: Severity, message: String, location: SourceLocation) -> Self {
        Self {
            kind,
            message,
            variable_name: None,
            location,
            severity,
            declared: None,
            inferred: None,
            suggestions: Vec::new(),
            quick_fixes: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for TypeErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {} ({})", self.severity, self.kind, self.message, self.location)
    }
}

/// What to do when a variable's type could not be inferred.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeErrorRecovery {
    pub fallback_type: TypeInfo,
    pub requires_explicit_type: bool,
    pub confidence: Confidence,
    pub suggestions: Vec<String>,
}

/// The ambiguous value shapes a hint can point out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintPattern {
    /// Integral literal where the name suggests fractional values
    AmbiguousNumber,
    EmptyCollection,
    NullValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeHint {
    pub variable_name: String,
    pub pattern: HintPattern,
    pub message: String,
    /// Annotation text to write, e.g. `float` or `Array<T>`
    pub suggested_type: String,
    pub confidence: Confidence,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    UseExplicit,
    RequireClarification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConflictResolution {
    pub resolution: Resolution,
    /// Set when the conflict resolves on its own
    pub resolved_type: Option<TypeInfo>,
    pub explanation: String,
    pub suggestions: Vec<String>,
}

/// Input row for the cross-variable consistency check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedVariable<'a> {
    pub name: &'a str,
    pub type_info: TypeInfo,
    pub location: SourceLocation,
}
