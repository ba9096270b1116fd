use mtm_source::Severity;
use serde::Serialize;
use std::fmt;

/// The closed set of modern-syntax error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModernSyntaxErrorType {
    InvalidDollarPrefix,
    ReactiveSyntaxError,
    TypeAnnotationError,
    AutoSemicolonAmbiguity,
    ThisBindingError,
    TemplateBindingError,
    FunctionSyntaxError,
}

impl ModernSyntaxErrorType {
    pub const ALL: [ModernSyntaxErrorType; 7] = [
        ModernSyntaxErrorType::InvalidDollarPrefix,
        ModernSyntaxErrorType::ReactiveSyntaxError,
        ModernSyntaxErrorType::TypeAnnotationError,
        ModernSyntaxErrorType::AutoSemicolonAmbiguity,
        ModernSyntaxErrorType::ThisBindingError,
        ModernSyntaxErrorType::TemplateBindingError,
        ModernSyntaxErrorType::FunctionSyntaxError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModernSyntaxErrorType::InvalidDollarPrefix => "invalid_dollar_prefix",
            ModernSyntaxErrorType::ReactiveSyntaxError => "reactive_syntax_error",
            ModernSyntaxErrorType::TypeAnnotationError => "type_annotation_error",
            ModernSyntaxErrorType::AutoSemicolonAmbiguity => "auto_semicolon_ambiguity",
            ModernSyntaxErrorType::ThisBindingError => "this_binding_error",
            ModernSyntaxErrorType::TemplateBindingError => "template_binding_error",
            ModernSyntaxErrorType::FunctionSyntaxError => "function_syntax_error",
        }
    }

    /// Statement-boundary ambiguities are warnings, everything else is an error.
    pub fn severity(&self) -> Severity {
        match self {
            ModernSyntaxErrorType::AutoSemicolonAmbiguity => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ModernSyntaxErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
