use crate::categorizer::CategorizedError;
use crate::context::message_position;
use miette::Diagnostic;
use serde::Serialize;
use std::error::Error;
use std::fmt::{self, Write};
use thiserror::Error;

/// Coarse origin of a compilation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilationErrorKind {
    Syntax,
    Frontmatter,
    Framework,
    Runtime,
}

impl CompilationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilationErrorKind::Syntax => "syntax",
            CompilationErrorKind::Frontmatter => "frontmatter",
            CompilationErrorKind::Framework => "framework",
            CompilationErrorKind::Runtime => "runtime",
        }
    }

    /// Suggestion used when nothing more specific is known.
    pub(crate) fn default_suggestion(&self) -> &'static str {
        match self {
            CompilationErrorKind::Syntax => "Check the component syntax near the reported location",
            CompilationErrorKind::Frontmatter => {
                "Frontmatter must be YAML between two '---' lines, e.g. 'target: reactjs'"
            }
            CompilationErrorKind::Framework => "Use one of the supported targets: reactjs, vue, svelte, solid",
            CompilationErrorKind::Runtime => "Check the generated code and the runtime module it imports",
        }
    }

    /// Suggestions for failures the modern-syntax categories do not cover.
    pub fn suggestions(&self) -> Vec<String> {
        let mut suggestions = vec![self.default_suggestion().to_string()];
        match self {
            CompilationErrorKind::Frontmatter => {
                suggestions.push("List channels as '- event: <name>' entries, each with an 'emit: <handler>'".to_string());
                suggestions.push("Set 'syntax' to 'legacy' or 'modern' if present".to_string());
            }
            CompilationErrorKind::Framework => {
                suggestions.push("Remove 'target' to use 'default_target' from mtm.toml".to_string());
            }
            CompilationErrorKind::Syntax | CompilationErrorKind::Runtime => {}
        }
        suggestions
    }
}

impl fmt::Display for CompilationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure that stops one component from compiling.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct CompilationError {
    pub kind: CompilationErrorKind,
    pub message: String,
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub suggestions: Vec<String>,
    /// Rendered text of the error this one was created from
    pub original_error: Option<String>,
    /// Rendered source excerpt
    pub context: Option<String>,
}

impl CompilationError {
    pub fn new(kind: CompilationErrorKind, message: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: file.into(),
            line: None,
            column: None,
            suggestions: Vec::new(),
            original_error: None,
            context: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Wraps an arbitrary error, recovering a position from its message.
    pub fn from_error(error: &dyn Error, kind: CompilationErrorKind, file: impl Into<String>) -> Self {
        let message = error.to_string();
        let mut wrapped = Self::new(kind, message.clone(), file);
        if let Some((line, column)) = message_position(&message) {
            wrapped = wrapped.at(line, column);
        }
        wrapped.original_error = Some(message);
        wrapped
    }

    pub fn from_categorized(categorized: &CategorizedError, kind: CompilationErrorKind) -> Self {
        Self {
            kind,
            message: categorized.message.clone(),
            file: categorized.file.clone(),
            line: Some(categorized.location.line),
            column: Some(categorized.location.column),
            suggestions: categorized.suggestions.clone(),
            original_error: None,
            context: (!categorized.context.is_empty()).then(|| categorized.context.clone()),
        }
    }
}

impl Diagnostic for CompilationError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("mtm::{}", self.kind)))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        (!self.suggestions.is_empty()).then(|| Box::new(self.suggestions.join("\n")) as Box<dyn fmt::Display>)
    }
}

/// Multi-line report of a compilation error.
///
/// ```text
/// 🚨 SYNTAX ERROR in Counter.mtm
/// 📍 Line 2, Column 8
/// 💬 Invalid reactive syntax: ...
///
/// 💡 Suggestions:
///    1. ...
/// ```
pub fn format_error_message(error: &CompilationError) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🚨 {} ERROR in {}", error.kind.as_str().to_uppercase(), error.file);
    match (error.line, error.column) {
        (Some(line), Some(column)) => {
            let _ = writeln!(out, "📍 Line {}, Column {}", line, column);
        }
        (Some(line), None) => {
            let _ = writeln!(out, "📍 Line {}", line);
        }
        _ => {}
    }
    let _ = writeln!(out, "💬 {}", error.message);

    if let Some(context) = &error.context {
        let _ = write!(out, "\n📝 Context:\n{}\n", context);
    }
    if let Some(original) = &error.original_error {
        let _ = write!(out, "\n🔍 Original error: {}\n", original);
    }
    if !error.suggestions.is_empty() {
        out.push_str("\n💡 Suggestions:\n");
        for (idx, suggestion) in error.suggestions.iter().enumerate() {
            let _ = writeln!(out, "   {}. {}", idx + 1, suggestion);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    #[test]
    fn test_format_full_report() {
        let error = CompilationError::new(
            CompilationErrorKind::Syntax,
            "Invalid reactive syntax: '!' must immediately follow '$count'",
            "src/Counter.mtm",
        )
        .at(1, 8)
        .with_context(">   1 | $count ! = 0")
        .with_suggestions(vec![
            "The exclamation mark (!) must immediately follow the variable name: '$count! = 0'".into(),
            "No space is permitted between the variable name and '!'".into(),
        ]);

        expect![[r#"
            🚨 SYNTAX ERROR in src/Counter.mtm
            📍 Line 1, Column 8
            💬 Invalid reactive syntax: '!' must immediately follow '$count'

            📝 Context:
            >   1 | $count ! = 0

            💡 Suggestions:
               1. The exclamation mark (!) must immediately follow the variable name: '$count! = 0'
               2. No space is permitted between the variable name and '!'
        "#]]
        .assert_eq(&format_error_message(&error));
    }

    #[test]
    fn test_format_minimal_report() {
        let error = CompilationError::new(CompilationErrorKind::Framework, "Unsupported target", "A.mtm");
        assert_eq!(format_error_message(&error), "🚨 FRAMEWORK ERROR in A.mtm\n💬 Unsupported target\n");
    }

    #[test]
    fn test_from_error_recovers_position() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "bad token at line 4, column 2");
        let error = CompilationError::from_error(&io, CompilationErrorKind::Syntax, "A.mtm");
        assert_eq!((error.line, error.column), (Some(4), Some(2)));
        assert_eq!(error.original_error.as_deref(), Some("bad token at line 4, column 2"));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let error = CompilationError::from_error(&io, CompilationErrorKind::Runtime, "A.mtm");
        assert_eq!(error.line, None);
    }
}
