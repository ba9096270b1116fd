use crate::context::{extract_location, render_context};
use crate::detect::{detect, SourceWindow};
use crate::fixes::quick_fixes;
use crate::ModernSyntaxErrorType;
use mtm_source::{DiagnosticsSection, LineIndex, QuickFix, Severity, SourceLocation};
use mtm_syntax::{BaseType, SyntaxVersion};
use serde::Serialize;
use std::error::Error;

/// Where an error came from.
#[derive(Debug, Clone, Copy)]
pub struct ErrorContext<'a> {
    pub source: &'a str,
    pub file_path: &'a str,
    pub syntax_version: SyntaxVersion,
}

/// A raw error mapped onto a modern-syntax category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedError {
    pub kind: ModernSyntaxErrorType,
    pub message: String,
    pub file: String,
    pub location: SourceLocation,
    /// Rendered source excerpt around `location`
    pub context: String,
    pub suggestions: Vec<String>,
    pub quick_fixes: Vec<QuickFix>,
    pub severity: Severity,
    /// No detector matched and `kind` is the default category
    pub is_fallback: bool,
}

/// Maps parse and compile failures onto [`ModernSyntaxErrorType`]s.
#[derive(Debug, Clone, Default)]
pub struct ErrorCategorizer {
    settings: DiagnosticsSection,
}

impl ErrorCategorizer {
    pub fn new(settings: DiagnosticsSection) -> Self {
        Self { settings }
    }

    pub fn categorize_error(&self, error: &dyn Error, context: &ErrorContext<'_>) -> CategorizedError {
        self.categorize_message(&error.to_string(), context)
    }

    /// Categorizes an error from its rendered message alone.
    ///
    /// Legacy sources are only classified by message; their text is not
    /// modern syntax, so it is neither scanned nor rewritten.
    pub fn categorize_message(&self, message: &str, context: &ErrorContext<'_>) -> CategorizedError {
        let index = LineIndex::new(context.source);
        let location = extract_location(message, &index);
        let modern = context.syntax_version == SyntaxVersion::Modern;

        let window = if modern {
            SourceWindow::at(&index, location.line)
        } else {
            SourceWindow::default()
        };
        let detected = detect(message, &window);
        let kind = detected.unwrap_or(ModernSyntaxErrorType::InvalidDollarPrefix);
        log::debug!(
            "Categorized error at {} in {} as {}{}",
            location,
            context.file_path,
            kind,
            if detected.is_none() { " (fallback)" } else { "" }
        );

        let lines = if kind == ModernSyntaxErrorType::AutoSemicolonAmbiguity {
            (self.settings.asi_lines, self.settings.asi_lines)
        } else {
            (self.settings.lines_before, self.settings.lines_after)
        };

        CategorizedError {
            kind,
            message: message.to_string(),
            file: context.file_path.to_string(),
            location,
            context: render_context(&index, location.line, lines.0, lines.1),
            suggestions: match detected {
                Some(kind) => suggestions(kind),
                None => generic_suggestions(),
            },
            quick_fixes: if modern { quick_fixes(kind, &index, location.line) } else { Vec::new() },
            severity: kind.severity(),
            is_fallback: detected.is_none(),
        }
    }
}

/// The fixed suggestion list of a category.
pub fn suggestions(kind: ModernSyntaxErrorType) -> Vec<String> {
    match kind {
        ModernSyntaxErrorType::InvalidDollarPrefix => vec![
            "Dollar prefix ($) should be used only for variable and function declarations, e.g. '$count = 0'".into(),
            "The name after '$' must be a valid identifier: letters, digits and '_', not starting with a digit".into(),
            "Check the declaration pattern: '$name = value' or '$name: type = value'".into(),
            "Reactive variables add '!' after the name: '$name! = value'".into(),
        ],
        ModernSyntaxErrorType::ReactiveSyntaxError => vec![
            "The exclamation mark (!) must immediately follow the variable name: '$count! = 0'".into(),
            "No space is permitted between the variable name and '!'".into(),
        ],
        ModernSyntaxErrorType::TypeAnnotationError => vec![
            "Type annotations follow the pattern '$name: type = value'".into(),
            format!("Supported base types: {}", BaseType::supported_list()),
            "Type annotations are optional; without one the type is inferred from the value".into(),
        ],
        ModernSyntaxErrorType::AutoSemicolonAmbiguity => vec![
            "Add an explicit semicolon (;) at the end of the previous statement".into(),
            "Keep a continued expression on the same line as the statement it belongs to".into(),
            "Wrap the expression in parentheses to make the statement boundary explicit".into(),
        ],
        ModernSyntaxErrorType::ThisBindingError => vec![
            "Arrow functions bind 'this' automatically".into(),
            "Convert 'function' expressions to arrow form: '$name = (params) => { ... }'".into(),
        ],
        ModernSyntaxErrorType::TemplateBindingError => vec![
            "Use double-brace interpolation with the dollar prefix: '{{$variable}}'".into(),
            "Quote event handler attributes: click=\"$handler()\"".into(),
        ],
        ModernSyntaxErrorType::FunctionSyntaxError => vec![
            "Functions must be declared as '$name = (params) => { ... }'".into(),
            "Async functions are declared as '$name = async (params) => { ... }'".into(),
        ],
    }
}

fn generic_suggestions() -> Vec<String> {
    vec![
        "Check that declarations use the modern syntax: '$name = value'".into(),
        "Reactive variables are written '$name! = value' and functions '$name = (params) => { ... }'".into(),
        "Template interpolation uses '{{$name}}'".into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtm_syntax::parse;

    fn categorize(source: &str) -> CategorizedError {
        let error = parse(source).unwrap_err();
        let context = ErrorContext {
            source,
            file_path: "Counter.mtm",
            syntax_version: SyntaxVersion::Modern,
        };
        ErrorCategorizer::default().categorize_error(&error, &context)
    }

    #[test]
    fn test_categorizes_parser_errors() {
        let cases = [
            ("$count! = 0\ncount2 = 1\n", ModernSyntaxErrorType::InvalidDollarPrefix),
            ("$count ! = 0\n", ModernSyntaxErrorType::ReactiveSyntaxError),
            ("$count number = 0\n", ModernSyntaxErrorType::TypeAnnotationError),
            ("$save = function() { run() }\n", ModernSyntaxErrorType::ThisBindingError),
            ("$save = (item) { run(item) }\n", ModernSyntaxErrorType::FunctionSyntaxError),
            ("$a = 1\n<template><p>{{count}}</p></template>\n", ModernSyntaxErrorType::TemplateBindingError),
        ];
        for (source, expected) in cases {
            let categorized = categorize(source);
            assert_eq!(categorized.kind, expected, "{}", categorized.message);
            assert!(!categorized.is_fallback);
            assert_eq!(categorized.severity, Severity::Error);
        }
    }

    #[test]
    fn test_asi_is_a_warning_with_wider_context() {
        let source = "$a = 1\n$b = 2\n$c = 3\n$total = $a + $b\n[1, 2].forEach(log)\n$d = 4\n$e = 5\n$f = 6\n";
        let categorized = categorize(source);
        assert_eq!(categorized.kind, ModernSyntaxErrorType::AutoSemicolonAmbiguity);
        assert_eq!(categorized.severity, Severity::Warning);
        assert_eq!(categorized.location.line, 5);
        assert_eq!(categorized.context.lines().count(), 7);
        assert_eq!(categorized.quick_fixes.len(), 2);
    }

    #[test]
    fn test_categorization_is_deterministic() {
        let source = "$count ! = 0\n";
        assert_eq!(categorize(source), categorize(source));
    }

    #[test]
    fn test_unmatched_error_falls_back() {
        let context = ErrorContext {
            source: "$a = 1\n",
            file_path: "A.mtm",
            syntax_version: SyntaxVersion::Modern,
        };
        let categorized = ErrorCategorizer::default().categorize_message("something odd happened", &context);
        assert!(categorized.is_fallback);
        assert_eq!(categorized.kind, ModernSyntaxErrorType::InvalidDollarPrefix);
        assert_eq!(categorized.location, SourceLocation::START);
        assert!(!categorized.suggestions.is_empty());
    }

    #[test]
    fn test_every_category_has_suggestions() {
        for kind in ModernSyntaxErrorType::ALL {
            assert!(!suggestions(kind).is_empty(), "{}", kind);
        }
    }
}
