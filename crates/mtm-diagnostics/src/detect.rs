//! Detector predicates, one per error category.
//!
//! Each detector looks at the raw error message and at the offending
//! source line. They are tried in [`PRIORITY`] order and the first match
//! wins, so the more specific patterns come first.

use crate::ModernSyntaxErrorType;
use mtm_source::LineIndex;
use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).expect("Invalid detector regex pattern"));
    };
}

pattern!(TYPE_MESSAGE, r"(?i)type annotation|unknown type");
pattern!(MISSING_COLON, r"\$[A-Za-z_]\w*!?\s+(?:string|number|float|boolean|object|array|function|any)\b\s*=");
pattern!(REACTIVE_MESSAGE, r"(?i)reactive syntax|'!'");
pattern!(SPACED_BANG, r"\$[A-Za-z_]\w*\s+!\s*(?::|=)");
pattern!(ASI_MESSAGE, r"(?i)statement boundary|semicolon");
pattern!(CONTINUATION_START, r"^\s*[(\[`]");
pattern!(STATEMENT_END, r"[;{(\[,]\s*$");
pattern!(THIS_MESSAGE, r"(?i)'function' keyword|\bthis\b");
pattern!(FUNCTION_KEYWORD, r"\bfunction\b|\bthis\.");
pattern!(TEMPLATE_MESSAGE, r"(?i)template binding|interpolation");
pattern!(BARE_INTERPOLATION, r"\{\{\s*[A-Za-z_]\w*\s*\}\}");
pattern!(UNQUOTED_HANDLER, r"\b[a-z]+=\$[A-Za-z_]");
pattern!(FUNCTION_MESSAGE, r"(?i)function syntax|'=>'");
pattern!(MISSING_ARROW, r"\$[A-Za-z_]\w*\s*=\s*(?:async\s+)?\([^)]*\)\s*\{");
pattern!(DOLLAR_MESSAGE, r"(?i)dollar prefix");
pattern!(KEYWORD_DECLARATION, r"^\s*(?:let|const|var)\s+[A-Za-z_]");
pattern!(UNPREFIXED_DECLARATION, r"^\s*[A-Za-z_]\w*!?\s*(?::\s*\w+\s*)?=[^=>]");

/// The source lines a detector may inspect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceWindow<'a> {
    /// The offending line
    pub line: &'a str,
    /// Closest non-blank line above it
    pub previous: Option<&'a str>,
}

impl<'a> SourceWindow<'a> {
    pub fn at(index: &LineIndex<'a>, line: usize) -> Self {
        let previous = (1..line)
            .rev()
            .filter_map(|number| index.line_text(number))
            .find(|text| !text.trim().is_empty());
        Self {
            line: index.line_text(line).unwrap_or(""),
            previous,
        }
    }
}

pub type Detector = fn(&str, &SourceWindow<'_>) -> bool;

/// Detection order; earlier entries win.
pub const PRIORITY: [(ModernSyntaxErrorType, Detector); 7] = [
    (ModernSyntaxErrorType::TypeAnnotationError, is_type_annotation_error),
    (ModernSyntaxErrorType::ReactiveSyntaxError, is_reactive_syntax_error),
    (ModernSyntaxErrorType::AutoSemicolonAmbiguity, is_asi_ambiguity),
    (ModernSyntaxErrorType::ThisBindingError, is_this_binding_error),
    (ModernSyntaxErrorType::TemplateBindingError, is_template_binding_error),
    (ModernSyntaxErrorType::FunctionSyntaxError, is_function_syntax_error),
    (ModernSyntaxErrorType::InvalidDollarPrefix, is_dollar_prefix_error),
];

/// First category whose detector matches.
pub fn detect(message: &str, window: &SourceWindow<'_>) -> Option<ModernSyntaxErrorType> {
    PRIORITY
        .iter()
        .find(|(_, detector)| detector(message, window))
        .map(|(kind, _)| *kind)
}

pub fn is_type_annotation_error(message: &str, window: &SourceWindow<'_>) -> bool {
    TYPE_MESSAGE.is_match(message) || MISSING_COLON.is_match(window.line)
}

pub fn is_reactive_syntax_error(message: &str, window: &SourceWindow<'_>) -> bool {
    REACTIVE_MESSAGE.is_match(message) || SPACED_BANG.is_match(window.line)
}

pub fn is_asi_ambiguity(message: &str, window: &SourceWindow<'_>) -> bool {
    if ASI_MESSAGE.is_match(message) {
        return true;
    }
    CONTINUATION_START.is_match(window.line)
        && window
            .previous
            .map_or(false, |previous| !STATEMENT_END.is_match(previous))
}

pub fn is_this_binding_error(message: &str, window: &SourceWindow<'_>) -> bool {
    THIS_MESSAGE.is_match(message) || FUNCTION_KEYWORD.is_match(window.line)
}

pub fn is_template_binding_error(message: &str, window: &SourceWindow<'_>) -> bool {
    TEMPLATE_MESSAGE.is_match(message) || BARE_INTERPOLATION.is_match(window.line) || UNQUOTED_HANDLER.is_match(window.line)
}

pub fn is_function_syntax_error(message: &str, window: &SourceWindow<'_>) -> bool {
    FUNCTION_MESSAGE.is_match(message) || (MISSING_ARROW.is_match(window.line) && !window.line.contains("=>"))
}

pub fn is_dollar_prefix_error(message: &str, window: &SourceWindow<'_>) -> bool {
    DOLLAR_MESSAGE.is_match(message)
        || KEYWORD_DECLARATION.is_match(window.line)
        || UNPREFIXED_DECLARATION.is_match(window.line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ModernSyntaxErrorType::*;

    fn line(text: &str) -> SourceWindow<'_> {
        SourceWindow { line: text, previous: None }
    }

    #[test]
    fn test_detectors_match_source_shapes() {
        assert!(is_type_annotation_error("", &line("$count number = 0")));
        assert!(is_reactive_syntax_error("", &line("$count ! = 0")));
        assert!(is_this_binding_error("", &line("$save = function() {")));
        assert!(is_template_binding_error("", &line("<p>{{count}}</p>")));
        assert!(is_template_binding_error("", &line("<button click=$go()>")));
        assert!(is_function_syntax_error("", &line("$save = (item) {")));
        assert!(is_dollar_prefix_error("", &line("let count = 0")));
        assert!(is_dollar_prefix_error("", &line("count! = 0")));
    }

    #[test]
    fn test_detectors_ignore_valid_lines() {
        let valid = ["$count! = 0", "$label: string = \"x\"", "$save = (item) => {", "<p>{{$count}}</p>"];
        for text in valid {
            assert_eq!(detect("", &line(text)), None, "{}", text);
        }
    }

    #[test]
    fn test_asi_needs_an_open_previous_statement() {
        let open = SourceWindow { line: "[1, 2].forEach(log)", previous: Some("$total = $a + $b") };
        let closed = SourceWindow { line: "[1, 2].forEach(log)", previous: Some("$total = $a + $b;") };
        assert!(is_asi_ambiguity("", &open));
        assert!(!is_asi_ambiguity("", &closed));
    }

    #[test]
    fn test_type_annotation_wins_over_dollar_prefix() {
        let message = "Missing ':' before type annotation 'number' of '$count' (line 1, column 8)";
        assert_eq!(detect(message, &line("$count number = 0")), Some(TypeAnnotationError));
    }

    #[test]
    fn test_parser_messages_map_to_categories() {
        let cases = [
            ("Variable 'count' is missing the dollar prefix ($) (line 1, column 1)", InvalidDollarPrefix),
            ("Invalid reactive syntax: '!' must immediately follow '$count' (line 1, column 8)", ReactiveSyntaxError),
            ("Unknown type annotation 'integer' (line 1, column 9)", TypeAnnotationError),
            (
                "Ambiguous statement boundary: a line starting with '(' continues the previous statement under automatic semicolon insertion (line 2, column 1)",
                AutoSemicolonAmbiguity,
            ),
            (
                "'function' keyword is not supported, use an arrow function so 'this' is bound automatically (line 1, column 9)",
                ThisBindingError,
            ),
            ("Invalid template binding: unclosed '{{' (line 4, column 6)", TemplateBindingError),
            ("Invalid function syntax: missing '=>' in '$save' (line 1, column 15)", FunctionSyntaxError),
        ];
        for (message, expected) in cases {
            assert_eq!(detect(message, &SourceWindow::default()), Some(expected), "{}", message);
        }
    }
}
