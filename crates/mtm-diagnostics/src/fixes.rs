//! Line-level quick fixes.
//!
//! A fix is only offered when its pattern matches the isolated text of the
//! offending line; the replacement always covers the whole line.

use crate::ModernSyntaxErrorType;
use mtm_source::{LineIndex, QuickFix};
use once_cell::sync::Lazy;
use regex::Regex;

struct Rewrite {
    description: &'static str,
    pattern: Lazy<Regex>,
    replacement: &'static str,
}

macro_rules! rewrite {
    ($description:expr, $re:expr, $replacement:expr) => {
        Rewrite {
            description: $description,
            pattern: Lazy::new(|| Regex::new($re).expect("Invalid quick fix regex pattern")),
            replacement: $replacement,
        }
    };
}

static DOLLAR_PREFIX: [Rewrite; 2] = [
    rewrite!(
        "Replace the declaration keyword with the dollar prefix",
        r"^(\s*)(?:let|const|var)\s+([A-Za-z_]\w*)",
        "${1}$$${2}"
    ),
    rewrite!(
        "Add the dollar prefix ($)",
        r"^(\s*)([A-Za-z_]\w*!?\s*(?::\s*\w+\s*)?=[^=>])",
        "${1}$$${2}"
    ),
];

static REACTIVE_SYNTAX: [Rewrite; 1] = [rewrite!(
    "Remove the space before '!'",
    r"(\$[A-Za-z_]\w*)\s+!",
    "${1}!"
)];

static TYPE_ANNOTATION: [Rewrite; 2] = [
    rewrite!(
        "Add ':' before the type",
        r"(\$[A-Za-z_]\w*!?)\s+(string|number|float|boolean|object|array|function|any)\b",
        "${1}: ${2}"
    ),
    rewrite!(
        "Use a supported type name",
        r"(\$[A-Za-z_]\w*!?\s*:\s*)(?:int|integer)\b",
        "${1}number"
    ),
];

static THIS_BINDING: [Rewrite; 1] = [rewrite!(
    "Convert to an arrow function",
    r"\bfunction\s*[A-Za-z_]?\w*\s*\(([^)]*)\)\s*\{",
    "(${1}) => {"
)];

static TEMPLATE_BINDING: [Rewrite; 2] = [
    rewrite!(
        "Add the dollar prefix to the interpolation",
        r"\{\{\s*([A-Za-z_]\w*)\s*\}\}",
        "{{$$${1}}}"
    ),
    rewrite!(
        "Quote the event handler",
        r#"\b([a-z]+)=(\$[A-Za-z_]\w*(?:\([^)]*\))?)"#,
        r#"${1}="${2}""#
    ),
];

static FUNCTION_SYNTAX: [Rewrite; 1] = [rewrite!(
    "Add '=>' between the parameters and the body",
    r"(\$[A-Za-z_]\w*\s*=\s*(?:async\s+)?\([^)]*\))\s*\{",
    "${1} => {"
)];

fn rewrites(kind: ModernSyntaxErrorType) -> &'static [Rewrite] {
    match kind {
        ModernSyntaxErrorType::InvalidDollarPrefix => &DOLLAR_PREFIX,
        ModernSyntaxErrorType::ReactiveSyntaxError => &REACTIVE_SYNTAX,
        ModernSyntaxErrorType::TypeAnnotationError => &TYPE_ANNOTATION,
        ModernSyntaxErrorType::ThisBindingError => &THIS_BINDING,
        ModernSyntaxErrorType::TemplateBindingError => &TEMPLATE_BINDING,
        ModernSyntaxErrorType::FunctionSyntaxError => &FUNCTION_SYNTAX,
        ModernSyntaxErrorType::AutoSemicolonAmbiguity => &[],
    }
}

/// Fixes for `line` given its category, at most two.
pub fn quick_fixes(kind: ModernSyntaxErrorType, index: &LineIndex<'_>, line: usize) -> Vec<QuickFix> {
    if kind == ModernSyntaxErrorType::AutoSemicolonAmbiguity {
        return semicolon_fixes(index, line);
    }
    let (Some(text), Some(range)) = (index.line_text(line), index.line_range(line)) else {
        return Vec::new();
    };

    let mut fixes: Vec<QuickFix> = Vec::new();
    for rewrite in rewrites(kind) {
        if kind == ModernSyntaxErrorType::FunctionSyntaxError && text.contains("=>") {
            continue;
        }
        let fixed = rewrite.pattern.replacen(text, 1, rewrite.replacement);
        if fixed != text && fixes.iter().all(|fix| fix.replacement != fixed) {
            fixes.push(QuickFix::new(rewrite.description, fixed.into_owned(), range));
        }
        if fixes.len() == 2 {
            break;
        }
    }
    fixes
}

/// End the previous statement explicitly, or start this line with `;`.
fn semicolon_fixes(index: &LineIndex<'_>, line: usize) -> Vec<QuickFix> {
    let mut fixes = Vec::new();
    let previous = (1..line)
        .rev()
        .find(|number| index.line_text(*number).map_or(false, |text| !text.trim().is_empty()));
    if let (Some(number), Some(range)) = (previous, previous.and_then(|number| index.line_range(number))) {
        if let Some(text) = index.line_text(number) {
            let trimmed = text.trim_end();
            if !trimmed.ends_with(';') {
                fixes.push(QuickFix::new(
                    "Add a semicolon at the end of the previous statement",
                    format!("{};", trimmed),
                    range,
                ));
            }
        }
    }
    if let (Some(text), Some(range)) = (index.line_text(line), index.line_range(line)) {
        let indent = text.len() - text.trim_start().len();
        if !text.trim().is_empty() && !text.trim_start().starts_with(';') {
            fixes.push(QuickFix::new(
                "Start the line with a semicolon",
                format!("{};{}", &text[..indent], &text[indent..]),
                range,
            ));
        }
    }
    fixes
}
