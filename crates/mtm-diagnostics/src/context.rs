use mtm_source::{LineIndex, SourceLocation};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

static LINE_COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bline\s+(\d+)(?:\s*,?\s*col(?:umn)?\s+(\d+))?").expect("Invalid line/column regex pattern")
});
static COLON_PAIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+):(\d+)\b").expect("Invalid line:column regex pattern"));

/// Reads a `line L, column C` or `L:C` position out of an error message.
/// A missing column counts as column 1.
pub fn message_position(message: &str) -> Option<(usize, usize)> {
    let (line, column) = LINE_COLUMN
        .captures(message)
        .map(|caps| (caps.get(1), caps.get(2)))
        .or_else(|| COLON_PAIR.captures(message).map(|caps| (caps.get(1), caps.get(2))))?;
    let line = line?.as_str().parse::<usize>().ok()?;
    let column = column
        .and_then(|column| column.as_str().parse::<usize>().ok())
        .unwrap_or(1);
    Some((line, column))
}

/// Location named by an error message, with the byte index derived from
/// the source. Without a position the start of the file is returned.
pub fn extract_location(message: &str, index: &LineIndex<'_>) -> SourceLocation {
    match message_position(message) {
        Some((line, column)) => SourceLocation::new(line, column, index.index_of(line, column)),
        None => SourceLocation::START,
    }
}

/// Renders the lines around `line`, numbered, with the offending line
/// marked by `>`.
pub fn render_context(index: &LineIndex<'_>, line: usize, before: usize, after: usize) -> String {
    let first = line.saturating_sub(before).max(1);
    let last = (line + after).min(index.line_count());
    let mut rendered = String::new();

    for number in first..=last {
        let Some(text) = index.line_text(number) else {
            continue;
        };
        if !rendered.is_empty() {
            rendered.push('\n');
        }
        let marker = if number == line { '>' } else { ' ' };
        let _ = write!(rendered, "{} {:>3} | {}", marker, number, text);
    }
    rendered
}
