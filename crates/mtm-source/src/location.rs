use miette::SourceSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a source file.
///
/// `line` and `column` are 1-based, `index` is the 0-based byte offset.
/// Locations are created once, wherever a node or error is produced, and
/// never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub index: usize,
}

impl SourceLocation {
    /// The first character of a file.
    pub const START: SourceLocation = SourceLocation { line: 1, column: 1, index: 0 };

    pub fn new(line: usize, column: usize, index: usize) -> Self {
        Self {
            line: line.max(1),
            column: column.max(1),
            index,
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A half-open span between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// An empty range sitting at `location`.
    pub fn point(location: SourceLocation) -> Self {
        Self { start: location, end: location }
    }

    pub fn len(&self) -> usize {
        self.end.index.saturating_sub(self.start.index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts to a miette span for labelled diagnostics.
    pub fn to_span(&self) -> SourceSpan {
        SourceSpan::new(self.start.index.into(), self.len())
    }
}

/// Precomputed line starts for a piece of source text.
///
/// Columns are counted in characters, indices in bytes.
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { source, line_starts }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Resolves a byte offset into a full location. Offsets past the end
    /// of the text are clamped to the end.
    pub fn location(&self, index: usize) -> SourceLocation {
        let index = self.clamp_to_boundary(index.min(self.source.len()));
        let line_idx = match self.line_starts.binary_search(&index) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        let line_start = self.line_starts[line_idx];
        let column = self.source[line_start..index].chars().count() + 1;
        SourceLocation::new(line_idx + 1, column, index)
    }

    /// Byte offset of a 1-based `(line, column)` pair.
    ///
    /// Mirrors the "sum the line lengths, one extra per newline, then add
    /// `column - 1`" rule; out-of-range positions are clamped to the end of
    /// the addressed line or of the text.
    pub fn index_of(&self, line: usize, column: usize) -> usize {
        let line = line.max(1);
        let Some(&start) = self.line_starts.get(line - 1) else {
            return self.source.len();
        };
        let text = self.line_text(line).unwrap_or("");
        let offset = text
            .char_indices()
            .nth(column.saturating_sub(1))
            .map(|(byte, _)| byte)
            .unwrap_or(text.len());
        start + offset
    }

    /// Location for a 1-based line/column pair, with its byte index filled in.
    pub fn location_at(&self, line: usize, column: usize) -> SourceLocation {
        self.location(self.index_of(line, column))
    }

    /// Text of a 1-based line, without its line terminator.
    pub fn line_text(&self, line: usize) -> Option<&'src str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        let text = &self.source[start..end];
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    /// Range covering the whole text of a line, from column 1 to one past
    /// its last character.
    pub fn line_range(&self, line: usize) -> Option<SourceRange> {
        let text = self.line_text(line)?;
        let start_index = self.line_starts[line - 1];
        let start = SourceLocation::new(line, 1, start_index);
        let end = SourceLocation::new(line, text.chars().count() + 1, start_index + text.len());
        Some(SourceRange::new(start, end))
    }

    /// Range between two byte offsets.
    pub fn range(&self, start: usize, end: usize) -> SourceRange {
        SourceRange::new(self.location(start), self.location(end.max(start)))
    }

    fn clamp_to_boundary(&self, mut index: usize) -> usize {
        while index > 0 && !self.source.is_char_boundary(index) {
            index -= 1;
        }
        index
    }
}
