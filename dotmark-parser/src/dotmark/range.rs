//! Position tracking for source locations
//!
//! Events carry raw byte spans; the tree attaches resolved positions.
//! This module converts between the two:
//!
//! - [`Position`] - a line:col position (1-based) plus its byte offset
//! - [`Pos`] - a start/end position pair attached to tree nodes
//! - [`SourceLocation`] - byte-offset-to-position conversion for one input
//!
//! Conversion is O(log n) per lookup via binary search over line starts.
//! Spans are half-open byte ranges and always fall on UTF-8 character
//! boundaries, so slicing the input by any span is valid.

use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// A position in source text: 1-based line and column, 0-based byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub col: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, col: usize, offset: usize) -> Self {
        Self { line, col, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A resolved source span: start position and (exclusive) end position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pos {
    pub start: Position,
    pub end: Position,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Provides fast conversion from byte offsets to line/column positions
pub struct SourceLocation {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceLocation {
    /// Create a new SourceLocation from source text
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a position
    pub fn position(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);

        let col = offset - self.line_starts[line];

        Position::new(line + 1, col + 1, offset)
    }

    /// Convert a byte span to a start/end position pair
    pub fn span_to_pos(&self, span: ByteRange<usize>) -> Pos {
        Pos {
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }

    /// Get the total number of lines in the source
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the byte offset for the start of a 0-based line index
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_single_line() {
        let loc = SourceLocation::new("Hello");
        assert_eq!(loc.position(0), Position::new(1, 1, 0));
        assert_eq!(loc.position(4), Position::new(1, 5, 4));
    }

    #[test]
    fn test_position_multiline() {
        let loc = SourceLocation::new("Hello\nworld\ntest");

        assert_eq!(loc.position(0), Position::new(1, 1, 0));
        assert_eq!(loc.position(5), Position::new(1, 6, 5));
        assert_eq!(loc.position(6), Position::new(2, 1, 6));
        assert_eq!(loc.position(10), Position::new(2, 5, 10));
        assert_eq!(loc.position(12), Position::new(3, 1, 12));
    }

    #[test]
    fn test_position_past_end() {
        let loc = SourceLocation::new("ab");
        // One past the last byte is still addressable (exclusive span ends)
        assert_eq!(loc.position(2), Position::new(1, 3, 2));
    }

    #[test]
    fn test_position_with_unicode() {
        let loc = SourceLocation::new("Hello\nwörld");
        assert_eq!(loc.position(6), Position::new(2, 1, 6));
        // Columns are byte-based; ö takes two bytes
        assert_eq!(loc.position(8), Position::new(2, 3, 8));
    }

    #[test]
    fn test_span_to_pos() {
        let loc = SourceLocation::new("Hello\nWorld");
        let pos = loc.span_to_pos(6..11);

        assert_eq!(pos.start, Position::new(2, 1, 6));
        assert_eq!(pos.end, Position::new(2, 6, 11));
    }

    #[test]
    fn test_line_count() {
        assert_eq!(SourceLocation::new("single").line_count(), 1);
        assert_eq!(SourceLocation::new("line1\nline2").line_count(), 2);
    }

    #[test]
    fn test_line_start() {
        let loc = SourceLocation::new("Hello\nWorld");

        assert_eq!(loc.line_start(0), Some(0));
        assert_eq!(loc.line_start(1), Some(6));
        assert_eq!(loc.line_start(2), None);
    }

    #[test]
    fn test_position_display() {
        assert_eq!(format!("{}", Position::new(5, 10, 42)), "5:10");
    }
}
