//! Source location utilities for converting byte offsets to line/column positions
//!
//! logos reports byte spans; tokens carry 1-based lines and 0-based columns counted in
//! characters, which is what the segmentation look-ahead indexes the line text with.

use super::lexer_impl::Position;

/// Converts byte offsets to line/column positions.
///
/// Lookups are expected in roughly ascending order, as a lexer produces them. The last
/// resolved offset is remembered, so a later offset on the same line only counts the
/// characters in between.
pub struct SourceLocation<'a> {
    source: &'a str,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
    /// Last resolved (line index, byte offset, column)
    cursor: (usize, usize, usize),
}

impl<'a> SourceLocation<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];

        for (byte_pos, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }

        Self {
            source,
            line_starts,
            cursor: (0, 0, 0),
        }
    }

    /// Convert a byte offset to a line/column position
    pub fn byte_to_position(&mut self, byte_offset: usize) -> Position {
        let byte_offset = byte_offset.min(self.source.len());
        let index = self
            .line_starts
            .binary_search(&byte_offset)
            .unwrap_or_else(|i| i - 1);

        let (cursor_line, cursor_byte, cursor_column) = self.cursor;
        let (from, column) = if cursor_line == index && cursor_byte <= byte_offset {
            (cursor_byte, cursor_column)
        } else {
            (self.line_starts[index], 0)
        };

        let column = column
            + self
                .source
                .get(from..byte_offset)
                .map(|between| between.chars().count())
                .unwrap_or(byte_offset - from);

        self.cursor = (index, byte_offset, column);
        Position::new(index + 1, column)
    }
}
