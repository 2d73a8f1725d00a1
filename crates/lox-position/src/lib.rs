//! UTF-8/UTF-16 position conversion for Lox LSP wire positions.
//!
//! The scanner tracks positions as 0-based `(line, column)` pairs where
//! `column` counts Unicode scalar values (`char`s), matching how the
//! rest of the analyzer indexes source text. LSP positions are defined in
//! UTF-16 code units (LSP 3.17 §Position), so a document containing
//! characters outside the Basic Multilingual Plane needs a conversion at
//! the wire boundary. This crate is the only place that conversion
//! happens; everything else in the workspace works in scalar-value
//! columns.

/// Per-line UTF-16 offset cache for one document snapshot.
///
/// Built once per reparse and reused for every position conversion against
/// that snapshot, avoiding an O(n) rescan of the line per query.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    /// `lines[i]` holds the text of the i-th line (without its terminator).
    lines: Vec<String>,
}

impl LineIndex {
    /// Build an index over `text`.
    pub fn new(text: &str) -> Self {
        let lines = text.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect();
        LineIndex { lines }
    }

    /// Convert a scalar-value `(line, column)` position into a UTF-16
    /// `(line, utf16_column)` position. Out-of-range lines/columns clamp
    /// to the end of the document/line rather than panicking.
    pub fn to_utf16(&self, line: u32, column: u32) -> (u32, u32) {
        let Some(text) = self.lines.get(line as usize) else {
            return (line, column);
        };
        let mut utf16_col = 0u32;
        for (i, ch) in text.chars().enumerate() {
            if i as u32 >= column {
                break;
            }
            utf16_col += ch.len_utf16() as u32;
        }
        (line, utf16_col)
    }

    /// Convert a UTF-16 `(line, utf16_column)` position back into a
    /// scalar-value `(line, column)` position.
    pub fn from_utf16(&self, line: u32, utf16_column: u32) -> (u32, u32) {
        let Some(text) = self.lines.get(line as usize) else {
            return (line, utf16_column);
        };
        let mut seen_utf16 = 0u32;
        let mut col = 0u32;
        for ch in text.chars() {
            if seen_utf16 >= utf16_column {
                break;
            }
            seen_utf16 += ch.len_utf16() as u32;
            col += 1;
        }
        (line, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_round_trips_identically() {
        let idx = LineIndex::new("var x = 1;\nprint x;\n");
        assert_eq!(idx.to_utf16(1, 6), (1, 6));
        assert_eq!(idx.from_utf16(1, 6), (1, 6));
    }

    #[test]
    fn astral_character_widens_utf16_column() {
        // U+1F600 is outside the BMP: one scalar value, two UTF-16 units.
        let idx = LineIndex::new("var x = \"\u{1F600}\";");
        let (_, utf16_col) = idx.to_utf16(0, 10);
        assert_eq!(utf16_col, 11);
    }
}
