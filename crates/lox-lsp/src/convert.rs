//! Conversions between the query crates' internal types and `lsp_types`,
//! per distilled spec §4.5's request/response table.

use lox_completion::{CompletionItemKind as InternalKind, CompletionItem as InternalCompletionItem};
use lox_navigation::Span;
use lox_position::LineIndex;
use lsp_types::{CompletionItem, CompletionItemKind, Location, Position, Range, TextEdit, Uri};

/// Convert a scalar-value (char-count) span into an LSP `Range`, whose
/// `character` fields are UTF-16 code unit offsets (LSP 3.17 §Position).
/// `index` must be built from the same document snapshot `span` was
/// computed against.
pub fn span_to_range(index: &LineIndex, span: &Span) -> Range {
    let (start_line, start_col) = index.to_utf16(span.start_line, span.start_col);
    let (end_line, end_col) = index.to_utf16(span.end_line, span.end_col);
    Range { start: Position::new(start_line, start_col), end: Position::new(end_line, end_col) }
}

pub fn span_to_location(index: &LineIndex, uri: Uri, span: &Span) -> Location {
    Location { uri, range: span_to_range(index, span) }
}

/// Convert an LSP wire position (UTF-16 code units) into the scalar-value
/// `(line, column)` the analyzer's query algorithms index by.
pub fn position_from_wire(index: &LineIndex, line: u32, utf16_character: u32) -> (u32, u32) {
    index.from_utf16(line, utf16_character)
}

/// A `TextEdit` replacing the entire buffer `[(0,0)..eof]`, per distilled
/// spec §4.5's `textDocument/formatting` row.
pub fn whole_document_edit(index: &LineIndex, eof_line: u32, eof_col: u32, new_text: String) -> TextEdit {
    let (end_line, end_col) = index.to_utf16(eof_line, eof_col);
    TextEdit { range: Range { start: Position::new(0, 0), end: Position::new(end_line, end_col) }, new_text }
}

pub fn completion_item(item: &InternalCompletionItem) -> CompletionItem {
    let kind = match item.kind {
        InternalKind::Variable => CompletionItemKind::VARIABLE,
        InternalKind::Keyword => CompletionItemKind::KEYWORD,
        InternalKind::Snippet => CompletionItemKind::SNIPPET,
        InternalKind::Native => CompletionItemKind::FUNCTION,
    };
    CompletionItem {
        label: item.label.clone(),
        kind: Some(kind),
        insert_text: item.insert_text.clone(),
        ..Default::default()
    }
}
