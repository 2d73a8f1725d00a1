//! `textDocument/completion` query algorithm, per distilled spec §4.3.
//!
//! Completion walks the cached [`ScopeTable`](lox_symbols::ScopeTable)
//! outward from the cursor's innermost scope rather than re-parsing, and
//! then layers in a fixed keyword/snippet/native set that depends only on
//! the innermost scope's context tags.

use lox_parser::Analysis;
use lox_symbols::{ClassContext, FunctionContext, ScopeContext};

/// Classification of a completion suggestion, for client-side icon
/// selection and insertion behavior (a snippet carries placeholder text a
/// plain keyword or identifier does not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionItemKind {
    /// An in-scope `var`, parameter, function, or class name.
    Variable,
    /// A reserved word.
    Keyword,
    /// A multi-token template the client expands on insertion.
    Snippet,
    /// A built-in with no declaration site in the document.
    Native,
}

/// One completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// The label shown in the completion list.
    pub label: String,
    /// What kind of suggestion this is.
    pub kind: CompletionItemKind,
    /// Text to insert, if different from `label` (snippets only).
    pub insert_text: Option<String>,
}

impl CompletionItem {
    fn new(label: &str, kind: CompletionItemKind) -> Self {
        CompletionItem { label: label.to_string(), kind, insert_text: None }
    }

    fn snippet(label: &str, insert_text: &str) -> Self {
        CompletionItem { label: label.to_string(), kind: CompletionItemKind::Snippet, insert_text: Some(insert_text.to_string()) }
    }
}

const KEYWORDS: &[&str] = &["if", "true", "false", "nil", "else", "for", "while", "fun", "class", "var", "and", "or", "print"];

/// `textDocument/completion`: the suggestion list for a cursor at
/// `(line, col)`.
///
/// Returns an empty list if `(line, col)` falls outside every recorded
/// scope — the document service never calls this with a position outside
/// the buffer, but a stale cache from a since-shrunk document could still
/// produce one.
pub fn completion_at(analysis: &Analysis, line: u32, col: u32) -> Vec<CompletionItem> {
    let Some(innermost) = analysis.scope_table.innermost_containing(line, col) else {
        return Vec::new();
    };

    if innermost.range.scope_context == ScopeContext::Class {
        return class_body_items();
    }

    let mut items: Vec<CompletionItem> = analysis
        .scope_table
        .enclosing_chain(line, col)
        .into_iter()
        .flat_map(|entry| entry.definitions.iter())
        .map(|&token| CompletionItem::new(&analysis.tokens[token as usize].text, CompletionItemKind::Variable))
        .collect();

    items.extend(KEYWORDS.iter().map(|kw| CompletionItem::new(kw, CompletionItemKind::Keyword)));
    items.push(CompletionItem::snippet("fun", "fun name() {}"));
    items.push(CompletionItem::snippet("class", "class Name {init(){ }}"));
    items.push(CompletionItem::snippet("for", "for (var i = 0; i < ; i = i + 1) { }"));
    items.push(CompletionItem::new("clock", CompletionItemKind::Native));

    if innermost.range.function_context != FunctionContext::Global {
        items.push(CompletionItem::new("return", CompletionItemKind::Keyword));
    }
    if innermost.range.class_context == ClassContext::Class {
        items.push(CompletionItem::new("this", CompletionItemKind::Keyword));
        items.push(CompletionItem::snippet("super.", "super."));
    }

    items
}

/// The completion set offered directly inside a class body, where only
/// method declarations are legal — not the expression keyword/snippet set.
fn class_body_items() -> Vec<CompletionItem> {
    vec![CompletionItem::snippet("method", "name() {\n  \n}")]
}
