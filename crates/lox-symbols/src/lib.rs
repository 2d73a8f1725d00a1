//! Scope graph and symbol table types for the Lox resolver.
//!
//! These types are the product of the fused parser/resolver (distilled
//! spec §4.2) and the input every query service (`lox-navigation`,
//! `lox-completion`) reads. They carry no behavior beyond simple lookups:
//! all the interesting logic of *building* them lives in `lox-parser`.

use lox_ast::TokenId;
use rustc_hash::FxHashMap;

/// The token at which a name is introduced: a var, parameter, function,
/// class, or method identifier.
pub type Definition = TokenId;

/// Classification of a defined name, for mapping into an LSP
/// `SymbolKind` in completion items and (future) document symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// `var name`.
    Variable,
    /// A function parameter.
    Parameter,
    /// `fun name(...)`.
    Function,
    /// `class Name`.
    Class,
    /// A method defined inside a class body.
    Method,
}

impl SymbolKind {
    /// LSP `SymbolKind` numeric code (LSP 3.17 §SymbolKind).
    pub const fn to_lsp_kind(self) -> u8 {
        match self {
            SymbolKind::Variable => 13,
            SymbolKind::Parameter => 13,
            SymbolKind::Function => 12,
            SymbolKind::Class => 5,
            SymbolKind::Method => 6,
        }
    }
}

/// The syntactic kind of a lexical scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeContext {
    /// The top-level program scope. Exactly one exists per document.
    Global,
    /// A bare `{ ... }` block.
    Block,
    /// An `if`/`else` branch body.
    If,
    /// A `while` loop body.
    While,
    /// A `for` loop header-and-body scope.
    For,
    /// A `fun` body.
    Function,
    /// A method body inside a class.
    Method,
    /// A class body (the method-name namespace, not a method's own body).
    Class,
}

/// The nearest enclosing callable, which determines whether `return` is
/// legal at a given point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionContext {
    /// Not inside any function or method.
    Global,
    /// Inside a `fun` body.
    Function,
    /// Inside a method body.
    Method,
}

/// Whether `this`/`super` are legal at a given point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassContext {
    /// Not inside a class body.
    Global,
    /// Inside a class body (including its methods).
    Class,
}

/// A rectangle in the buffer describing one lexical scope, plus the three
/// context tags that determine what constructs are legal inside it.
///
/// Ranges form a tree by containment: for any two ranges, one contains
/// the other or they are disjoint. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRange {
    /// 0-based start line (inclusive).
    pub start_line: u32,
    /// 0-based start column (inclusive).
    pub start_col: u32,
    /// 0-based end line (inclusive).
    pub end_line: u32,
    /// 0-based end column (inclusive).
    pub end_col: u32,
    /// The syntactic kind of this scope.
    pub scope_context: ScopeContext,
    /// The nearest enclosing callable.
    pub function_context: FunctionContext,
    /// Whether `this`/`super` are legal.
    pub class_context: ClassContext,
}

impl ScopeRange {
    /// Whether `(line, col)` falls within this rectangle, inclusive of
    /// both endpoints (scope ranges are closed rectangles, not half-open
    /// ranges, since they are measured from opening to closing
    /// brace/paren rather than from a token's start to its end).
    pub fn contains(&self, line: u32, col: u32) -> bool {
        if line < self.start_line || line > self.end_line {
            return false;
        }
        if line == self.start_line && col < self.start_col {
            return false;
        }
        if line == self.end_line && col > self.end_col {
            return false;
        }
        true
    }

    /// Whether `other` is fully contained within `self` (used to sort
    /// scopes from innermost to outermost when walking a position).
    pub fn strictly_contains(&self, other: &ScopeRange) -> bool {
        self != other && self.contains(other.start_line, other.start_col) && self.contains(other.end_line, other.end_col)
    }
}

/// Definition token → ordered list of reference tokens resolved to it.
/// Values never include the defining token itself.
#[derive(Debug, Clone, Default)]
pub struct SymbolMap {
    entries: FxHashMap<Definition, Vec<TokenId>>,
    /// Preserves insertion order of keys, since `FxHashMap` does not, and
    /// the document service needs a deterministic iteration order for
    /// e.g. the "unused definition" warning pass.
    order: Vec<Definition>,
}

impl SymbolMap {
    /// An empty map.
    pub fn new() -> Self {
        SymbolMap::default()
    }

    /// Register a new definition with no references yet. A no-op if the
    /// key already exists (callers that redeclare should treat the new
    /// token as a distinct key — it is a different `TokenId`).
    pub fn declare(&mut self, definition: Definition) {
        if !self.entries.contains_key(&definition) {
            self.entries.insert(definition, Vec::new());
            self.order.push(definition);
        }
    }

    /// Append a resolved reference to `definition`'s list.
    pub fn add_reference(&mut self, definition: Definition, reference: TokenId) {
        self.entries.entry(definition).or_insert_with(Vec::new).push(reference);
    }

    /// References resolved to `definition`, in source order.
    pub fn references(&self, definition: Definition) -> &[TokenId] {
        self.entries.get(&definition).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `token` is a key in this map (i.e. is a definition site).
    pub fn is_definition(&self, token: TokenId) -> bool {
        self.entries.contains_key(&token)
    }

    /// All definition tokens, in declaration order.
    pub fn definitions(&self) -> impl Iterator<Item = Definition> + '_ {
        self.order.iter().copied()
    }
}

/// One scope and the definitions introduced directly within it (not
/// inherited from an enclosing scope).
#[derive(Debug, Clone)]
pub struct ScopeEntry {
    /// The scope's rectangle and context tags.
    pub range: ScopeRange,
    /// Definitions introduced in this scope only.
    pub definitions: Vec<Definition>,
}

/// `ScopeRange` → definitions introduced in that scope.
///
/// Stored as a flat, insertion-ordered list rather than a map keyed by
/// `ScopeRange` — ranges are created once, during parsing, and never
/// looked up by exact rectangle; every query walks the list to find
/// containing scopes.
#[derive(Debug, Clone, Default)]
pub struct ScopeTable {
    entries: Vec<ScopeEntry>,
}

impl ScopeTable {
    /// An empty table.
    pub fn new() -> Self {
        ScopeTable::default()
    }

    /// Record a completed scope.
    pub fn push(&mut self, range: ScopeRange, definitions: Vec<Definition>) {
        self.entries.push(ScopeEntry { range, definitions });
    }

    /// All scope entries, in the order they were closed (innermost
    /// scopes close before their parents, so later entries in this list
    /// tend to be larger scopes — but callers should sort by
    /// `strictly_contains` rather than rely on that).
    pub fn entries(&self) -> &[ScopeEntry] {
        &self.entries
    }

    /// The innermost scope containing `(line, col)`, if any.
    pub fn innermost_containing(&self, line: u32, col: u32) -> Option<&ScopeEntry> {
        self.entries
            .iter()
            .filter(|e| e.range.contains(line, col))
            .min_by_key(|e| {
                let lines = e.range.end_line.saturating_sub(e.range.start_line);
                (lines, e.range.end_col.saturating_sub(e.range.start_col))
            })
    }

    /// All scopes enclosing `(line, col)`, ordered innermost-first.
    pub fn enclosing_chain(&self, line: u32, col: u32) -> Vec<&ScopeEntry> {
        let mut chain: Vec<&ScopeEntry> = self.entries.iter().filter(|e| e.range.contains(line, col)).collect();
        chain.sort_by_key(|e| {
            let lines = e.range.end_line.saturating_sub(e.range.start_line);
            (lines, e.range.end_col.saturating_sub(e.range.start_col))
        });
        chain
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn global_range() -> ScopeRange {
        ScopeRange {
            start_line: 0,
            start_col: 0,
            end_line: 10,
            end_col: 0,
            scope_context: ScopeContext::Global,
            function_context: FunctionContext::Global,
            class_context: ClassContext::Global,
        }
    }

    #[test]
    fn symbol_map_never_includes_definition_in_its_own_references() {
        let mut map = SymbolMap::new();
        map.declare(5);
        map.add_reference(5, 9);
        map.add_reference(5, 20);
        assert_eq!(map.references(5), &[9, 20]);
        assert!(!map.references(5).contains(&5));
    }

    #[test]
    fn scope_table_picks_innermost_of_nested_ranges() {
        let mut table = ScopeTable::new();
        table.push(global_range(), vec![]);
        let inner = ScopeRange {
            start_line: 1,
            start_col: 0,
            end_line: 2,
            end_col: 0,
            scope_context: ScopeContext::Block,
            function_context: FunctionContext::Global,
            class_context: ClassContext::Global,
        };
        table.push(inner, vec![1]);
        let found = table.innermost_containing(1, 3).unwrap();
        assert_eq!(found.range.scope_context, ScopeContext::Block);
    }

    #[test]
    fn scope_range_containment_is_closed_on_both_ends() {
        let r = global_range();
        assert!(r.contains(0, 0));
        assert!(r.contains(10, 0));
        assert!(!r.contains(11, 0));
    }
}
