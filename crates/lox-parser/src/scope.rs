//! The resolver's scope stack.
//!
//! Fused into the parser per distilled spec §4.2: as each scope-introducing
//! construct opens, [`ScopeStack::push`] adds a frame; closing it with
//! [`ScopeStack::pop`] records a [`ScopeRange`] in the [`ScopeTable`] and
//! folds the frame's collected definitions into it.

use lox_ast::TokenId;
use lox_symbols::{ClassContext, FunctionContext, ScopeContext, ScopeRange, ScopeTable};
use rustc_hash::FxHashMap;
use std::sync::Arc;

struct Frame {
    /// Name → most recently declared token for that name, in this frame
    /// only. Redeclaring a name overwrites the value here so later
    /// references bind to the newest definition, without disturbing the
    /// reference list already recorded against the older one.
    names: FxHashMap<Arc<str>, TokenId>,
    collected: Vec<TokenId>,
    scope_context: ScopeContext,
    function_context: FunctionContext,
    class_context: ClassContext,
    start_line: u32,
    start_col: u32,
}

/// The result of looking up a name for redeclaration purposes.
pub enum Redeclared {
    /// No prior definition of this name exists in the current frame.
    No,
    /// The name already exists in the current (global) frame: soft
    /// warning, not an error.
    InGlobal,
    /// The name already exists in the current (non-global) frame: error.
    InNestedScope,
}

pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// A fresh stack holding only the global frame, spanning from
    /// `(0, 0)`. The caller closes it explicitly once parsing reaches EOF.
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame {
                names: FxHashMap::default(),
                collected: Vec::new(),
                scope_context: ScopeContext::Global,
                function_context: FunctionContext::Global,
                class_context: ClassContext::Global,
                start_line: 0,
                start_col: 0,
            }],
        }
    }

    pub fn is_global(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn function_context(&self) -> FunctionContext {
        self.frames.last().map(|f| f.function_context).unwrap_or(FunctionContext::Global)
    }

    pub fn class_context(&self) -> ClassContext {
        self.frames.last().map(|f| f.class_context).unwrap_or(ClassContext::Global)
    }

    /// Open a new frame of the given kind at `(start_line, start_col)`.
    /// `function_context`/`class_context` are inherited from the enclosing
    /// frame unless `scope_context` itself establishes a new one.
    pub fn push(&mut self, scope_context: ScopeContext, start_line: u32, start_col: u32) {
        let parent_function = self.function_context();
        let parent_class = self.class_context();
        let function_context = match scope_context {
            ScopeContext::Function => FunctionContext::Function,
            ScopeContext::Method => FunctionContext::Method,
            _ => parent_function,
        };
        let class_context = match scope_context {
            ScopeContext::Class => ClassContext::Class,
            _ => parent_class,
        };
        self.frames.push(Frame {
            names: FxHashMap::default(),
            collected: Vec::new(),
            scope_context,
            function_context,
            class_context,
            start_line,
            start_col,
        });
    }

    /// Close the innermost frame, recording its range and definitions into
    /// `table`. Unreachable in practice: every `push` in this crate is
    /// paired with exactly one `pop`.
    pub fn pop(&mut self, end_line: u32, end_col: u32, table: &mut ScopeTable) {
        let Some(frame) = self.frames.pop() else {
            unreachable!("scope stack underflow: pop without matching push");
        };
        let range = ScopeRange {
            start_line: frame.start_line,
            start_col: frame.start_col,
            end_line,
            end_col,
            scope_context: frame.scope_context,
            function_context: frame.function_context,
            class_context: frame.class_context,
        };
        table.push(range, frame.collected);
    }

    /// Register `name` as declared at `token` in the innermost frame.
    /// Returns whether (and how) this shadows an existing declaration in
    /// that same frame; the caller is responsible for emitting the
    /// corresponding diagnostic. The new token always replaces the old one
    /// in the frame's lookup table.
    pub fn declare(&mut self, name: Arc<str>, token: TokenId) -> Redeclared {
        let is_global = self.is_global();
        let Some(frame) = self.frames.last_mut() else {
            unreachable!("scope stack is never empty");
        };
        let redeclared = match frame.names.get(&name) {
            Some(_) if is_global => Redeclared::InGlobal,
            Some(_) => Redeclared::InNestedScope,
            None => Redeclared::No,
        };
        frame.names.insert(name, token);
        frame.collected.push(token);
        redeclared
    }

    /// Walk frames innermost-to-outermost looking for `name`.
    pub fn resolve(&self, name: &str) -> Option<TokenId> {
        self.frames.iter().rev().find_map(|f| f.names.get(name).copied())
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        ScopeStack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaration_in_global_frame_is_soft() {
        let mut stack = ScopeStack::new();
        assert!(matches!(stack.declare("a".into(), 1), Redeclared::No));
        assert!(matches!(stack.declare("a".into(), 2), Redeclared::InGlobal));
    }

    #[test]
    fn redeclaration_in_nested_frame_is_hard() {
        let mut stack = ScopeStack::new();
        stack.push(ScopeContext::Block, 0, 0);
        assert!(matches!(stack.declare("a".into(), 1), Redeclared::No));
        assert!(matches!(stack.declare("a".into(), 2), Redeclared::InNestedScope));
    }

    #[test]
    fn resolve_prefers_innermost_frame() {
        let mut stack = ScopeStack::new();
        stack.declare("x".into(), 1);
        stack.push(ScopeContext::Block, 0, 0);
        stack.declare("x".into(), 2);
        assert_eq!(stack.resolve("x"), Some(2));
    }

    #[test]
    fn function_and_class_context_are_inherited_until_overridden() {
        let mut stack = ScopeStack::new();
        stack.push(ScopeContext::Class, 0, 0);
        assert_eq!(stack.class_context(), ClassContext::Class);
        stack.push(ScopeContext::Method, 0, 0);
        assert_eq!(stack.function_context(), FunctionContext::Method);
        assert_eq!(stack.class_context(), ClassContext::Class);
    }
}
