//! Go-to-definition and find-references query algorithms, per distilled
//! spec §4.3. Both operate on the already-built [`Analysis`] the document
//! service caches per file — there is no re-parsing here, only a walk of
//! the AST to find which binding a cursor position touches.
//!
//! Cross-file resolution is an explicit non-goal, so both queries only
//! ever need the single-file case.

use lox_ast::{Node, Program, TokenId};
use lox_parser::Analysis;
use lox_token::Token;

/// A half-open-on-neither-end source span, inclusive of both endpoints
/// since it is always derived from a single token's line/column/length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

fn span_of(tokens: &[Token], id: TokenId) -> Span {
    let tok = &tokens[id as usize];
    Span { start_line: tok.line, start_col: tok.column, end_line: tok.line, end_col: tok.column + tok.length.max(1) }
}

/// The binding touched by a cursor: the token under the cursor (an
/// identifier use or a declaration site) and the definition it resolves
/// to.
struct Binding {
    definition: TokenId,
}

/// Find the binding a cursor position touches, if any. Property names
/// (`GetExpr`), `this`/`super`, and unresolved variables (`definition:
/// None`) have no binding to navigate to.
fn binding_at(program: &Program, tokens: &[Token], line: u32, col: u32) -> Option<Binding> {
    program.declarations.iter().find_map(|node| find_in_node(node, tokens, line, col))
}

fn covers(tokens: &[Token], id: TokenId, line: u32, col: u32) -> bool {
    tokens[id as usize].covers(line, col)
}

fn find_in_node(node: &Node, tokens: &[Token], line: u32, col: u32) -> Option<Binding> {
    match node {
        Node::Unary { operand, .. } => find_in_node(operand, tokens, line, col),
        Node::Binary { left, right, .. } => {
            find_in_node(left, tokens, line, col).or_else(|| find_in_node(right, tokens, line, col))
        }
        Node::Group { inner } => find_in_node(inner, tokens, line, col),
        Node::Variable { identifier, definition } => {
            if covers(tokens, *identifier, line, col) {
                definition.map(|definition| Binding { definition })
            } else {
                None
            }
        }
        Node::Assignment { target, definition, value } => {
            if covers(tokens, *target, line, col) {
                definition.map(|definition| Binding { definition })
            } else {
                find_in_node(value, tokens, line, col)
            }
        }
        Node::Call { callee, args, .. } => {
            find_in_node(callee, tokens, line, col).or_else(|| args.iter().find_map(|a| find_in_node(a, tokens, line, col)))
        }
        Node::GetExpr { object, .. } => find_in_node(object, tokens, line, col),
        Node::ExpressionStmt { expr } => find_in_node(expr, tokens, line, col),
        Node::PrintStmt { expr, .. } => find_in_node(expr, tokens, line, col),
        Node::ReturnStmt { expr, .. } => expr.as_deref().and_then(|e| find_in_node(e, tokens, line, col)),
        Node::BlockStmt { statements } => statements.iter().find_map(|s| find_in_node(s, tokens, line, col)),
        Node::IfStmt { cond, then_branch, else_branch } => find_in_node(cond, tokens, line, col)
            .or_else(|| find_in_node(then_branch, tokens, line, col))
            .or_else(|| else_branch.as_deref().and_then(|e| find_in_node(e, tokens, line, col))),
        Node::WhileStmt { cond, body } => {
            find_in_node(cond, tokens, line, col).or_else(|| find_in_node(body, tokens, line, col))
        }
        Node::ForStmt { init, cond, step, body } => init
            .as_deref()
            .and_then(|n| find_in_node(n, tokens, line, col))
            .or_else(|| cond.as_deref().and_then(|n| find_in_node(n, tokens, line, col)))
            .or_else(|| step.as_deref().and_then(|n| find_in_node(n, tokens, line, col)))
            .or_else(|| find_in_node(body, tokens, line, col)),
        Node::VarDecl { name, initializer } => {
            if covers(tokens, *name, line, col) {
                Some(Binding { definition: *name })
            } else {
                initializer.as_deref().and_then(|n| find_in_node(n, tokens, line, col))
            }
        }
        Node::FuncDecl { name, params, body } => {
            if covers(tokens, *name, line, col) {
                return Some(Binding { definition: *name });
            }
            if let Some(&param) = params.iter().find(|&&p| covers(tokens, p, line, col)) {
                return Some(Binding { definition: param });
            }
            find_in_node(body, tokens, line, col)
        }
        Node::ClassDecl { name, methods, .. } => {
            if covers(tokens, *name, line, col) {
                return Some(Binding { definition: *name });
            }
            methods.iter().find_map(|m| find_in_node(m, tokens, line, col))
        }
        Node::Primary { .. }
        | Node::This { .. }
        | Node::Super { .. }
        | Node::NewLine
        | Node::Comment { .. } => None,
    }
}

/// `textDocument/definition`: the span of the declaration the identifier
/// at `(line, col)` resolves to, or `None` if the cursor isn't on a
/// resolvable identifier.
pub fn find_definition(analysis: &Analysis, line: u32, col: u32) -> Option<Span> {
    let binding = binding_at(&analysis.program, &analysis.tokens, line, col)?;
    Some(span_of(&analysis.tokens, binding.definition))
}

/// `textDocument/references`: every resolved reference to the symbol at
/// `(line, col)`, plus the declaration itself when `include_declaration`
/// is set. Order follows `SymbolMap`'s source-order reference list, with
/// the declaration (if included) first.
pub fn find_references(analysis: &Analysis, line: u32, col: u32, include_declaration: bool) -> Vec<Span> {
    let Some(binding) = binding_at(&analysis.program, &analysis.tokens, line, col) else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    if include_declaration {
        spans.push(span_of(&analysis.tokens, binding.definition));
    }
    spans.extend(analysis.symbol_map.references(binding.definition).iter().map(|&id| span_of(&analysis.tokens, id)));
    spans
}
