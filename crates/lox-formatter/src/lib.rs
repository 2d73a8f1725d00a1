//! Canonical-text formatter: a pre-order walk over a parsed [`Program`]
//! that reproduces the source as the distilled grammar's rules prescribe
//! (4-space indentation per block/class/function-body, one statement per
//! line, a single-line `for` header), per distilled spec §4.4.
//!
//! Unlike the teacher's `perl-lsp-formatting`, which shells out to
//! `perltidy` and can therefore fail (missing binary, subprocess error),
//! this formatter is a total function: it never shells out and has
//! nothing to fail on for any AST that parsed, so it returns a plain
//! `String` rather than a `Result`.

use lox_ast::{Node, Param, Program, Token, TokenId, TokenKind};

/// Render `program` to canonical source text. `tokens` is the arena the
/// program's `TokenId`s index into — normally [`lox_parser::Analysis::tokens`]
/// alongside [`lox_parser::Analysis::program`].
pub fn format(tokens: &[Token], program: &Program) -> String {
    let mut printer = Printer { tokens, out: String::new(), indent: 0 };
    printer.render_items(&program.declarations);
    printer.out
}

struct Printer<'t> {
    tokens: &'t [Token],
    out: String,
    indent: usize,
}

fn text(tokens: &[Token], id: TokenId) -> &str {
    &tokens[id as usize].text
}

impl Printer<'_> {
    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    /// Render a declaration/statement/trivia list (a program or a block
    /// body). The grammar's `declaration → ... | NEWLINE` means the
    /// source newline that ends every ordinary statement's line is
    /// *itself* a `NewLine` node in this list, indistinguishable from a
    /// deliberate blank line — so a run of exactly one `NewLine` is the
    /// normal line end (nothing to render, the statement already wrote
    /// its own trailing `\n`), and a run of two or more collapses to a
    /// single blank line (distilled spec §4.4's coalescing rule).
    fn render_items(&mut self, items: &[Node]) {
        let mut i = 0;
        while i < items.len() {
            if matches!(items[i], Node::NewLine) {
                let mut run = 0usize;
                while i < items.len() && matches!(items[i], Node::NewLine) {
                    run += 1;
                    i += 1;
                }
                if run >= 2 {
                    self.out.push('\n');
                }
                continue;
            }
            self.item(&items[i]);
            i += 1;
        }
    }

    fn join_params(&mut self, params: &[Param]) {
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(text(self.tokens, *p));
        }
    }

    // ===== Expressions =====

    fn expression(&mut self, node: &Node) {
        match node {
            Node::Primary { token } if self.tokens[*token as usize].kind == TokenKind::String => {
                self.out.push('"');
                self.out.push_str(text(self.tokens, *token));
                self.out.push('"');
            }
            Node::Primary { token } => self.out.push_str(text(self.tokens, *token)),
            Node::Unary { op_token, operand, .. } => {
                self.out.push_str(text(self.tokens, *op_token));
                self.expression(operand);
            }
            Node::Binary { op_token, left, right, .. } => {
                self.expression(left);
                self.out.push(' ');
                self.out.push_str(text(self.tokens, *op_token));
                self.out.push(' ');
                self.expression(right);
            }
            Node::Group { inner } => {
                self.out.push('(');
                self.expression(inner);
                self.out.push(')');
            }
            Node::Variable { identifier, .. } => self.out.push_str(text(self.tokens, *identifier)),
            Node::This { .. } => self.out.push_str("this"),
            Node::Super { method, .. } => {
                self.out.push_str("super.");
                self.out.push_str(text(self.tokens, *method));
            }
            Node::Assignment { target, value, .. } => {
                self.out.push_str(text(self.tokens, *target));
                self.out.push_str(" = ");
                self.expression(value);
            }
            Node::Call { callee, args, .. } => {
                self.expression(callee);
                self.out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expression(arg);
                }
                self.out.push(')');
            }
            Node::GetExpr { object, name } => {
                self.expression(object);
                self.out.push('.');
                self.out.push_str(text(self.tokens, *name));
            }
            // Statements and trivia never appear in expression position.
            _ => {}
        }
    }

    // ===== Statements =====

    /// Render a statement's content with no leading indent and no
    /// trailing newline — used both for a `for` header's init/step
    /// clauses and for a single-statement (non-block) branch body.
    fn inline_stmt(&mut self, node: &Node) {
        match node {
            Node::ExpressionStmt { expr } => {
                self.expression(expr);
                self.out.push(';');
            }
            Node::PrintStmt { expr, .. } => {
                self.out.push_str("print ");
                self.expression(expr);
                self.out.push(';');
            }
            Node::ReturnStmt { expr, .. } => {
                self.out.push_str("return");
                if let Some(e) = expr {
                    self.out.push(' ');
                    self.expression(e);
                }
                self.out.push(';');
            }
            Node::VarDecl { name, initializer } => {
                self.out.push_str("var ");
                self.out.push_str(text(self.tokens, *name));
                if let Some(init) = initializer {
                    self.out.push_str(" = ");
                    self.expression(init);
                }
                self.out.push(';');
            }
            Node::IfStmt { cond, then_branch, else_branch } => self.if_header(cond, then_branch, else_branch),
            Node::WhileStmt { cond, body } => self.while_header(cond, body),
            Node::ForStmt { init, cond, step, body } => self.for_header(init, cond, step, body),
            Node::BlockStmt { statements } => self.block_body(statements),
            _ => {}
        }
    }

    /// Renders a `{ ... }` body with no leading separator; the caller
    /// supplies whatever whitespace belongs before the opening brace.
    fn block_body(&mut self, statements: &[Node]) {
        self.out.push_str("{\n");
        self.indent += 1;
        self.render_items(statements);
        self.indent -= 1;
        self.write_indent();
        self.out.push('}');
    }

    /// Renders a one-statement-or-block branch owned by `if`/`while`/`else`.
    /// A block gets `" { ... }"` on the header's line; a non-block body
    /// stays on its own indented line with no trailing space carried over
    /// from the header, so the parser sees a clean newline before it on
    /// reparse instead of a dangling blank-looking space.
    fn branch(&mut self, node: &Node) {
        match node {
            Node::BlockStmt { statements } => {
                self.out.push(' ');
                self.block_body(statements);
            }
            other => {
                self.out.push('\n');
                self.indent += 1;
                self.write_indent();
                self.inline_stmt(other);
                self.indent -= 1;
            }
        }
    }

    fn if_header(&mut self, cond: &Node, then_branch: &Node, else_branch: &Option<Box<Node>>) {
        self.out.push_str("if (");
        self.expression(cond);
        self.out.push(')');
        self.branch(then_branch);
        if let Some(else_b) = else_branch {
            match then_branch {
                Node::BlockStmt { .. } => self.out.push_str(" else"),
                _ => {
                    self.out.push('\n');
                    self.write_indent();
                    self.out.push_str("else");
                }
            }
            self.branch(else_b);
        }
    }

    fn while_header(&mut self, cond: &Node, body: &Node) {
        self.out.push_str("while (");
        self.expression(cond);
        self.out.push(')');
        self.branch(body);
    }

    /// Renders the whole `for (init; cond; step) body` on one logical
    /// line: the header clauses suppress their own trailing newlines
    /// (distilled spec §4.4), even though `init`/`step` are themselves
    /// statement nodes that would otherwise get one.
    fn for_header(&mut self, init: &Option<Box<Node>>, cond: &Option<Box<Node>>, step: &Option<Box<Node>>, body: &Node) {
        self.out.push_str("for (");
        match init {
            Some(n) => self.inline_stmt(n),
            None => self.out.push(';'),
        }
        self.out.push(' ');
        if let Some(c) = cond {
            self.expression(c);
        }
        self.out.push(';');
        self.out.push(' ');
        if let Some(s) = step {
            self.expression(s);
        }
        self.out.push(')');
        self.branch(body);
    }

    /// One item inside a block body or the top-level program: a
    /// declaration or statement, indented at the current depth.
    /// `NewLine` trivia is handled by [`Printer::render_items`] before it
    /// reaches here.
    fn item(&mut self, node: &Node) {
        match node {
            Node::Comment { token } => {
                self.write_indent();
                self.out.push_str("//");
                self.out.push_str(text(self.tokens, *token));
                self.out.push('\n');
            }
            Node::FuncDecl { name, params, body } => {
                self.write_indent();
                self.out.push_str("fun ");
                self.out.push_str(text(self.tokens, *name));
                self.out.push('(');
                self.join_params(params);
                self.out.push(')');
                self.branch(body);
                self.out.push('\n');
            }
            Node::ClassDecl { .. } => self.class_decl(node),
            _ => {
                self.write_indent();
                self.inline_stmt(node);
                self.out.push('\n');
            }
        }
    }

    fn class_decl(&mut self, node: &Node) {
        let Node::ClassDecl { name, superclass, methods } = node else { return };
        self.write_indent();
        self.out.push_str("class ");
        self.out.push_str(text(self.tokens, *name));
        if let Some(sc) = superclass {
            self.out.push_str(" < ");
            self.out.push_str(text(self.tokens, *sc));
        }
        self.out.push_str(" {\n");
        self.indent += 1;
        // Methods never carry `NewLine` trivia — the parser's class body
        // loop discards blank lines outright (statements.rs `class_decl`).
        for method in methods {
            self.method_item(method);
        }
        self.indent -= 1;
        self.write_indent();
        self.out.push_str("}\n");
    }

    /// A class body's methods are `FuncDecl` nodes without a `fun`
    /// keyword token (the grammar's `method` production omits it), so
    /// they render without the `fun ` prefix that a top-level function
    /// declaration gets.
    fn method_item(&mut self, node: &Node) {
        match node {
            Node::FuncDecl { name, params, body } => {
                self.write_indent();
                self.out.push_str(text(self.tokens, *name));
                self.out.push('(');
                self.join_params(params);
                self.out.push(')');
                self.branch(body);
                self.out.push('\n');
            }
            _ => self.item(node),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn format_source(source: &str) -> String {
        let analysis = lox_parser::analyze(source);
        format(&analysis.tokens, &analysis.program)
    }

    #[test]
    fn formats_var_decl_with_initializer() {
        assert_eq!(format_source("var x=1;"), "var x = 1;\n");
    }

    #[test]
    fn formats_binary_with_spaces() {
        assert_eq!(format_source("print 1+2;"), "print 1 + 2;\n");
    }

    #[test]
    fn formats_unary_with_no_space() {
        assert_eq!(format_source("print -1;"), "print -1;\n");
    }

    #[test]
    fn formats_block_with_indentation() {
        let out = format_source("{\nvar x=1;\n}\n");
        assert_eq!(out, "{\n    var x = 1;\n}\n");
    }

    #[test]
    fn coalesces_consecutive_blank_lines() {
        let out = format_source("var a;\n\n\n\nvar b;\n");
        assert_eq!(out, "var a;\n\nvar b;\n");
    }

    #[test]
    fn renders_comment_at_current_indent() {
        let out = format_source("{\n// hi\n}\n");
        assert_eq!(out, "{\n    // hi\n}\n");
    }

    #[test]
    fn renders_for_loop_header_on_one_line() {
        let out = format_source("for (var i=0;i<10;i=i+1) {\nprint i;\n}\n");
        assert_eq!(out, "for (var i = 0; i < 10; i = i + 1) {\n    print i;\n}\n");
    }

    #[test]
    fn renders_class_with_methods_unprefixed() {
        let out = format_source("class Greeter {\nhello() {\nprint \"hi\";\n}\n}\n");
        assert_eq!(out, "class Greeter {\n    hello() {\n        print \"hi\";\n    }\n}\n");
    }

    #[test]
    fn renders_if_else_block_chain() {
        let out = format_source("if (true) {\nprint 1;\n} else {\nprint 2;\n}\n");
        assert_eq!(out, "if (true) {\n    print 1;\n} else {\n    print 2;\n}\n");
    }

    #[test]
    fn renders_non_block_if_body_on_its_own_indented_line_with_no_trailing_space() {
        let out = format_source("if (true) print 1;\n");
        assert_eq!(out, "if (true)\n    print 1;\n");
    }

    #[test]
    fn formatting_a_non_block_if_body_is_idempotent() {
        let once = format_source("if (true) print 1;\n");
        let twice = format_source(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn renders_non_block_while_body_with_no_trailing_space() {
        let out = format_source("while (true) print 1;\n");
        assert_eq!(out, "while (true)\n    print 1;\n");
    }

    #[test]
    fn renders_non_block_else_body_with_no_trailing_space() {
        let out = format_source("if (true) print 1; else print 2;\n");
        assert_eq!(out, "if (true)\n    print 1;\nelse\n    print 2;\n");
    }
}
