//! Declarations and statements: `declaration`, `varDecl`, `funcDecl`,
//! `classDecl`, and the `statement` family from the grammar in the crate
//! docs.
//!
//! Each scope-introducing construct here pushes exactly one
//! [`lox_symbols::ScopeContext`] frame around the tokens it owns — a
//! function/method body parses directly into its `Function`/`Method`
//! frame rather than opening a second, redundant `Block` frame for the
//! brace pair; `Block` is reserved for a `{ ... }` that appears bare as a
//! statement.

use crate::scope::Redeclared;
use crate::Parser;
use lox_ast::{Node, TokenKind};
use lox_symbols::{FunctionContext, ScopeContext};

impl<'t> Parser<'t> {
    /// Dispatch for one declaration or statement at a statement-legal
    /// position (program top level, block body, class body).
    pub(crate) fn declaration_inner(&mut self) -> Option<Node> {
        if self.check(TokenKind::Newline) {
            self.advance_raw();
            return Some(Node::NewLine);
        }
        if self.check(TokenKind::Comment) {
            let token = self.advance_raw();
            return Some(Node::Comment { token });
        }
        if self.matches(TokenKind::Var) {
            return Some(self.var_decl());
        }
        if self.matches(TokenKind::Fun) {
            return Some(self.func_decl(false));
        }
        if self.matches(TokenKind::Class) {
            return Some(self.class_decl());
        }
        Some(self.statement())
    }

    fn add_definition(&mut self, token: lox_ast::TokenId) {
        let tok = self.token(token).clone();
        match self.scopes.declare(tok.text.clone(), token) {
            Redeclared::No => {}
            Redeclared::InGlobal => {
                self.report_resolver_warning(tok.line, tok.column, format!("'{}' is already declared in this scope", tok.text))
            }
            Redeclared::InNestedScope => {
                self.report_resolver_error(tok.line, tok.column, format!("'{}' is already declared in this scope", tok.text))
            }
        }
        self.symbol_map.declare(token);
    }

    fn var_decl(&mut self) -> Node {
        let name = self.expect(TokenKind::Identifier, "expected identifier after 'var'");
        self.add_definition(name);
        let initializer = if self.matches(TokenKind::Equal) {
            self.skip_newlines();
            Some(Box::new(self.expression()))
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "expected ';' after variable declaration");
        Node::VarDecl { name, initializer }
    }

    /// Parses `IDENT "(" params? ")" block`. `is_method` controls whether
    /// the pushed scope is tagged `Function` or `Method`.
    fn func_decl(&mut self, is_method: bool) -> Node {
        let name = self.expect(TokenKind::Identifier, "expected function name");
        self.add_definition(name);

        let (start_line, start_col) = {
            let tok = self.token(name);
            (tok.line, tok.column)
        };
        self.scopes.push(if is_method { ScopeContext::Method } else { ScopeContext::Function }, start_line, start_col);

        self.expect(TokenKind::LeftParen, "expected '(' after function name");
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                let param = self.expect(TokenKind::Identifier, "expected parameter name");
                self.add_definition(param);
                params.push(param);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "expected ')' after parameters");
        self.expect(TokenKind::LeftBrace, "expected '{' before function body");
        let statements = self.declarations_until(TokenKind::RightBrace);
        let close = self.expect(TokenKind::RightBrace, "expected '}' after function body");
        let (end_line, end_col) = {
            let tok = self.token(close);
            (tok.line, tok.column)
        };
        self.scopes.pop(end_line, end_col, &mut self.scope_table);

        Node::FuncDecl { name, params, body: Box::new(Node::BlockStmt { statements }) }
    }

    fn class_decl(&mut self) -> Node {
        let name = self.expect(TokenKind::Identifier, "expected class name");
        self.add_definition(name);

        let superclass = if self.matches(TokenKind::Less) {
            Some(self.expect(TokenKind::Identifier, "expected superclass name"))
        } else {
            None
        };

        let (start_line, start_col) = {
            let tok = self.token(name);
            (tok.line, tok.column)
        };
        self.scopes.push(ScopeContext::Class, start_line, start_col);
        self.expect(TokenKind::LeftBrace, "expected '{' before class body");

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.check(TokenKind::Newline) {
                self.advance_raw();
                continue;
            }
            if self.check(TokenKind::Comment) {
                let token = self.advance_raw();
                methods.push(Node::Comment { token });
                continue;
            }
            methods.push(self.func_decl(true));
        }
        let close = self.expect(TokenKind::RightBrace, "expected '}' after class body");
        let (end_line, end_col) = {
            let tok = self.token(close);
            (tok.line, tok.column)
        };
        self.scopes.pop(end_line, end_col, &mut self.scope_table);

        Node::ClassDecl { name, superclass, methods }
    }

    /// Parse statement-legal items until `closing` (exclusive) or EOF.
    fn declarations_until(&mut self, closing: TokenKind) -> Vec<Node> {
        let mut statements = Vec::new();
        while !self.check(closing) && !self.is_at_end() {
            if let Some(node) = self.declaration_inner() {
                statements.push(node);
            }
        }
        statements
    }

    pub(crate) fn statement(&mut self) -> Node {
        if self.matches(TokenKind::Print) {
            return self.print_stmt();
        }
        if self.matches(TokenKind::Return) {
            return self.return_stmt();
        }
        if self.check(TokenKind::LeftBrace) {
            return self.block_stmt();
        }
        if self.matches(TokenKind::If) {
            return self.if_stmt();
        }
        if self.matches(TokenKind::While) {
            return self.while_stmt();
        }
        if self.matches(TokenKind::For) {
            return self.for_stmt();
        }
        self.expression_stmt()
    }

    fn print_stmt(&mut self) -> Node {
        let keyword = self.previous_id();
        self.skip_newlines();
        let expr = Box::new(self.expression());
        self.expect(TokenKind::Semicolon, "expected ';' after value");
        Node::PrintStmt { keyword, expr }
    }

    fn return_stmt(&mut self) -> Node {
        let keyword = self.previous_id();
        let tok = self.token(keyword).clone();
        if self.scopes.function_context() == FunctionContext::Global {
            self.report_resolver_error(
                tok.line,
                tok.column,
                "Unexpected Return statement outside of functions or methods".to_string(),
            );
        }
        let expr = if self.check(TokenKind::Semicolon) {
            None
        } else {
            self.skip_newlines();
            Some(Box::new(self.expression()))
        };
        self.expect(TokenKind::Semicolon, "expected ';' after return value");
        Node::ReturnStmt { keyword, expr }
    }

    fn block_stmt(&mut self) -> Node {
        let open = self.expect(TokenKind::LeftBrace, "expected '{'");
        let (start_line, start_col) = {
            let tok = self.token(open);
            (tok.line, tok.column)
        };
        self.scopes.push(ScopeContext::Block, start_line, start_col);
        let statements = self.declarations_until(TokenKind::RightBrace);
        let close = self.expect(TokenKind::RightBrace, "expected '}' after block");
        let (end_line, end_col) = {
            let tok = self.token(close);
            (tok.line, tok.column)
        };
        self.scopes.pop(end_line, end_col, &mut self.scope_table);
        Node::BlockStmt { statements }
    }

    /// Parse a statement as one branch of an owning construct (if/while/
    /// for), wrapping it in its own scope frame rather than letting a
    /// bare `{ ... }` body claim a generic `Block` context.
    fn owned_branch(&mut self, scope_context: ScopeContext) -> Node {
        let (start_line, start_col) = {
            let tok = self.peek();
            (tok.line, tok.column)
        };
        self.scopes.push(scope_context, start_line, start_col);
        let body = if self.check(TokenKind::LeftBrace) {
            self.expect(TokenKind::LeftBrace, "expected '{'");
            let statements = self.declarations_until(TokenKind::RightBrace);
            let close = self.expect(TokenKind::RightBrace, "expected '}'");
            let (end_line, end_col) = {
                let tok = self.token(close);
                (tok.line, tok.column)
            };
            self.scopes.pop(end_line, end_col, &mut self.scope_table);
            return Node::BlockStmt { statements };
        } else {
            self.skip_newlines();
            self.statement()
        };
        let (end_line, end_col) = {
            let tok = self.token(self.previous_id());
            (tok.line, tok.column + tok.length.max(1))
        };
        self.scopes.pop(end_line, end_col, &mut self.scope_table);
        body
    }

    fn if_stmt(&mut self) -> Node {
        self.expect(TokenKind::LeftParen, "expected '(' after 'if'");
        let cond = Box::new(self.expression());
        self.expect(TokenKind::RightParen, "expected ')' after condition");
        let then_branch = Box::new(self.owned_branch(ScopeContext::If));
        let else_branch = if self.matches(TokenKind::Else) { Some(Box::new(self.owned_branch(ScopeContext::If))) } else { None };
        Node::IfStmt { cond, then_branch, else_branch }
    }

    fn while_stmt(&mut self) -> Node {
        self.expect(TokenKind::LeftParen, "expected '(' after 'while'");
        let cond = Box::new(self.expression());
        self.expect(TokenKind::RightParen, "expected ')' after condition");
        let body = Box::new(self.owned_branch(ScopeContext::While));
        Node::WhileStmt { cond, body }
    }

    fn for_stmt(&mut self) -> Node {
        let keyword_id = self.previous_id();
        let (start_line, start_col) = {
            let tok = self.token(keyword_id);
            (tok.line, tok.column)
        };
        self.scopes.push(ScopeContext::For, start_line, start_col);

        self.expect(TokenKind::LeftParen, "expected '(' after 'for'");

        let init = if self.matches(TokenKind::Semicolon) {
            None
        } else if self.matches(TokenKind::Var) {
            Some(Box::new(self.var_decl()))
        } else {
            Some(Box::new(self.expression_stmt()))
        };

        let cond = if self.check(TokenKind::Semicolon) { None } else { Some(Box::new(self.expression())) };
        self.expect(TokenKind::Semicolon, "expected ';' after loop condition");

        let step = if self.check(TokenKind::RightParen) { None } else { Some(Box::new(self.expression())) };
        self.expect(TokenKind::RightParen, "expected ')' after for clauses");

        let body = if self.check(TokenKind::LeftBrace) {
            self.expect(TokenKind::LeftBrace, "expected '{'");
            let statements = self.declarations_until(TokenKind::RightBrace);
            self.expect(TokenKind::RightBrace, "expected '}'");
            Box::new(Node::BlockStmt { statements })
        } else {
            self.skip_newlines();
            Box::new(self.statement())
        };

        let (end_line, end_col) = {
            let tok = self.token(self.previous_id());
            (tok.line, tok.column + tok.length.max(1))
        };
        self.scopes.pop(end_line, end_col, &mut self.scope_table);

        Node::ForStmt { init, cond, step, body }
    }

    fn expression_stmt(&mut self) -> Node {
        let expr = Box::new(self.expression());
        self.expect(TokenKind::Semicolon, "expected ';' after expression");
        Node::ExpressionStmt { expr }
    }
}
