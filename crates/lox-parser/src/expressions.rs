//! Expression grammar: `assignment` down through `primary`, plus the
//! identifier-resolution logic that fires whenever `primary` consumes an
//! `IDENT` (the resolver's other half lives in [`crate::statements`] for
//! definitions; this module handles references).

use crate::{Parser, NATIVES};
use lox_ast::{Node, TokenId, TokenKind};
use lox_symbols::ClassContext;

const MAX_CALL_ARGS: usize = 255;

impl<'t> Parser<'t> {
    pub(crate) fn expression(&mut self) -> Node {
        self.assignment()
    }

    fn assignment(&mut self) -> Node {
        self.skip_newlines();
        let target = self.logic_or();
        self.skip_newlines();
        if !self.matches(TokenKind::Equal) {
            return target;
        }
        self.skip_newlines();
        let value = Box::new(self.assignment());
        match target {
            Node::Variable { identifier, definition } => Node::Assignment { target: identifier, definition, value },
            other => {
                let tok = self.token(other.anchor_token().unwrap_or(self.previous_id())).clone();
                self.report_resolver_error(tok.line, tok.column, "invalid assignment target".to_string());
                other
            }
        }
    }

    fn logic_or(&mut self) -> Node {
        let mut left = self.logic_and();
        loop {
            self.skip_newlines();
            if !self.check(TokenKind::Or) {
                break;
            }
            let op_token = self.advance_raw();
            self.skip_newlines();
            let right = self.logic_and();
            left = Node::Binary { op: TokenKind::Or, op_token, left: Box::new(left), right: Box::new(right) };
        }
        left
    }

    fn logic_and(&mut self) -> Node {
        let mut left = self.equality();
        loop {
            self.skip_newlines();
            if !self.check(TokenKind::And) {
                break;
            }
            let op_token = self.advance_raw();
            self.skip_newlines();
            let right = self.equality();
            left = Node::Binary { op: TokenKind::And, op_token, left: Box::new(left), right: Box::new(right) };
        }
        left
    }

    fn equality(&mut self) -> Node {
        self.binary_level(Self::comparison, &[TokenKind::BangEqual, TokenKind::EqualEqual])
    }

    fn comparison(&mut self) -> Node {
        self.binary_level(Self::term, &[TokenKind::Greater, TokenKind::GreaterEqual, TokenKind::Less, TokenKind::LessEqual])
    }

    fn term(&mut self) -> Node {
        self.binary_level(Self::factor, &[TokenKind::Minus, TokenKind::Plus])
    }

    fn factor(&mut self) -> Node {
        self.binary_level(Self::unary, &[TokenKind::Slash, TokenKind::Star])
    }

    /// Shared left-associative binary operator layer: `next (op next)*`.
    fn binary_level(&mut self, next: fn(&mut Self) -> Node, ops: &[TokenKind]) -> Node {
        let mut left = next(self);
        loop {
            self.skip_newlines();
            if !ops.contains(&self.peek_kind()) {
                break;
            }
            let op = self.peek_kind();
            let op_token = self.advance_raw();
            self.skip_newlines();
            let right = next(self);
            left = Node::Binary { op, op_token, left: Box::new(left), right: Box::new(right) };
        }
        left
    }

    fn unary(&mut self) -> Node {
        let tok = self.peek();
        let (line, column) = (tok.line, tok.column);
        if self.check(TokenKind::Bang) || self.check(TokenKind::Minus) {
            if !self.enter_depth(line, column) {
                return Node::Primary { token: self.advance_raw() };
            }
            let op = self.peek_kind();
            let op_token = self.advance_raw();
            self.skip_newlines();
            let operand = Box::new(self.unary());
            self.exit_depth();
            return Node::Unary { op, op_token, operand };
        }
        self.call()
    }

    fn call(&mut self) -> Node {
        let mut expr = self.primary();
        loop {
            if self.check(TokenKind::LeftParen) {
                let paren_token = self.advance_raw();
                let mut args = Vec::new();
                if !self.check(TokenKind::RightParen) {
                    self.skip_newlines();
                    args.push(self.expression());
                    while self.matches(TokenKind::Comma) {
                        self.skip_newlines();
                        args.push(self.expression());
                    }
                }
                self.skip_newlines();
                self.expect(TokenKind::RightParen, "expected ')' after arguments");
                if args.len() > MAX_CALL_ARGS {
                    let tok = self.token(paren_token).clone();
                    self.report_resolver_error(tok.line, tok.column, format!("can't have more than {MAX_CALL_ARGS} arguments"));
                }
                expr = Node::Call { callee: Box::new(expr), paren_token, args };
            } else if self.check(TokenKind::Dot) {
                self.advance_raw();
                let name = self.expect(TokenKind::Identifier, "expected property name after '.'");
                expr = Node::GetExpr { object: Box::new(expr), name };
            } else {
                break;
            }
        }
        expr
    }

    fn primary(&mut self) -> Node {
        let tok = self.peek();
        let (line, column) = (tok.line, tok.column);
        match self.peek_kind() {
            TokenKind::Number | TokenKind::String | TokenKind::True | TokenKind::False | TokenKind::Nil => {
                Node::Primary { token: self.advance_raw() }
            }
            TokenKind::This => {
                let token = self.advance_raw();
                if !matches!(self.scopes.class_context(), ClassContext::Class) {
                    self.report_resolver_error(line, column, "Can't use 'this' outside of a class".to_string());
                }
                Node::This { token }
            }
            TokenKind::Super => {
                let token = self.advance_raw();
                if !matches!(self.scopes.class_context(), ClassContext::Class) {
                    self.report_resolver_error(line, column, "Can't use 'super' outside of a class".to_string());
                }
                self.expect(TokenKind::Dot, "expected '.' after 'super'");
                let method = self.expect(TokenKind::Identifier, "expected superclass method name");
                Node::Super { token, method }
            }
            TokenKind::Identifier => {
                let token = self.advance_raw();
                self.variable_expr(token)
            }
            TokenKind::LeftParen => {
                if !self.enter_depth(line, column) {
                    return Node::Primary { token: self.advance_raw() };
                }
                self.advance_raw();
                self.skip_newlines();
                let inner = Box::new(self.expression());
                self.skip_newlines();
                self.expect(TokenKind::RightParen, "expected ')' after expression");
                self.exit_depth();
                Node::Group { inner }
            }
            _ => {
                let text = tok.text.clone();
                self.report_parser_error(line, column, format!("unexpected token '{text}'"));
                Node::Primary { token: self.advance_raw() }
            }
        }
    }

    /// Resolve an `IDENT` token encountered in expression position: walk
    /// the scope stack, falling back to the pre-declared native set, and
    /// record the reference (or the "undefined" diagnostic) accordingly.
    fn variable_expr(&mut self, token: TokenId) -> Node {
        let tok = self.token(token).clone();
        if NATIVES.contains(&tok.text.as_ref()) {
            return Node::Variable { identifier: token, definition: None };
        }
        match self.scopes.resolve(&tok.text) {
            Some(definition) => {
                self.symbol_map.add_reference(definition, token);
                Node::Variable { identifier: token, definition: Some(definition) }
            }
            None => {
                self.report_resolver_error(tok.line, tok.column, format!("{} is not defined in current scope", tok.text));
                Node::Variable { identifier: token, definition: None }
            }
        }
    }
}
