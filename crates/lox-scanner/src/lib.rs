//! Hand-written scanner for the Lox scripting language.
//!
//! Converts a source buffer into `(tokens, diagnostics)` per distilled
//! spec §4.1. Scanning never aborts: an unexpected character or an
//! unterminated string is recorded as a diagnostic and scanning resumes
//! from the next character.

use lox_diagnostic::{Diagnostic, Source};
use lox_token::{Token, TokenKind};
use std::sync::Arc;

/// Scan `source` into its token stream and any lexical diagnostics.
///
/// The returned token vector always ends with a synthetic `Eof` token,
/// even for an empty or fully-erroneous input.
pub fn scan(source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    Scanner::new(source).run()
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Scanner { chars: source.chars().collect(), pos: 0, line: 0, column: 0, tokens: Vec::new(), diagnostics: Vec::new() }
    }

    fn run(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        while !self.at_end() {
            self.scan_token();
        }
        self.tokens.push(Token::eof(self.line, self.column));
        (self.tokens, self.diagnostics)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Consume and return the current character, advancing line/column
    /// bookkeeping. `\n` resets `column` to 0 and increments `line`.
    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        ch
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<Arc<str>>, line: u32, column: u32, length: u32) {
        self.tokens.push(Token::new(kind, text, line, column, length));
    }

    fn error(&mut self, line: u32, column: u32, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(line, column, message, Source::Scanner));
    }

    fn scan_token(&mut self) {
        let start_line = self.line;
        let start_col = self.column;
        let ch = self.advance();

        match ch {
            '+' => self.push(TokenKind::Plus, "+", start_line, start_col, 1),
            '-' => self.push(TokenKind::Minus, "-", start_line, start_col, 1),
            '*' => self.push(TokenKind::Star, "*", start_line, start_col, 1),
            ';' => self.push(TokenKind::Semicolon, ";", start_line, start_col, 1),
            '{' => self.push(TokenKind::LeftBrace, "{", start_line, start_col, 1),
            '}' => self.push(TokenKind::RightBrace, "}", start_line, start_col, 1),
            '(' => self.push(TokenKind::LeftParen, "(", start_line, start_col, 1),
            ')' => self.push(TokenKind::RightParen, ")", start_line, start_col, 1),
            '.' => self.push(TokenKind::Dot, ".", start_line, start_col, 1),
            ',' => self.push(TokenKind::Comma, ",", start_line, start_col, 1),
            ' ' | '\t' | '\r' => {}
            '\n' => self.push(TokenKind::Newline, "\n", start_line, start_col, 1),
            '/' => {
                if self.matches('/') {
                    self.scan_line_comment(start_line, start_col);
                } else {
                    self.push(TokenKind::Slash, "/", start_line, start_col, 1);
                }
            }
            '=' => {
                if self.matches('=') {
                    self.push(TokenKind::EqualEqual, "==", start_line, start_col, 2);
                } else {
                    self.push(TokenKind::Equal, "=", start_line, start_col, 1);
                }
            }
            '!' => {
                if self.matches('=') {
                    self.push(TokenKind::BangEqual, "!=", start_line, start_col, 2);
                } else {
                    self.push(TokenKind::Bang, "!", start_line, start_col, 1);
                }
            }
            '<' => {
                if self.matches('=') {
                    self.push(TokenKind::LessEqual, "<=", start_line, start_col, 2);
                } else {
                    self.push(TokenKind::Less, "<", start_line, start_col, 1);
                }
            }
            '>' => {
                if self.matches('=') {
                    self.push(TokenKind::GreaterEqual, ">=", start_line, start_col, 2);
                } else {
                    self.push(TokenKind::Greater, ">", start_line, start_col, 1);
                }
            }
            '"' => self.scan_string(start_line, start_col),
            c if c.is_ascii_digit() => self.scan_number(start_line, start_col),
            c if is_identifier_start(c) => self.scan_identifier(start_line, start_col),
            other => {
                self.error(start_line, start_col, format!("unexpected character '{other}'"));
            }
        }
    }

    fn scan_line_comment(&mut self, start_line: u32, start_col: u32) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        let length = text.chars().count() as u32 + 2; // include the leading "//"
        self.push(TokenKind::Comment, text, start_line, start_col, length);
    }

    fn scan_string(&mut self, start_line: u32, start_col: u32) {
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    self.error(start_line, start_col, "unterminated string");
                    return;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        // length spans the opening and closing quotes plus the body.
        let length = text.chars().count() as u32 + 2;
        self.push(TokenKind::String, text, start_line, start_col, length);
    }

    fn scan_number(&mut self, start_line: u32, start_col: u32) {
        let mut text = String::new();
        text.push(self.chars[self.pos - 1]);
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.advance();
        }
        if self.peek() == Some('.') && self.peek_at(1).map(|c| c.is_ascii_digit()).unwrap_or(false) {
            text.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                text.push(c);
                self.advance();
            }
        }
        let length = text.chars().count() as u32;
        self.push(TokenKind::Number, text, start_line, start_col, length);
    }

    fn scan_identifier(&mut self, start_line: u32, start_col: u32) {
        let mut text = String::new();
        text.push(self.chars[self.pos - 1]);
        while let Some(c) = self.peek() {
            if !is_identifier_continue(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        let length = text.chars().count() as u32;
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        self.push(kind, text, start_line, start_col, length);
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_empty_source_to_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn scans_var_decl() {
        assert_eq!(
            kinds("var x = 1;"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_take_priority_over_single_char() {
        assert_eq!(kinds("== != <= >="), vec![
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn newline_emits_token_and_advances_line() {
        let (tokens, _) = scan("1\n2");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].line, 1);
        assert_eq!(tokens[2].column, 0);
    }

    #[test]
    fn unterminated_string_reports_diagnostic_and_continues() {
        let (tokens, diags) = scan("\"abc");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "unterminated string");
        assert_eq!(tokens, vec![Token::eof(0, 4)]);
    }

    #[test]
    fn unexpected_character_is_recorded_and_scanning_continues() {
        let (tokens, diags) = scan("@ 1");
        assert_eq!(diags.len(), 1);
        assert_eq!(kinds_of(&tokens), vec![TokenKind::Number, TokenKind::Eof]);
    }

    fn kinds_of(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn string_may_span_multiple_lines() {
        let (tokens, diags) = scan("\"a\nb\"");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(&*tokens[0].text, "a\nb");
    }

    #[test]
    fn line_comment_is_emitted_as_comment_token() {
        let (tokens, _) = scan("// hello\n");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(&*tokens[0].text, " hello");
    }

    #[test]
    fn scan_always_terminates_and_ends_with_eof() {
        let (tokens, _) = scan("class Foo { fun bar() { return 1 + 2 * (3 - 4); } }");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    proptest::proptest! {
        #[test]
        fn scan_terminates_on_arbitrary_input(s in ".{0,200}") {
            let (tokens, _) = scan(&s);
            proptest::prop_assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        }
    }
}
