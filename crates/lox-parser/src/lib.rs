//! Single-pass recursive-descent parser fused with the scope resolver.
//!
//! [`analyze`] is the crate's single entry point: it scans source text,
//! parses the resulting tokens into a [`Program`], and simultaneously
//! builds the [`SymbolMap`]/[`ScopeTable`] scope graph that every query
//! service downstream reads. There is no separate resolution pass —
//! resolution happens as each scope-introducing construct is parsed, per
//! the grammar in the module docs below.

mod expressions;
mod scope;
mod statements;

use lox_ast::{Program, Token, TokenId, TokenKind};
use lox_diagnostic::{BudgetTracker, Diagnostic, ParseBudget, Severity, Source};
use lox_symbols::{ScopeTable, SymbolMap};
use scope::ScopeStack;

/// Names pre-declared as globals with no defining token. Resolving one of
/// these succeeds silently: no entry is added to any [`SymbolMap`] list.
const NATIVES: &[&str] = &["clock"];

/// The full result of analyzing one document: tokens, AST, scope graph,
/// diagnostics, and the `hardErrorFlag` (distilled spec §4.3).
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The scanner's token arena. AST nodes hold [`TokenId`] indices into
    /// this vector.
    pub tokens: Vec<Token>,
    /// The parsed program.
    pub program: Program,
    /// Definition token → resolved reference tokens.
    pub symbol_map: SymbolMap,
    /// Scope rectangles and the definitions each introduces.
    pub scope_table: ScopeTable,
    /// Every diagnostic from scanning, parsing, and resolution, in the
    /// order each stage produced them (scanner first, then parser/resolver
    /// in source order).
    pub diagnostics: Vec<Diagnostic>,
    /// True iff any diagnostic originated from the scanner or parser
    /// (a structural defect), as opposed to the resolver (layered on top
    /// of a structurally sound tree). Formatting should not be trusted
    /// when this is set.
    pub hard_error: bool,
}

/// Scan and parse `source` using the default interactive-editing budget.
pub fn analyze(source: &str) -> Analysis {
    analyze_with_budget(source, ParseBudget::default())
}

/// Scan and parse `source`, bounding recursive-descent depth and the
/// number of diagnostics collected by `budget`.
pub fn analyze_with_budget(source: &str, budget: ParseBudget) -> Analysis {
    let (tokens, mut diagnostics) = lox_scanner::scan(source);
    let mut hard_error = diagnostics.iter().any(|d| d.source.is_hard());

    let mut parser = Parser::new(&tokens, budget);
    let program = parser.parse_program();
    hard_error = hard_error || parser.diagnostics.iter().any(|d| d.source.is_hard());
    diagnostics.extend(parser.diagnostics);

    Analysis { program, symbol_map: parser.symbol_map, scope_table: parser.scope_table, diagnostics, hard_error, tokens }
}

pub(crate) struct Parser<'t> {
    tokens: &'t [Token],
    current: usize,
    scopes: ScopeStack,
    symbol_map: SymbolMap,
    scope_table: ScopeTable,
    diagnostics: Vec<Diagnostic>,
    panic_mode: bool,
    budget: ParseBudget,
    budget_tracker: BudgetTracker,
    /// Current recursive-descent nesting depth. Tracked as a plain counter
    /// rather than `BudgetTracker`'s RAII guard: the guard's lifetime
    /// would have to span a recursive call tree that itself calls other
    /// `&mut self` methods (`advance_raw`, `report`, ...), which the
    /// borrow checker cannot reconcile with a field-scoped borrow.
    depth: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token], budget: ParseBudget) -> Self {
        Parser {
            tokens,
            current: 0,
            scopes: ScopeStack::new(),
            symbol_map: SymbolMap::new(),
            scope_table: ScopeTable::new(),
            diagnostics: Vec::new(),
            panic_mode: false,
            budget,
            budget_tracker: BudgetTracker::new(),
            depth: 0,
        }
    }

    fn parse_program(&mut self) -> Program {
        let mut declarations = Vec::new();
        while !self.is_at_end() {
            // Synchronization point (distilled spec §4.2): panic mode is
            // cleared only here, at the start of each top-level
            // declaration, not for declarations nested in a block or
            // class body.
            self.panic_mode = false;
            if let Some(node) = self.declaration_inner() {
                declarations.push(node);
            }
        }
        let (eof_line, eof_col) = (self.peek().line, self.peek().column);
        self.scopes.pop(eof_line, eof_col, &mut self.scope_table);
        self.warn_unused_definitions();
        Program { declarations }
    }

    fn warn_unused_definitions(&mut self) {
        let unused: Vec<TokenId> =
            self.symbol_map.definitions().filter(|d| self.symbol_map.references(*d).is_empty()).collect();
        for def in unused {
            let tok = self.token(def);
            self.diagnostics.push(Diagnostic::warning(tok.line, tok.column, "no usages after definition"));
        }
    }

    // ===== Token stream primitives =====

    fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id as usize]
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn is_at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    fn previous_id(&self) -> TokenId {
        (self.current.saturating_sub(1)) as TokenId
    }

    /// Consume and return the current token's id, unless already at EOF.
    fn advance_raw(&mut self) -> TokenId {
        let id = self.current as TokenId;
        if !self.is_at_end() {
            self.current += 1;
        }
        id
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance_raw();
            true
        } else {
            false
        }
    }

    /// Skip `Newline` tokens, used between tokens of a single expression
    /// so expressions may span source lines (distilled spec §4.2).
    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance_raw();
        }
    }

    /// Consume a token of `kind`, reporting a structural error and
    /// synchronizing if the current token doesn't match. Always returns a
    /// token id — the matched one, or (on failure) the current token,
    /// still consumed, so parsing always makes forward progress.
    fn expect(&mut self, kind: TokenKind, message: &str) -> TokenId {
        if self.check(kind) {
            return self.advance_raw();
        }
        let tok = self.peek();
        self.report_parser_error(tok.line, tok.column, message.to_string());
        let id = self.advance_raw();
        self.synchronize();
        id
    }

    fn report_parser_error(&mut self, line: u32, column: u32, message: String) {
        self.report(line, column, message, Severity::Error, Source::Parser);
    }

    fn report_resolver_error(&mut self, line: u32, column: u32, message: String) {
        self.report(line, column, message, Severity::Error, Source::Resolver);
    }

    fn report_resolver_warning(&mut self, line: u32, column: u32, message: String) {
        self.report(line, column, message, Severity::Warning, Source::Resolver);
    }

    /// Record a diagnostic. Errors are suppressed while panic mode is
    /// already active (cascade prevention) and set panic mode themselves
    /// otherwise; warnings are never suppressed by panic mode, since they
    /// don't indicate the parse went off the rails. Both kinds still
    /// respect the overall error-count budget.
    fn report(&mut self, line: u32, column: u32, message: String, severity: Severity, source: Source) {
        if severity == Severity::Error {
            if self.panic_mode {
                return;
            }
            self.panic_mode = true;
        }
        if self.budget_tracker.record_error(&self.budget) {
            self.diagnostics.push(Diagnostic::new(line, column, message, severity, source));
        }
    }

    /// Skip tokens until a likely statement boundary, so a structural
    /// parse error cannot strand the parser mid-expression forever.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.current > 0 && self.token(self.previous_id()).kind == TokenKind::Semicolon {
                return;
            }
            match self.peek_kind() {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance_raw();
                }
            }
        }
    }

    /// Enter one level of recursive-descent depth. Returns `false` (and
    /// reports a single diagnostic) if doing so would exceed the budget;
    /// callers must still call [`Parser::exit_depth`] exactly once for
    /// every call that returns `true`.
    fn enter_depth(&mut self, line: u32, column: u32) -> bool {
        if self.depth >= self.budget.max_depth {
            self.report_parser_error(line, column, "expression nested too deeply".to_string());
            false
        } else {
            self.depth += 1;
            true
        }
    }

    fn exit_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_parses_to_empty_program_with_no_diagnostics() {
        let analysis = analyze("");
        assert!(analysis.program.declarations.is_empty());
        assert!(analysis.diagnostics.is_empty());
        assert!(!analysis.hard_error);
    }

    #[test]
    fn undefined_reference_reports_single_error_at_identifier() {
        let analysis = analyze("print x;");
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].line, 0);
        assert_eq!(analysis.diagnostics[0].column, 6);
        assert_eq!(analysis.diagnostics[0].source, Source::Resolver);
    }

    #[test]
    fn shadowing_in_block_resolves_to_separate_definitions() {
        let source = "var x = 1;\n{ var x = 2; print x; }\nprint x;\n";
        let analysis = analyze(source);
        assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
        let defs: Vec<_> = analysis.symbol_map.definitions().collect();
        assert_eq!(defs.len(), 2);
    }

    #[test]
    fn global_redeclaration_is_a_warning_block_redeclaration_is_an_error() {
        // Each source also uses the name once so the "unused definition"
        // pass doesn't add a warning for the *newest* binding and mask
        // the assertion below; the shadowed, never-referenced-again
        // original binding still earns its own unused warning, which is
        // correct (see DESIGN.md's redeclaration open question).
        let globals = analyze("var a; var a; print a;");
        assert!(globals.diagnostics.iter().any(|d| d.severity == Severity::Warning && d.message.contains("already declared")));

        let block = analyze("{ var a; var a; print a; }");
        assert!(block.diagnostics.iter().any(|d| d.severity == Severity::Error && d.message.contains("already declared")));
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let analysis = analyze("return 1;");
        assert_eq!(analysis.diagnostics.len(), 1);
        assert!(analysis.diagnostics[0].message.to_lowercase().contains("return"));
    }

    #[test]
    fn go_to_definition_target_resolves_across_function_boundary() {
        let analysis = analyze("var y = 0;\nfun g() { return y; }\n");
        assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
        let def = analysis.symbol_map.definitions().next().unwrap();
        let tok = &analysis.tokens[def as usize];
        assert_eq!((tok.line, tok.column), (0, 4));
    }

    #[test]
    fn native_clock_resolves_without_a_symbol_map_entry() {
        let analysis = analyze("print clock();");
        assert!(analysis.diagnostics.is_empty(), "{:?}", analysis.diagnostics);
        assert_eq!(analysis.symbol_map.definitions().count(), 0);
    }

    #[test]
    fn parser_never_infinite_loops_on_malformed_input() {
        let analysis = analyze("fun ((( {{{ ===");
        assert_eq!(analysis.tokens.last().unwrap().kind, TokenKind::Eof);
        assert!(analysis.hard_error);
    }

    proptest::proptest! {
        #[test]
        fn parse_always_terminates_on_arbitrary_input(s in ".{0,300}") {
            let analysis = analyze(&s);
            proptest::prop_assert_eq!(analysis.tokens.last().unwrap().kind, TokenKind::Eof);
        }
    }
}
