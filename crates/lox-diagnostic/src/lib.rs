//! Diagnostic types and parse-budget tracking for the Lox analyzer.
//!
//! A single [`Diagnostic`] shape is shared by the scanner, the parser, and
//! the resolver so the document service can collect them into one ordered
//! list per reparse without caring which stage produced a given entry.

use thiserror::Error;

/// Severity of a diagnostic, restricted to the two levels this analyzer
/// ever emits (LSP numeric codes 1 and 2; `Info`/`Hint` exist for callers
/// that map into the full LSP range but are never constructed here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// LSP severity 1 — a hard error from the scanner/parser, or a
    /// resolver error (redeclaration in a non-global scope, unresolved
    /// name, invalid context for `return`/`this`/`super`, >255 arguments,
    /// invalid assignment target).
    Error,
    /// LSP severity 2 — a resolver warning (global redeclaration, unused
    /// definition).
    Warning,
    /// LSP severity 3. Never emitted by this analyzer; kept for callers
    /// that need the full LSP severity range.
    Info,
    /// LSP severity 4. Never emitted by this analyzer.
    Hint,
}

impl Severity {
    /// The LSP numeric severity code.
    pub const fn lsp_code(self) -> u8 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// Which stage of the pipeline produced a diagnostic.
///
/// `hardErrorFlag` (distilled spec §4.3) is true iff any diagnostic has
/// `Source::Scanner` or `Source::Parser` — those indicate the AST may be
/// structurally incomplete, unlike resolver diagnostics which are layered
/// on top of a structurally sound tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Unexpected character, unterminated string.
    Scanner,
    /// Missing expected token, unexpected EOF, unexpected token.
    Parser,
    /// Unresolved name, redeclaration, bad return/this/super context,
    /// too many call arguments, invalid assignment target, unused
    /// definition.
    Resolver,
}

impl Source {
    /// Whether diagnostics from this source should set `hardErrorFlag`.
    pub const fn is_hard(self) -> bool {
        matches!(self, Source::Scanner | Source::Parser)
    }
}

/// A single diagnostic anchored at a 0-based `(line, column)` position.
///
/// The document service emits diagnostics as point ranges
/// (`start == end`), per distilled spec §6, so only a single position is
/// carried rather than a span.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 0-based line.
    pub line: u32,
    /// 0-based column.
    pub column: u32,
    /// Human-readable message.
    pub message: String,
    /// Error or warning.
    pub severity: Severity,
    /// Which pipeline stage raised this diagnostic.
    pub source: Source,
}

impl Diagnostic {
    /// Construct a new diagnostic.
    pub fn new(line: u32, column: u32, message: impl Into<String>, severity: Severity, source: Source) -> Self {
        Diagnostic { line, column, message: message.into(), severity, source }
    }

    /// Convenience constructor for a scanner/parser error.
    pub fn error(line: u32, column: u32, message: impl Into<String>, source: Source) -> Self {
        Diagnostic::new(line, column, message, Severity::Error, source)
    }

    /// Convenience constructor for a resolver warning.
    pub fn warning(line: u32, column: u32, message: impl Into<String>) -> Self {
        Diagnostic::new(line, column, message, Severity::Warning, Source::Resolver)
    }
}

/// Budget limits bounding parser work so malformed or adversarial input
/// cannot hang or overflow the stack.
///
/// Exceeding `max_depth` unwinds to the nearest statement boundary with a
/// single diagnostic rather than recursing further; exceeding `max_errors`
/// stops emitting new diagnostics (panic mode remains in effect but no
/// further entries are appended) so a single malformed file cannot flood
/// `publishDiagnostics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBudget {
    /// Maximum recursive-descent nesting depth.
    pub max_depth: usize,
    /// Maximum diagnostics collected per reparse.
    pub max_errors: usize,
}

impl Default for ParseBudget {
    fn default() -> Self {
        ParseBudget::for_ide()
    }
}

impl ParseBudget {
    /// Generous limits appropriate for interactive editing.
    pub fn for_ide() -> Self {
        ParseBudget { max_depth: 256, max_errors: 500 }
    }
}

/// Tracks how much of a [`ParseBudget`] has been consumed during one parse.
#[derive(Debug, Clone, Default)]
pub struct BudgetTracker {
    current_depth: usize,
    errors_emitted: usize,
}

impl BudgetTracker {
    /// Create a fresh tracker.
    pub fn new() -> Self {
        BudgetTracker::default()
    }

    /// Enter one level of recursive descent; `Err` if the budget's
    /// `max_depth` would be exceeded.
    pub fn enter(&mut self, budget: &ParseBudget) -> Result<DepthGuard<'_>, BudgetExceeded> {
        if self.current_depth >= budget.max_depth {
            return Err(BudgetExceeded::Depth);
        }
        self.current_depth += 1;
        Ok(DepthGuard { tracker: self })
    }

    /// Record a diagnostic emission; returns whether the caller should
    /// still append it (budget not yet exhausted).
    pub fn record_error(&mut self, budget: &ParseBudget) -> bool {
        if self.errors_emitted >= budget.max_errors {
            return false;
        }
        self.errors_emitted += 1;
        true
    }
}

/// RAII guard decrementing [`BudgetTracker`]'s depth counter on drop.
pub struct DepthGuard<'a> {
    tracker: &'a mut BudgetTracker,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.tracker.current_depth = self.tracker.current_depth.saturating_sub(1);
    }
}

/// Reasons a [`BudgetTracker`] can refuse further work.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BudgetExceeded {
    /// Recursive-descent nesting depth limit reached.
    #[error("expression nested too deeply")]
    Depth,
}
