//! Internal [`lox_diagnostic::Diagnostic`] → `lsp_types::Diagnostic`
//! translation and deduplication, per distilled spec §6 ("The server uses
//! 1 and 2" for severity) and §6's point-diagnostic range rule
//! (`start == end`).

use lox_diagnostic::{Diagnostic as InternalDiagnostic, Severity};
use lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};

/// Convert one internal diagnostic to its LSP form. The range is a point
/// (`start == end`) at the diagnostic's `(line, column)`, per distilled
/// spec §6.
pub fn to_lsp_diagnostic(diag: &InternalDiagnostic) -> Diagnostic {
    let position = Position { line: diag.line, character: diag.column };
    Diagnostic {
        range: Range { start: position, end: position },
        severity: Some(to_lsp_severity(diag.severity)),
        code: Some(NumberOrString::String(source_tag(diag.source).to_string())),
        code_description: None,
        source: Some("lox".to_string()),
        message: diag.message.clone(),
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Convert a batch of internal diagnostics to their LSP form, sorted by
/// position and deduplicated.
pub fn to_lsp_diagnostics(diagnostics: &[InternalDiagnostic]) -> Vec<Diagnostic> {
    let mut out: Vec<Diagnostic> = diagnostics.iter().map(to_lsp_diagnostic).collect();
    out.sort_by_key(|d| (d.range.start.line, d.range.start.character, d.severity));
    out.dedup_by(|a, b| {
        a.range == b.range && a.severity == b.severity && a.message == b.message
    });
    out
}

fn to_lsp_severity(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

fn source_tag(source: lox_diagnostic::Source) -> &'static str {
    match source {
        lox_diagnostic::Source::Scanner => "scanner",
        lox_diagnostic::Source::Parser => "parser",
        lox_diagnostic::Source::Resolver => "resolver",
    }
}
