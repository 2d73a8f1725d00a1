//! `textDocument/semanticTokens/full` encoding, per distilled spec §4.3.
//!
//! Every identifier token is classified `variable`; every token in the
//! highlighted keyword set (`lox_ast::TokenKind::is_highlighted_keyword`)
//! is classified `keyword`. Everything else (literals, punctuation,
//! comments, trivia) is not emitted. The type indices are looked up
//! against [`lox_lsp_protocol::capabilities::semantic_tokens_legend`]
//! rather than hardcoded, so this encoder and the capability the server
//! advertises can never drift apart.

use lox_ast::TokenKind;
use lox_lsp_protocol::capabilities::semantic_tokens_legend;
use lox_parser::Analysis;
use lsp_types::SemanticTokenType;

/// One LSP semantic token in wire order:
/// `[deltaLine, deltaStartChar, length, tokenType, tokenModifiers]`.
pub type EncodedToken = [u32; 5];

fn legend_index(kind: SemanticTokenType) -> u32 {
    semantic_tokens_legend().token_types.iter().position(|t| *t == kind).map_or(0, |i| i as u32)
}

/// Encode every document identifier and highlighted keyword as a
/// relative-delta semantic token stream, ordered by source position.
pub fn semantic_tokens_for(analysis: &Analysis) -> Vec<EncodedToken> {
    let variable_type = legend_index(SemanticTokenType::VARIABLE);
    let keyword_type = legend_index(SemanticTokenType::KEYWORD);

    let mut out = Vec::new();
    let mut prev_line = 0u32;
    let mut prev_col = 0u32;

    for token in &analysis.tokens {
        let token_type = if token.kind == TokenKind::Identifier {
            variable_type
        } else if token.kind.is_highlighted_keyword() {
            keyword_type
        } else {
            continue;
        };

        let (delta_line, delta_col) = if token.line == prev_line {
            (0, token.column.saturating_sub(prev_col))
        } else {
            (token.line - prev_line, token.column)
        };

        out.push([delta_line, delta_col, token.length.max(1), token_type, 0]);
        prev_line = token.line;
        prev_col = token.column;
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use lox_parser::analyze;

    #[test]
    fn identifiers_and_keywords_are_emitted_others_are_not() {
        let analysis = analyze("var x = 1;\n");
        let tokens = semantic_tokens_for(&analysis);
        // "var" (keyword) and "x" (identifier); "=" and "1" and ";" are skipped.
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn first_token_delta_is_absolute_from_origin() {
        let analysis = analyze("var x = 1;\n");
        let tokens = semantic_tokens_for(&analysis);
        assert_eq!(tokens[0][0], 0);
        assert_eq!(tokens[0][1], 0);
    }

    #[test]
    fn same_line_delta_is_relative_to_previous_token_column() {
        let analysis = analyze("var x = 1;\n");
        let tokens = semantic_tokens_for(&analysis);
        // "var" at col 0, "x" at col 4: delta on the same line is 4.
        assert_eq!(tokens[1][1], 4);
    }

    #[test]
    fn cross_line_delta_resets_column_to_absolute() {
        let analysis = analyze("var x = 1;\nvar y = 2;\n");
        let tokens = semantic_tokens_for(&analysis);
        // Tokens: var(0,0) x(0,4) var(1,0) y(1,4).
        let second_line_var = tokens[2];
        assert_eq!(second_line_var[0], 1);
        assert_eq!(second_line_var[1], 0);
    }

    #[test]
    fn variable_and_keyword_use_distinct_type_indices() {
        let analysis = analyze("var x = 1;\n");
        let tokens = semantic_tokens_for(&analysis);
        assert_ne!(tokens[0][3], tokens[1][3]);
    }

    #[test]
    fn comments_and_literals_are_not_classified() {
        let analysis = analyze("// a comment\nprint 1;\n");
        let tokens = semantic_tokens_for(&analysis);
        // Only "print" (keyword) is emitted; comment and number literal are not.
        assert_eq!(tokens.len(), 1);
    }
}
