//! JSON-RPC request routing, per distilled spec §4.5.
//!
//! `handle_request` is synchronous and fast for every method except
//! `didOpen`/`didChange`, which only enqueue a reparse and return
//! immediately — the scanner/parser work itself happens on a spawned
//! task (see [`crate::server::Server::reparse`]), matching distilled spec
//! §5's "one dedicated reader task ... dispatches synchronously for small
//! requests" rule.

use crate::convert;
use crate::server::Server;
use lox_lsp_protocol::{errors, methods};
use lsp_types::{CompletionList, Location, SemanticTokens, TextEdit, Uri};
use serde_json::{Value, json};
use std::sync::Arc;

/// The outcome of dispatching one request: a response to send back (for
/// requests), or nothing (for notifications, or a `didOpen`/`didChange`
/// whose reparse has been handed off to a worker task).
pub enum Dispatched {
    Respond(lox_lsp_protocol::JsonRpcResponse),
    NoResponse,
}

/// Route one incoming JSON-RPC envelope. `server` carries the lifecycle
/// flags and document store; reparse work for `didOpen`/`didChange` is
/// spawned onto `server`'s runtime by the caller once this returns
/// [`ReparseJob`], keeping this function itself synchronous.
pub struct RoutedRequest {
    pub response: Dispatched,
    pub reparse: Option<ReparseJob>,
}

/// A reparse to perform off the reader task: the URI/version/text to
/// analyze, handed back to `main` so it can `tokio::spawn` the actual
/// scanner+parser work (this crate doesn't spawn directly, keeping
/// `dispatch` testable without a runtime).
pub struct ReparseJob {
    /// The URI as the client sent it, echoed back in `publishDiagnostics`.
    pub uri: String,
    /// The normalized document-map key ([`lox_uri::normalize_key`]).
    pub key: String,
    pub version: i64,
    pub text: String,
    pub is_open: bool,
}

pub fn handle_request(server: &Arc<Server>, request: lox_lsp_protocol::JsonRpcRequest) -> RoutedRequest {
    let id = request.id.clone();
    let method = request.method.as_str();
    let params = request.params.unwrap_or(Value::Null);

    if method == methods::CANCEL_REQUEST {
        return RoutedRequest { response: Dispatched::NoResponse, reparse: None };
    }

    if !server.is_initialized() && !methods::is_pre_initialize_allowed(method) {
        let err = errors::invalid_request(format!("request '{method}' arrived before initialize"));
        return respond(id, Err(err));
    }

    if server.is_shutdown() && method != methods::EXIT {
        let err = errors::invalid_request("server has received shutdown; only exit is valid now");
        return respond(id, Err(err));
    }

    match method {
        methods::INITIALIZE => {
            server.set_initialized(true);
            let result = json!({ "capabilities": lox_lsp_protocol::capabilities::capabilities() });
            respond(id, Ok(result))
        }
        methods::INITIALIZED => RoutedRequest { response: Dispatched::NoResponse, reparse: None },
        methods::SHUTDOWN => {
            server.set_shutdown(true);
            respond(id, Ok(Value::Null))
        }
        methods::EXIT => {
            std::process::exit(if server.is_shutdown() { 0 } else { 1 });
        }
        methods::TEXT_DOCUMENT_DID_OPEN => handle_did_open(&params),
        methods::TEXT_DOCUMENT_DID_CHANGE => handle_did_change(&params),
        methods::TEXT_DOCUMENT_DID_CLOSE => {
            if let Ok(uri) = errors::req_uri(&params) {
                server.documents.close(&lox_uri::normalize_key(uri));
            }
            RoutedRequest { response: Dispatched::NoResponse, reparse: None }
        }
        methods::TEXT_DOCUMENT_DEFINITION => respond(id, handle_definition(server, &params)),
        methods::TEXT_DOCUMENT_REFERENCES => respond(id, handle_references(server, &params)),
        methods::TEXT_DOCUMENT_FORMATTING => respond(id, handle_formatting(server, &params)),
        methods::TEXT_DOCUMENT_COMPLETION => respond(id, handle_completion(server, &params)),
        methods::TEXT_DOCUMENT_SEMANTIC_TOKENS_FULL => respond(id, handle_semantic_tokens(server, &params)),
        _ => respond(id, Err(errors::method_not_found(method))),
    }
}

fn respond(id: Option<Value>, result: Result<Value, lox_lsp_protocol::JsonRpcError>) -> RoutedRequest {
    let response = match result {
        Ok(value) => lox_lsp_protocol::JsonRpcResponse::success(id, value),
        Err(e) => lox_lsp_protocol::JsonRpcResponse::error(id, e),
    };
    RoutedRequest { response: Dispatched::Respond(response), reparse: None }
}

fn handle_did_open(params: &Value) -> RoutedRequest {
    let uri = params.pointer("/textDocument/uri").and_then(|v| v.as_str());
    let text = params.pointer("/textDocument/text").and_then(|v| v.as_str());
    let version = params.pointer("/textDocument/version").and_then(|v| v.as_i64()).unwrap_or(0);
    let reparse = match (uri, text) {
        (Some(uri), Some(text)) => Some(ReparseJob {
            key: lox_uri::normalize_key(uri),
            uri: uri.to_string(),
            version,
            text: text.to_string(),
            is_open: true,
        }),
        _ => None,
    };
    RoutedRequest { response: Dispatched::NoResponse, reparse }
}

fn handle_did_change(params: &Value) -> RoutedRequest {
    let uri = params.pointer("/textDocument/uri").and_then(|v| v.as_str());
    let version = params.pointer("/textDocument/version").and_then(|v| v.as_i64()).unwrap_or(0);
    let text = errors::req_full_text(params).ok();
    let reparse = match (uri, text) {
        (Some(uri), Some(text)) => Some(ReparseJob {
            key: lox_uri::normalize_key(uri),
            uri: uri.to_string(),
            version,
            text: text.to_string(),
            is_open: false,
        }),
        _ => None,
    };
    RoutedRequest { response: Dispatched::NoResponse, reparse }
}

fn handle_definition(server: &Server, params: &Value) -> Result<Value, lox_lsp_protocol::JsonRpcError> {
    let uri = errors::req_uri(params)?;
    let (wire_line, wire_col) = errors::req_position(params)?;
    let Some(handle) = server.documents.handle(&lox_uri::normalize_key(uri)) else {
        return Ok(Value::Null);
    };
    let doc = handle.lock();
    let (line, col) = convert::position_from_wire(&doc.line_index, wire_line, wire_col);
    let Some(span) = lox_navigation::find_definition(&doc.analysis, line, col) else {
        return Ok(Value::Null);
    };
    let url = parse_uri(uri)?;
    let location: Location = convert::span_to_location(&doc.line_index, url, &span);
    Ok(serde_json::to_value(location).unwrap_or(Value::Null))
}

fn handle_references(server: &Server, params: &Value) -> Result<Value, lox_lsp_protocol::JsonRpcError> {
    let uri = errors::req_uri(params)?;
    let (wire_line, wire_col) = errors::req_position(params)?;
    let include_declaration = params.pointer("/context/includeDeclaration").and_then(|v| v.as_bool()).unwrap_or(false);
    let Some(handle) = server.documents.handle(&lox_uri::normalize_key(uri)) else {
        return Ok(Value::Array(vec![]));
    };
    let doc = handle.lock();
    let (line, col) = convert::position_from_wire(&doc.line_index, wire_line, wire_col);
    let spans = lox_navigation::find_references(&doc.analysis, line, col, include_declaration);
    let url = parse_uri(uri)?;
    let locations: Vec<Location> = spans.iter().map(|s| convert::span_to_location(&doc.line_index, url.clone(), s)).collect();
    Ok(serde_json::to_value(locations).unwrap_or(Value::Null))
}

fn handle_formatting(server: &Server, params: &Value) -> Result<Value, lox_lsp_protocol::JsonRpcError> {
    let uri = errors::req_uri(params)?;
    let Some(handle) = server.documents.handle(&lox_uri::normalize_key(uri)) else {
        return Ok(Value::Array(vec![]));
    };
    let doc = handle.lock();
    if doc.analysis.hard_error {
        return Ok(Value::Array(vec![]));
    }
    let formatted = lox_formatter::format(&doc.analysis.tokens, &doc.analysis.program);
    let eof = doc.analysis.tokens.last();
    let (eof_line, eof_col) = eof.map(|t| (t.line, t.column)).unwrap_or((0, 0));
    let edit: TextEdit = convert::whole_document_edit(&doc.line_index, eof_line, eof_col, formatted);
    Ok(serde_json::to_value(vec![edit]).unwrap_or(Value::Null))
}

fn handle_completion(server: &Server, params: &Value) -> Result<Value, lox_lsp_protocol::JsonRpcError> {
    let uri = errors::req_uri(params)?;
    let (wire_line, wire_col) = errors::req_position(params)?;
    let Some(handle) = server.documents.handle(&lox_uri::normalize_key(uri)) else {
        return Ok(serde_json::to_value(empty_completion_list()).unwrap_or(Value::Null));
    };
    let doc = handle.lock();
    let (line, col) = convert::position_from_wire(&doc.line_index, wire_line, wire_col);
    let items = lox_completion::completion_at(&doc.analysis, line, col);
    let list = CompletionList { is_incomplete: true, items: items.iter().map(convert::completion_item).collect() };
    Ok(serde_json::to_value(list).unwrap_or(Value::Null))
}

fn empty_completion_list() -> CompletionList {
    CompletionList { is_incomplete: true, items: vec![] }
}

fn handle_semantic_tokens(server: &Server, params: &Value) -> Result<Value, lox_lsp_protocol::JsonRpcError> {
    let uri = errors::req_uri(params)?;
    let Some(handle) = server.documents.handle(&lox_uri::normalize_key(uri)) else {
        return Ok(Value::Null);
    };
    let doc = handle.lock();
    let encoded = lox_semantic_tokens::semantic_tokens_for(&doc.analysis);
    let data: Vec<lsp_types::SemanticToken> = encoded
        .into_iter()
        .map(|[delta_line, delta_start, length, token_type, token_modifiers_bitset]| lsp_types::SemanticToken {
            delta_line,
            delta_start,
            length,
            token_type,
            token_modifiers_bitset,
        })
        .collect();
    let tokens = SemanticTokens { result_id: None, data };
    Ok(serde_json::to_value(tokens).unwrap_or(Value::Null))
}

fn parse_uri(uri: &str) -> Result<Uri, lox_lsp_protocol::JsonRpcError> {
    uri.parse::<Uri>().map_err(|_| errors::invalid_params(format!("not a valid URI: {uri}")))
}
