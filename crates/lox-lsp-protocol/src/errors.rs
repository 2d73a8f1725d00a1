//! JSON-RPC error codes and request-parameter extraction helpers.
//!
//! Standard JSON-RPC 2.0 error codes. Distilled spec §4.5/§7 names exactly
//! one of these directly (`InvalidRequest`, for requests before
//! `initialize`); the rest are ambient JSON-RPC plumbing a dispatcher needs
//! regardless of what the spec calls out by name.

use super::jsonrpc::JsonRpcError;
use serde_json::Value;

/// Invalid JSON was received.
pub const PARSE_ERROR: i32 = -32700;

/// The JSON sent is not a valid Request object, or arrived before
/// `initialize`/after `shutdown` (distilled spec §4.5).
pub const INVALID_REQUEST: i32 = -32600;

/// The method does not exist or is not available.
pub const METHOD_NOT_FOUND: i32 = -32601;

/// Invalid method parameter(s).
pub const INVALID_PARAMS: i32 = -32602;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i32 = -32603;

/// A method-not-found error for `method`.
pub fn method_not_found(method: &str) -> JsonRpcError {
    JsonRpcError::new(METHOD_NOT_FOUND, format!("method not found: {method}"))
}

/// An invalid-request error, for requests arriving outside the
/// `initialized`/pre-`shutdown` window (distilled spec §4.5).
pub fn invalid_request(message: impl Into<String>) -> JsonRpcError {
    JsonRpcError::new(INVALID_REQUEST, message)
}

/// An invalid-params error.
pub fn invalid_params(message: impl Into<String>) -> JsonRpcError {
    JsonRpcError::new(INVALID_PARAMS, message)
}

/// An internal error, for the "catastrophic internal failure" path of
/// distilled spec §7.
pub fn internal_error(message: impl Into<String>) -> JsonRpcError {
    JsonRpcError::new(INTERNAL_ERROR, message)
}

/// Extract `textDocument.uri` from request params.
pub fn req_uri(params: &Value) -> Result<&str, JsonRpcError> {
    params
        .pointer("/textDocument/uri")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid_params("missing required parameter: textDocument.uri"))
}

/// Extract a 0-based `(line, character)` position from request params.
pub fn req_position(params: &Value) -> Result<(u32, u32), JsonRpcError> {
    let line = params
        .pointer("/position/line")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| invalid_params("missing required parameter: position.line"))?;
    let character = params
        .pointer("/position/character")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| invalid_params("missing required parameter: position.character"))?;
    let line = u32::try_from(line).map_err(|_| invalid_params("position.line exceeds u32::MAX"))?;
    let character =
        u32::try_from(character).map_err(|_| invalid_params("position.character exceeds u32::MAX"))?;
    Ok((line, character))
}

/// Extract the full text of the first item of `contentChanges` (the
/// document service only ever applies full-text sync, per distilled spec
/// §4.5's `textDocument/didChange` behavior).
pub fn req_full_text(params: &Value) -> Result<&str, JsonRpcError> {
    params
        .pointer("/contentChanges/0/text")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid_params("missing required parameter: contentChanges[0].text"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn req_uri_extracts_nested_field() {
        let params = json!({"textDocument": {"uri": "file:///a.lox"}});
        assert_eq!(req_uri(&params).unwrap(), "file:///a.lox");
    }

    #[test]
    fn req_uri_missing_is_invalid_params() {
        let params = json!({});
        assert_eq!(req_uri(&params).unwrap_err().code, INVALID_PARAMS);
    }

    #[test]
    fn req_position_extracts_both_fields() {
        let params = json!({"position": {"line": 3, "character": 7}});
        assert_eq!(req_position(&params).unwrap(), (3, 7));
    }

    #[test]
    fn req_full_text_extracts_first_change() {
        let params = json!({"contentChanges": [{"text": "var x;"}]});
        assert_eq!(req_full_text(&params).unwrap(), "var x;");
    }
}
