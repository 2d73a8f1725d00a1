//! JSON-RPC 2.0 message types.
//!
//! Core request, response, and error types for JSON-RPC communication, per
//! distilled spec §6.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An incoming request or notification from the client. `id` is `None`
/// for notifications.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0").
    #[serde(rename = "jsonrpc")]
    pub _jsonrpc: String,
    /// Request identifier, absent for notifications.
    pub id: Option<Value>,
    /// Method name to invoke.
    pub method: String,
    /// Method parameters.
    pub params: Option<Value>,
}

/// An outgoing response to the client. Either `result` or `error` is set,
/// never both.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Matches the originating request's id.
    pub id: Option<Value>,
    /// Success result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// A success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(result), error: None }
    }

    /// An error response.
    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: None, error: Some(error) }
    }

    /// A null-result response, for requests with nothing meaningful to
    /// return (e.g. `shutdown`).
    pub fn null(id: Option<Value>) -> Self {
        Self { jsonrpc: "2.0".to_string(), id, result: Some(Value::Null), error: None }
    }
}

/// An outgoing notification (no `id`, no response expected) — used for
/// `textDocument/publishDiagnostics` and `window/logMessage`.
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Method name.
    pub method: String,
    /// Notification parameters.
    pub params: Value,
}

impl JsonRpcNotification {
    /// A new notification envelope.
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), method: method.into(), params }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Serialize, Clone)]
pub struct JsonRpcError {
    /// Error code, per the standard JSON-RPC/LSP ranges in [`crate::errors`].
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Additional structured data.
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// A new error with no extra data.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_response_omits_error_field() {
        let resp = JsonRpcResponse::success(Some(Value::from(1)), Value::from("ok"));
        let json = serde_json::to_value(&resp).unwrap_or_default();
        assert!(json.get("error").is_none());
        assert_eq!(json["result"], "ok");
    }

    #[test]
    fn error_response_omits_result_field() {
        let resp = JsonRpcResponse::error(Some(Value::from(1)), JsonRpcError::new(-32600, "bad"));
        let json = serde_json::to_value(&resp).unwrap_or_default();
        assert!(json.get("result").is_none());
        assert_eq!(json["error"]["code"], -32600);
    }
}
