//! LSP method name constants.
//!
//! Centralizes the method identifiers the dispatch table in `lox-lsp`
//! routes on. Limited to the request table distilled spec §4.5 names,
//! plus the ambient notifications (`publishDiagnostics`, `logMessage`)
//! and `$/cancelRequest` that the concurrency model (§5) and error
//! handling design (§7) call for.

// ============================================================================
// Lifecycle
// ============================================================================

/// First request from client to server.
pub const INITIALIZE: &str = "initialize";

/// Notification sent after the `initialize` response.
pub const INITIALIZED: &str = "initialized";

/// Graceful server shutdown request.
pub const SHUTDOWN: &str = "shutdown";

/// Terminate server process notification.
pub const EXIT: &str = "exit";

// ============================================================================
// Text Document Synchronization
// ============================================================================

/// Document opened notification.
pub const TEXT_DOCUMENT_DID_OPEN: &str = "textDocument/didOpen";

/// Document changed notification.
pub const TEXT_DOCUMENT_DID_CHANGE: &str = "textDocument/didChange";

/// Document closed notification.
pub const TEXT_DOCUMENT_DID_CLOSE: &str = "textDocument/didClose";

/// Publish diagnostics notification (server to client).
pub const TEXT_DOCUMENT_PUBLISH_DIAGNOSTICS: &str = "textDocument/publishDiagnostics";

// ============================================================================
// Language Features
// ============================================================================

/// Go to definition request.
pub const TEXT_DOCUMENT_DEFINITION: &str = "textDocument/definition";

/// Find references request.
pub const TEXT_DOCUMENT_REFERENCES: &str = "textDocument/references";

/// Document formatting request.
pub const TEXT_DOCUMENT_FORMATTING: &str = "textDocument/formatting";

/// Code completion request.
pub const TEXT_DOCUMENT_COMPLETION: &str = "textDocument/completion";

/// Semantic tokens full document request.
pub const TEXT_DOCUMENT_SEMANTIC_TOKENS_FULL: &str = "textDocument/semanticTokens/full";

// ============================================================================
// Window / Cancellation
// ============================================================================

/// Log message notification (server to client).
pub const WINDOW_LOG_MESSAGE: &str = "window/logMessage";

/// Cancel request notification. Accepted and ignored per distilled spec §5.
pub const CANCEL_REQUEST: &str = "$/cancelRequest";

/// Every method the dispatcher is allowed to see before `initialize`
/// completes, per distilled spec §4.5 ("Any request arriving before
/// `initialize` ... must return error `-32600`").
pub fn is_pre_initialize_allowed(method: &str) -> bool {
    matches!(method, INITIALIZE | EXIT)
}
