//! JSON-RPC envelope types, LSP method-name constants, and capability
//! advertisement for the Lox language server, per distilled spec §4.5/§6.
//!
//! This crate isolates protocol plumbing from the document service and
//! dispatch logic in `lox-lsp` so both can be exercised without a running
//! server.

pub mod capabilities;
pub mod errors;
mod jsonrpc;
pub mod methods;

pub use jsonrpc::{JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
