//! Stdio message framing for the Lox language server, per distilled spec §6.
//!
//! ```no_run
//! # async fn run() -> std::io::Result<()> {
//! use tokio::io::{AsyncWriteExt, BufReader};
//! use lox_lsp_transport::{ReadOutcome, read_message, write_message};
//! use lox_lsp_protocol::JsonRpcResponse;
//!
//! let mut reader = BufReader::new(tokio::io::stdin());
//! let mut writer = tokio::io::stdout();
//!
//! if let ReadOutcome::Message(request) = read_message(&mut reader).await? {
//!     let response = JsonRpcResponse::null(request.id);
//!     write_message(&mut writer, &response).await?;
//!     writer.flush().await?;
//! }
//! # Ok(())
//! # }
//! ```

mod framing;

pub use framing::{ReadOutcome, read_message, write_message, write_notification};
