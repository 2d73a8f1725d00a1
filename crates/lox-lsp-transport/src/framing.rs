//! `Content-Length: N\r\n\r\n<N bytes of UTF-8 JSON>` message framing over
//! the LSP Base Protocol, per distilled spec §6.
//!
//! The reader is stream-based and async (`tokio::io::AsyncBufRead`): it
//! accumulates header lines until a blank line, reads exactly
//! `Content-Length` bytes of body, and yields one message. Multiple
//! messages arriving in one read are handled by the caller driving
//! [`read_message`] in a loop — each call consumes exactly one frame.

use lox_lsp_protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use std::collections::HashMap;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// The result of reading one frame.
///
/// A clean EOF and a dropped malformed frame are deliberately distinct
/// variants — collapsing them (as a bare `Option` would) makes a run loop
/// that does `None => break` exit the whole server process on the first
/// malformed frame, which is not what distilled spec §7's "logged ... the
/// server does not crash" calls for.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A complete, well-formed request or notification.
    Message(JsonRpcRequest),
    /// A frame was dropped (bad `Content-Length` header or a body that
    /// failed to deserialize). The caller should read the next frame.
    Dropped,
    /// The client closed the pipe. The caller should stop reading.
    Eof,
}

/// Read one framed message from `reader`.
///
/// Returns [`ReadOutcome::Eof`] only on a clean EOF (the client closed the
/// pipe) and [`ReadOutcome::Dropped`] for a frame whose `Content-Length`
/// header is missing/invalid or whose body fails to deserialize as a
/// [`JsonRpcRequest`] — a malformed envelope has no request `id` to
/// construct a matching error response around, so the only recoverable
/// move is to drop the frame and keep reading. Returns `Err` only for I/O
/// failures on the transport itself.
pub async fn read_message<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<ReadOutcome> {
    let mut headers = HashMap::new();

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(": ") {
            headers.insert(key.to_string(), value.to_string());
        }
    }

    let Some(length) = headers.get("Content-Length").and_then(|v| v.parse::<usize>().ok()) else {
        tracing::warn!("frame missing a valid Content-Length header");
        return Ok(ReadOutcome::Dropped);
    };

    let mut content = vec![0u8; length];
    reader.read_exact(&mut content).await?;

    match serde_json::from_slice(&content) {
        Ok(request) => Ok(ReadOutcome::Message(request)),
        Err(e) => {
            tracing::warn!(error = %e, "dropping malformed JSON-RPC frame");
            Ok(ReadOutcome::Dropped)
        }
    }
}

/// Write a framed response.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, response: &JsonRpcResponse) -> io::Result<()> {
    let body = serde_json::to_string(response)?;
    write_frame(writer, &body).await
}

/// Write a framed notification (`publishDiagnostics`, `logMessage`).
pub async fn write_notification<W: AsyncWrite + Unpin>(
    writer: &mut W,
    notification: &JsonRpcNotification,
) -> io::Result<()> {
    let body = serde_json::to_string(notification)?;
    write_frame(writer, &body).await
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, body: &str) -> io::Result<()> {
    let header = format!("Content-Length: {}\r\n\r\n", body.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(body: &str) -> Vec<u8> {
        format!("Content-Length: {}\r\n\r\n{}", body.len(), body).into_bytes()
    }

    fn unwrap_message(outcome: ReadOutcome) -> JsonRpcRequest {
        match outcome {
            ReadOutcome::Message(request) => Some(request),
            _ => None,
        }
        .expect("expected a message")
    }

    #[tokio::test]
    async fn reads_a_single_framed_request() {
        let body = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}).to_string();
        let framed = frame(&body);
        let mut reader = framed.as_slice();
        let req = unwrap_message(read_message(&mut reader).await.unwrap());
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, Some(json!(1)));
    }

    #[tokio::test]
    async fn reads_two_frames_back_to_back() {
        let first = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}).to_string();
        let second = json!({"jsonrpc": "2.0", "method": "initialized", "params": {}}).to_string();
        let mut bytes = frame(&first);
        bytes.extend(frame(&second));
        let mut reader = bytes.as_slice();
        let req1 = unwrap_message(read_message(&mut reader).await.unwrap());
        assert_eq!(req1.method, "initialize");
        let req2 = unwrap_message(read_message(&mut reader).await.unwrap());
        assert_eq!(req2.method, "initialized");
        assert_eq!(req2.id, None);
    }

    #[tokio::test]
    async fn clean_eof_is_distinguished_from_a_dropped_frame() {
        let mut reader: &[u8] = &[];
        assert!(matches!(read_message(&mut reader).await.unwrap(), ReadOutcome::Eof));
    }

    #[tokio::test]
    async fn malformed_json_body_is_dropped_not_errored() {
        let framed = frame("not json");
        let mut reader = framed.as_slice();
        assert!(matches!(read_message(&mut reader).await.unwrap(), ReadOutcome::Dropped));
    }

    #[tokio::test]
    async fn missing_content_length_header_is_dropped_not_errored() {
        let mut reader = b"X-Bogus: 1\r\n\r\n".as_slice();
        assert!(matches!(read_message(&mut reader).await.unwrap(), ReadOutcome::Dropped));
    }

    #[tokio::test]
    async fn a_dropped_frame_does_not_block_reading_the_next_one() {
        let valid = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}).to_string();
        let mut bytes = frame("not json");
        bytes.extend(frame(&valid));
        let mut reader = bytes.as_slice();
        assert!(matches!(read_message(&mut reader).await.unwrap(), ReadOutcome::Dropped));
        let req = unwrap_message(read_message(&mut reader).await.unwrap());
        assert_eq!(req.method, "initialize");
    }

    #[tokio::test]
    async fn write_message_produces_correctly_framed_bytes() {
        let response = JsonRpcResponse::null(Some(json!(1)));
        let mut out = Vec::new();
        write_message(&mut out, &response).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let (header, body) = text.split_once("\r\n\r\n").unwrap();
        assert!(header.starts_with("Content-Length: "));
        let declared: usize = header.trim_start_matches("Content-Length: ").parse().unwrap();
        assert_eq!(declared, body.len());
    }
}
