//! End-to-end tests driving the `lox-lsp` binary over its real stdio
//! transport: spawn the process, speak framed JSON-RPC at its stdin, read
//! framed responses/notifications back from its stdout. This is the only
//! way to exercise the reader-task/worker-task split of distilled spec §5
//! honestly — anything short of a real subprocess wouldn't be testing the
//! concurrency boundary at all.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{Value, json};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};
use tokio::time::{Duration, timeout};

struct Client {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Client {
    async fn spawn() -> Self {
        let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_lox-lsp"))
            .arg("--stdio")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn lox-lsp");
        let stdin = child.stdin.take().expect("child has stdin");
        let stdout = BufReader::new(child.stdout.take().expect("child has stdout"));
        Client { child, stdin, stdout }
    }

    async fn send(&mut self, value: Value) {
        let body = value.to_string();
        self.send_raw(&body).await;
    }

    /// Send a frame whose body is arbitrary bytes, not necessarily valid JSON.
    async fn send_raw(&mut self, body: &str) {
        let header = format!("Content-Length: {}\r\n\r\n", body.len());
        self.stdin.write_all(header.as_bytes()).await.expect("write header");
        self.stdin.write_all(body.as_bytes()).await.expect("write body");
        self.stdin.flush().await.expect("flush");
    }

    /// Read one framed JSON-RPC message (response or notification).
    async fn recv(&mut self) -> Value {
        timeout(Duration::from_secs(5), self.recv_inner()).await.expect("timed out waiting for a frame")
    }

    async fn recv_inner(&mut self) -> Value {
        let mut content_length = None;
        loop {
            let mut line = String::new();
            self.stdout.read_line(&mut line).await.expect("read header line");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some(value) = line.strip_prefix("Content-Length: ") {
                content_length = value.parse::<usize>().ok();
            }
        }
        let length = content_length.expect("frame had a Content-Length header");
        let mut buf = vec![0u8; length];
        self.stdout.read_exact(&mut buf).await.expect("read body");
        serde_json::from_slice(&buf).expect("body is valid JSON")
    }

    /// Read frames until one matching `pred` arrives (skips intervening
    /// notifications, e.g. an initial empty `publishDiagnostics`).
    async fn recv_until(&mut self, pred: impl Fn(&Value) -> bool) -> Value {
        loop {
            let msg = self.recv().await;
            if pred(&msg) {
                return msg;
            }
        }
    }

    async fn initialize(&mut self) {
        self.send(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"capabilities": {}}})).await;
        let resp = self.recv().await;
        assert_eq!(resp["id"], 1);
        assert!(resp["result"]["capabilities"].is_object());
        self.send(json!({"jsonrpc": "2.0", "method": "initialized", "params": {}})).await;
    }

    async fn did_open(&mut self, uri: &str, text: &str) {
        self.send(json!({
            "jsonrpc": "2.0",
            "method": "textDocument/didOpen",
            "params": {"textDocument": {"uri": uri, "languageId": "lox", "version": 1, "text": text}}
        }))
        .await;
    }

    async fn wait_for_diagnostics(&mut self, uri: &str) -> Value {
        self.recv_until(|m| m["method"] == "textDocument/publishDiagnostics" && m["params"]["uri"] == uri).await
    }

    async fn shutdown(&mut self) {
        self.send(json!({"jsonrpc": "2.0", "id": 99, "method": "shutdown", "params": null})).await;
        let resp = self.recv().await;
        assert_eq!(resp["id"], 99);
        self.send(json!({"jsonrpc": "2.0", "method": "exit", "params": null})).await;
        let _ = timeout(Duration::from_secs(5), self.child.wait()).await;
    }
}

#[tokio::test]
async fn requests_before_initialize_are_rejected() {
    let mut client = Client::spawn().await;
    client
        .send(json!({"jsonrpc": "2.0", "id": 1, "method": "textDocument/definition", "params": {}}))
        .await;
    let resp = client.recv().await;
    assert_eq!(resp["error"]["code"], -32600);
    client.child.kill().await.ok();
}

#[tokio::test]
async fn a_malformed_frame_is_dropped_and_the_server_keeps_serving_requests() {
    let mut client = Client::spawn().await;
    client.send_raw("not json at all").await;
    client.initialize().await;
    client.did_open("file:///after-garbage.lox", "print 1;").await;
    client.wait_for_diagnostics("file:///after-garbage.lox").await;
    client.shutdown().await;
}

#[tokio::test]
async fn undefined_reference_is_reported_as_a_diagnostic() {
    let mut client = Client::spawn().await;
    client.initialize().await;
    client.did_open("file:///undefined.lox", "print x;").await;

    let diagnostics = client.wait_for_diagnostics("file:///undefined.lox").await;
    let list = diagnostics["params"]["diagnostics"].as_array().expect("diagnostics array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["range"]["start"], json!({"line": 0, "character": 6}));

    client.shutdown().await;
}

#[tokio::test]
async fn definition_resolves_across_a_function_boundary() {
    let mut client = Client::spawn().await;
    client.initialize().await;
    let uri = "file:///scopes.lox";
    let source = "var y = 0;\nfun g() { return y; }\n";
    client.did_open(uri, source).await;
    client.wait_for_diagnostics(uri).await;

    client
        .send(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "textDocument/definition",
            "params": {"textDocument": {"uri": uri}, "position": {"line": 1, "character": 17}}
        }))
        .await;
    let resp = client.recv_until(|m| m["id"] == 2).await;
    assert_eq!(resp["result"]["range"]["start"], json!({"line": 0, "character": 4}));

    client.shutdown().await;
}

#[tokio::test]
async fn formatting_returns_a_single_whole_document_edit() {
    let mut client = Client::spawn().await;
    client.initialize().await;
    let uri = "file:///format.lox";
    client.did_open(uri, "fun  f( a,b ){ return a+b ; }").await;
    client.wait_for_diagnostics(uri).await;

    client
        .send(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "textDocument/formatting",
            "params": {"textDocument": {"uri": uri}}
        }))
        .await;
    let resp = client.recv_until(|m| m["id"] == 3).await;
    let edits = resp["result"].as_array().expect("edits array");
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0]["newText"], json!("fun f(a, b) {\n    return a + b;\n}\n"));

    client.shutdown().await;
}

#[tokio::test]
async fn semantic_tokens_match_the_expected_encoding_for_a_var_decl() {
    let mut client = Client::spawn().await;
    client.initialize().await;
    let uri = "file:///tokens.lox";
    client.did_open(uri, "var x = 1;").await;
    client.wait_for_diagnostics(uri).await;

    client
        .send(json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "textDocument/semanticTokens/full",
            "params": {"textDocument": {"uri": uri}}
        }))
        .await;
    let resp = client.recv_until(|m| m["id"] == 4).await;
    let data = resp["result"]["data"].as_array().expect("data array");
    // [0,0,3,<keyword>,0, 0,4,1,<variable>,0] — indices differ from the
    // distilled fixed legend since this server's legend carries ten token
    // types in a different order, but the deltas and lengths must match.
    assert_eq!(data[0], json!(0));
    assert_eq!(data[1], json!(0));
    assert_eq!(data[2], json!(3));
    assert_eq!(data[5], json!(0));
    assert_eq!(data[6], json!(4));
    assert_eq!(data[7], json!(1));

    client.shutdown().await;
}

#[tokio::test]
async fn completion_in_global_scope_offers_declared_names_and_keywords() {
    let mut client = Client::spawn().await;
    client.initialize().await;
    let uri = "file:///complete.lox";
    client.did_open(uri, "var x = 1;\nprint \n").await;
    client.wait_for_diagnostics(uri).await;

    client
        .send(json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "textDocument/completion",
            "params": {"textDocument": {"uri": uri}, "position": {"line": 1, "character": 6}}
        }))
        .await;
    let resp = client.recv_until(|m| m["id"] == 5).await;
    let items = resp["result"]["items"].as_array().expect("items array");
    let labels: Vec<&str> = items.iter().map(|i| i["label"].as_str().unwrap()).collect();
    assert!(labels.contains(&"x"));
    assert!(labels.contains(&"if"));

    client.shutdown().await;
}
