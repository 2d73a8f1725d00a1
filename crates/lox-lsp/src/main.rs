//! Lox Language Server binary.
//!
//! Usage:
//!   lox-lsp [options]
//!
//! Options:
//!   --stdio      Use stdio for communication (default, and only supported mode)
//!   --log        Enable verbose logging to stderr
//!   --version    Show version information
//!   --help       Show this help message

mod convert;
mod dispatch;
mod document;
mod server;

use dispatch::{Dispatched, RoutedRequest};
use lox_lsp_protocol::{JsonRpcNotification, JsonRpcResponse, methods};
use lox_lsp_transport::ReadOutcome;
use server::Server;
use std::env;
use std::process;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::Mutex as AsyncMutex;

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut enable_logging = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--stdio" => {}
            "--log" => enable_logging = true,
            "--version" => {
                println!("lox-lsp {}", env!("CARGO_PKG_VERSION"));
                println!("Git tag: {}", env!("GIT_TAG"));
                process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if enable_logging {
        tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_io().enable_time().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            process::exit(1);
        }
    };

    runtime.block_on(run_stdio());
}

fn print_help() {
    eprintln!("Lox Language Server");
    eprintln!();
    eprintln!("Usage: lox-lsp [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --stdio      Use stdio for communication (default)");
    eprintln!("  --log        Enable logging to stderr");
    eprintln!("  --version    Show version information");
    eprintln!("  --help       Show this help message");
}

/// One dedicated reader task consuming the transport, per distilled spec
/// §5. Small requests (lifecycle, queries) are dispatched synchronously
/// inline; `didOpen`/`didChange` spawn a worker task for the scanner+parser
/// work and return to reading the next frame immediately. Writers
/// serialize through `writer`'s mutex so response and notification frames
/// are never interleaved.
async fn run_stdio() {
    let server = Arc::new(Server::new());
    let writer = Arc::new(AsyncMutex::new(tokio::io::stdout()));
    let mut reader = BufReader::new(tokio::io::stdin());

    loop {
        let request = match lox_lsp_transport::read_message(&mut reader).await {
            Ok(ReadOutcome::Message(request)) => request,
            Ok(ReadOutcome::Dropped) => continue,
            Ok(ReadOutcome::Eof) => break,
            Err(e) => {
                tracing::error!(error = %e, "transport read failed");
                break;
            }
        };

        let method = request.method.clone();
        let RoutedRequest { response, reparse } = dispatch::handle_request(&server, request);

        if let Dispatched::Respond(response) = response {
            let is_error = response.error.is_some();
            send_response(&writer, response).await;
            if !is_error && method == methods::INITIALIZE {
                log_message(&writer, 4, "lox-lsp ready").await;
            }
            if !is_error && method == methods::SHUTDOWN {
                log_message(&writer, 4, "lox-lsp shutting down").await;
            }
        }

        if let Some(job) = reparse {
            let server = Arc::clone(&server);
            let writer = Arc::clone(&writer);
            tokio::spawn(async move {
                let uri = job.uri.clone();
                let version = job.version;
                match tokio::task::spawn_blocking(move || server::reparse(&server, &job)).await {
                    Ok(Some(diagnostics)) => publish_diagnostics(&writer, &uri, version, &diagnostics).await,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(error = %e, uri = %uri, "reparse worker task failed");
                        log_message(&writer, 1, &format!("internal error reparsing {uri}: {e}")).await;
                    }
                }
            });
        }
    }
}

/// `window/logMessage`, per distilled spec §4.5's supplement: startup
/// readiness, shutdown, and catastrophic internal failures get a
/// client-visible counterpart to the `tracing` event logged alongside
/// them. `typ` follows the LSP `MessageType` numbering (1 = error, 4 = log).
async fn log_message(writer: &Arc<AsyncMutex<tokio::io::Stdout>>, typ: i32, message: &str) {
    let params = serde_json::json!({ "type": typ, "message": message });
    let notification = JsonRpcNotification::new(methods::WINDOW_LOG_MESSAGE, params);
    let mut writer = writer.lock().await;
    if let Err(e) = lox_lsp_transport::write_notification(&mut *writer, &notification).await {
        tracing::error!(error = %e, "failed to write window/logMessage frame");
    }
}

async fn send_response(writer: &Arc<AsyncMutex<tokio::io::Stdout>>, response: JsonRpcResponse) {
    let mut writer = writer.lock().await;
    if let Err(e) = lox_lsp_transport::write_message(&mut *writer, &response).await {
        tracing::error!(error = %e, "failed to write response frame");
    }
}

async fn publish_diagnostics(
    writer: &Arc<AsyncMutex<tokio::io::Stdout>>,
    uri: &str,
    version: i64,
    diagnostics: &[lox_diagnostic::Diagnostic],
) {
    let lsp_diagnostics = lox_lsp_diagnostics::to_lsp_diagnostics(diagnostics);
    let params = serde_json::json!({
        "uri": uri,
        "version": version,
        "diagnostics": lsp_diagnostics,
    });
    let notification = JsonRpcNotification::new(methods::TEXT_DOCUMENT_PUBLISH_DIAGNOSTICS, params);
    let mut writer = writer.lock().await;
    if let Err(e) = lox_lsp_transport::write_notification(&mut *writer, &notification).await {
        tracing::error!(error = %e, "failed to write publishDiagnostics frame");
    }
}
