//! Server lifecycle state, per distilled spec §4.5: `{initialized,
//! shutdown, documents}`. `nextId` is the transport's concern (outgoing
//! request ids), not this crate's — the server only ever receives
//! requests and sends responses/notifications, it never originates a
//! request of its own.

use crate::document::DocumentStore;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct Server {
    initialized: AtomicBool,
    shutdown: AtomicBool,
    pub documents: DocumentStore,
}

impl Server {
    pub fn new() -> Self {
        Server { initialized: AtomicBool::new(false), shutdown: AtomicBool::new(false), documents: DocumentStore::new() }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn set_initialized(&self, value: bool) {
        self.initialized.store(value, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn set_shutdown(&self, value: bool) {
        self.shutdown.store(value, Ordering::SeqCst);
    }
}

impl Default for Server {
    fn default() -> Self {
        Server::new()
    }
}

/// Run the scanner+parser off the reader task and install the result,
/// per distilled spec §5. Returns the diagnostics to publish, or `None`
/// if a newer reparse already won the race and this one's install was
/// refused — in that case distilled spec §5 says the stale
/// `publishDiagnostics` is allowed to be dropped.
pub fn reparse(server: &Server, job: &crate::dispatch::ReparseJob) -> Option<Vec<lox_diagnostic::Diagnostic>> {
    let analysis = lox_parser::analyze(&job.text);
    let diagnostics = analysis.diagnostics.clone();

    if job.is_open {
        server.documents.open(&job.key, job.version, &job.text, analysis);
        return Some(diagnostics);
    }

    let handle = server.documents.handle(&job.key)?;
    if DocumentStore::install(&handle, job.version, &job.text, analysis) { Some(diagnostics) } else { None }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dispatch::ReparseJob;

    fn job(key: &str, version: i64, text: &str, is_open: bool) -> ReparseJob {
        ReparseJob { uri: key.to_string(), key: key.to_string(), version, text: text.to_string(), is_open }
    }

    #[test]
    fn lifecycle_flags_start_false() {
        let server = Server::new();
        assert!(!server.is_initialized());
        assert!(!server.is_shutdown());
    }

    #[test]
    fn lifecycle_flags_are_settable() {
        let server = Server::new();
        server.set_initialized(true);
        server.set_shutdown(true);
        assert!(server.is_initialized());
        assert!(server.is_shutdown());
    }

    #[test]
    fn an_open_job_installs_unconditionally_and_returns_diagnostics() {
        let server = Server::new();
        let diagnostics = reparse(&server, &job("file:///a.lox", 1, "print x;", true));
        assert_eq!(diagnostics.expect("should install").len(), 1);
        assert_eq!(server.documents.handle("file:///a.lox").expect("doc open").lock().version, 1);
    }

    #[test]
    fn a_change_job_against_an_unopened_document_is_dropped() {
        let server = Server::new();
        let result = reparse(&server, &job("file:///a.lox", 2, "var x;", false));
        assert!(result.is_none());
        assert!(server.documents.handle("file:///a.lox").is_none());
    }

    #[test]
    fn a_newer_change_job_replaces_the_open_analysis() {
        let server = Server::new();
        reparse(&server, &job("file:///a.lox", 1, "print x;", true));
        let diagnostics = reparse(&server, &job("file:///a.lox", 2, "var x; print x;", false));
        assert_eq!(diagnostics.expect("should install").len(), 0);
        assert_eq!(server.documents.handle("file:///a.lox").expect("doc open").lock().version, 2);
    }

    #[test]
    fn a_stale_change_job_is_dropped_and_reports_no_diagnostics() {
        let server = Server::new();
        reparse(&server, &job("file:///a.lox", 5, "var x;", true));
        let result = reparse(&server, &job("file:///a.lox", 3, "var y;", false));
        assert!(result.is_none());
        assert_eq!(server.documents.handle("file:///a.lox").expect("doc open").lock().version, 5);
    }
}
