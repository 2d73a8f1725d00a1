//! Per-URI analysis cache, per distilled spec §4.3.
//!
//! A `Document` wraps a single [`Analysis`] behind the version it was
//! computed against. There is no rope or incremental-edit bookkeeping here
//! — distilled spec §1's non-goals rule out incremental reparse, so every
//! `didChange` re-runs the whole pipeline over the full buffer text the
//! client sends, and the previous analysis is simply replaced.

use lox_parser::Analysis;
use lox_position::LineIndex;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// One open document's cached analysis, guarded by its own lock so a
/// query against document A never blocks a reparse of document B.
///
/// `line_index` is built from the same snapshot `analysis` was parsed
/// from, so the two are always in sync — wire positions (UTF-16) are
/// converted against the buffer they describe, never a stale one.
pub struct Document {
    pub version: i64,
    pub analysis: Analysis,
    pub line_index: LineIndex,
}

impl Document {
    fn new(version: i64, text: &str, analysis: Analysis) -> Self {
        Document { version, analysis, line_index: LineIndex::new(text) }
    }
}

/// The coarse-locked `map<URI, DocumentService>` of distilled spec §4.5,
/// plus the fine-grained per-document lock distilled spec §5 calls for.
#[derive(Default)]
pub struct DocumentStore {
    documents: Mutex<HashMap<String, Arc<Mutex<Document>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        DocumentStore::default()
    }

    /// Open (or reopen) a URI, installing its first analysis unconditionally.
    pub fn open(&self, uri: &str, version: i64, text: &str, analysis: Analysis) {
        let doc = Arc::new(Mutex::new(Document::new(version, text, analysis)));
        self.documents.lock().insert(uri.to_string(), doc);
    }

    /// Fetch the per-document handle to install a later reparse against,
    /// or read under, without holding the coarse map lock for the
    /// duration of either operation.
    pub fn handle(&self, uri: &str) -> Option<Arc<Mutex<Document>>> {
        self.documents.lock().get(uri).cloned()
    }

    /// Install a reparse result, refusing to overwrite a newer version
    /// already installed (distilled spec §5's ordering guarantee — older
    /// reparse tasks must not clobber newer ones).
    pub fn install(handle: &Arc<Mutex<Document>>, version: i64, text: &str, analysis: Analysis) -> bool {
        let mut doc = handle.lock();
        if version < doc.version {
            return false;
        }
        *doc = Document::new(version, text, analysis);
        true
    }

    pub fn close(&self, uri: &str) {
        self.documents.lock().remove(uri);
    }
}
