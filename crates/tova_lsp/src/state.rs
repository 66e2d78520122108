//! Global server state, shared across all requests.

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use crate::document::DocumentState;

/// Uses `DashMap` for concurrent access without external locking. Each edit
/// replaces the whole document entry, so readers never see partial updates.
pub struct ServerState {
    pub documents: DashMap<Url, DocumentState>,
}

impl ServerState {
    pub fn new() -> Self {
        ServerState {
            documents: DashMap::new(),
        }
    }

    pub fn open_document(&self, uri: Url, source: String, version: i32) {
        let doc = DocumentState::new(uri.as_str(), source, version);
        self.documents.insert(uri, doc);
    }

    pub fn update_document(&self, uri: &Url, source: String, version: i32) {
        let doc = DocumentState::new(uri.as_str(), source, version);
        self.documents.insert(uri.clone(), doc);
    }

    pub fn close_document(&self, uri: &Url) {
        self.documents.remove(uri);
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
