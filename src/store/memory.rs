//! In-memory document store.

use parking_lot::RwLock;

use super::{DocumentStore, RawDocument};
use crate::core::Result;

/// Store backed by a vector of documents whose contents can be replaced.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<RawDocument>>,
}

impl MemoryStore {
    pub fn new(documents: Vec<RawDocument>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Replace the whole catalog.
    pub fn replace(&self, documents: Vec<RawDocument>) {
        *self.documents.write() = documents;
    }

    pub fn push(&self, document: RawDocument) {
        self.documents.write().push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn fetch_all(&self, fields: &[&str]) -> Result<Vec<RawDocument>> {
        let documents = self.documents.read();
        Ok(documents
            .iter()
            .cloned()
            .map(|doc| doc.project(fields))
            .collect())
    }
}
