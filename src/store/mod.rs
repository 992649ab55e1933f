//! Document store abstraction.
//!
//! The engine reads its catalog through [`DocumentStore`], so the same model
//! lifecycle works against an in-memory catalog or a JSON file on disk.

mod json_file;
mod memory;

use serde_json::{Map, Value};

use crate::core::Result;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// One document as returned by a store: an opaque id plus its field values.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Keep only the requested fields.
    pub fn project(mut self, fields: &[&str]) -> Self {
        self.fields.retain(|key, _| fields.contains(&key.as_str()));
        self
    }
}

/// Trait for reading the whole catalog from a backing store.
///
/// Implementations skip malformed documents individually and return an
/// empty list for an empty catalog. An `Err` means the store itself could
/// not be reached.
pub trait DocumentStore: Send + Sync {
    /// Fetch every document, projected onto `fields`.
    fn fetch_all(&self, fields: &[&str]) -> Result<Vec<RawDocument>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_keeps_requested_fields() {
        let fields = json!({ "description": "x", "secret": "y", "category": "z" });
        let doc = RawDocument::new("a", fields.as_object().cloned().unwrap());

        let projected = doc.project(&["description", "category"]);
        assert_eq!(projected.fields.len(), 2);
        assert!(projected.fields.contains_key("description"));
        assert!(!projected.fields.contains_key("secret"));
    }
}
