//! JSON file document store.
//!
//! Accepts two layouts:
//!
//! - an array of objects, each carrying its own `id`
//! - an object keyed by id, each value an object of fields
//!
//! A missing or unreadable file is an empty catalog. Content that is not
//! JSON, or JSON of neither layout, is an error.

use std::path::PathBuf;

use serde_json::Value;

use super::{DocumentStore, RawDocument};
use crate::core::{Error, Result};

/// Store that re-reads a JSON catalog file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentStore for JsonFileStore {
    fn fetch_all(&self, fields: &[&str]) -> Result<Vec<RawDocument>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "catalog unreachable: {}", e);
                return Ok(Vec::new());
            }
        };
        if content.trim().is_empty() {
            tracing::warn!(path = %self.path.display(), "catalog file is empty");
            return Ok(Vec::new());
        }

        let value: Value = serde_json::from_str(&content)?;
        let documents = parse_catalog(value)?;

        tracing::debug!(
            path = %self.path.display(),
            count = documents.len(),
            "loaded catalog"
        );
        Ok(documents
            .into_iter()
            .map(|doc| doc.project(fields))
            .collect())
    }
}

fn parse_catalog(value: Value) -> Result<Vec<RawDocument>> {
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                Value::Object(mut fields) => match fields.remove("id").as_ref().and_then(id_text) {
                    Some(id) => Some(RawDocument::new(id, fields)),
                    None => {
                        tracing::debug!(index = i, "skipping catalog entry without an id");
                        None
                    }
                },
                _ => {
                    tracing::debug!(index = i, "skipping catalog entry that is not an object");
                    None
                }
            })
            .collect()),
        Value::Object(entries) => Ok(entries
            .into_iter()
            .filter_map(|(id, item)| match item {
                Value::Object(fields) => Some(RawDocument::new(id, fields)),
                _ => {
                    tracing::debug!(id = %id, "skipping catalog entry that is not an object");
                    None
                }
            })
            .collect()),
        _ => Err(Error::store(
            "catalog must be a JSON array or an object keyed by id",
        )),
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
