//! Catalog records and the recommendation result shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FieldNames;
use crate::store::RawDocument;

/// One cleaned catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub description: String,
    pub category: String,
    pub title: String,
    pub creator_name: String,
    pub images: Vec<String>,
    pub year_created: Option<String>,
}

impl Record {
    /// Validate and clean a raw document.
    ///
    /// Returns `None` when the document has a blank id. Missing text fields
    /// default to empty strings; scalar non-string values are stringified.
    pub fn from_document(doc: &RawDocument, fields: &FieldNames) -> Option<Self> {
        let id = doc.id.trim();
        if id.is_empty() {
            return None;
        }

        let text = |name: &str| doc.fields.get(name).map(value_to_text).unwrap_or_default();

        let images = match doc.fields.get(&fields.images) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        let year_created = match doc.fields.get(&fields.year_created) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Some(Self {
            id: doc.id.clone(),
            description: text(&fields.description),
            category: text(&fields.category),
            title: text(&fields.title),
            creator_name: text(&fields.creator_name),
            images,
            year_created,
        })
    }

    /// Description and category joined for modeling.
    pub fn combined_text(&self, category_weight: usize) -> String {
        crate::text::combine_features(&self.description, &self.category, category_weight)
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// A single ranked result returned by `recommend` and `search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub creator: String,
    pub images: Vec<String>,
    #[serde(rename = "yearCreated")]
    pub year_created: Option<String>,
    /// Similarity rounded to 4 decimal places.
    pub similarity_score: f64,
}

impl Recommendation {
    /// Build a result from a record and its raw score.
    pub fn from_record(record: &Record, score: f64) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            category: record.category.clone(),
            description: record.description.clone(),
            creator: record.creator_name.clone(),
            images: record.images.clone(),
            year_created: record.year_created.clone(),
            similarity_score: round_score(score),
        }
    }
}

/// Round a similarity score to 4 decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
