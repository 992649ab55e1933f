//! Immutable model snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::similarity::SimilarityMatrix;
use super::tfidf::{SparseVec, TfidfVectorizer};
use crate::core::{Error, Record, Recommendation, Result};

/// Everything one successful rebuild produced.
///
/// Row `i` of `records`, `texts`, `vectors` and the matrix all describe the
/// same record.
#[derive(Debug)]
pub struct Snapshot {
    pub records: Vec<Record>,
    /// Normalized text per record.
    pub texts: Vec<String>,
    pub vectorizer: TfidfVectorizer,
    pub vectors: Vec<SparseVec>,
    pub matrix: SimilarityMatrix,
    pub built_at: DateTime<Utc>,
    /// Build counter value when this snapshot was committed.
    pub generation: u64,
    rows: HashMap<String, usize>,
}

impl Snapshot {
    pub fn new(
        records: Vec<Record>,
        texts: Vec<String>,
        vectorizer: TfidfVectorizer,
        vectors: Vec<SparseVec>,
        matrix: SimilarityMatrix,
        built_at: DateTime<Utc>,
        generation: u64,
    ) -> Self {
        let mut rows = HashMap::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            // duplicate ids resolve to their first row
            rows.entry(record.id.clone()).or_insert(row);
        }
        Self {
            records,
            texts,
            vectorizer,
            vectors,
            matrix,
            built_at,
            generation,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row of the first record with this id.
    pub fn row_of(&self, id: &str) -> Option<usize> {
        self.rows.get(id).copied()
    }

    /// Turn a ranked row into a result.
    pub fn materialize(&self, row: usize, score: f64) -> Result<Recommendation> {
        let record = self
            .records
            .get(row)
            .ok_or_else(|| Error::materialize(row, "row out of range"))?;
        if !score.is_finite() {
            return Err(Error::materialize(row, format!("non-finite score {score}")));
        }
        Ok(Recommendation::from_record(record, score))
    }
}
