//! Dense pairwise cosine similarity.

use rayon::prelude::*;

use super::tfidf::SparseVec;
use crate::core::{Error, Result};

/// Cosine similarity of two sparse vectors. Zero vectors score 0.
pub fn cosine(a: &SparseVec, b: &SparseVec) -> f64 {
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).min(1.0)
}

/// Square, symmetric similarity matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    /// Compute every pairwise similarity.
    ///
    /// The upper triangle is computed row-parallel and mirrored, and the
    /// diagonal is 1.0. Fails on empty input or any non-finite score.
    pub fn compute(vectors: &[SparseVec]) -> Result<Self> {
        let n = vectors.len();
        if n == 0 {
            return Err(Error::Similarity("no vectors to compare".to_string()));
        }

        let upper: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (i + 1..n)
                    .map(|j| cosine(&vectors[i], &vectors[j]))
                    .collect()
            })
            .collect();

        let mut data = vec![0.0; n * n];
        for (i, row) in upper.into_iter().enumerate() {
            data[i * n + i] = 1.0;
            for (offset, score) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                if !score.is_finite() {
                    return Err(Error::Similarity(format!(
                        "non-finite similarity between rows {i} and {j}"
                    )));
                }
                data[i * n + j] = score;
                data[j * n + i] = score;
            }
        }

        Ok(Self { n, data })
    }

    /// Number of rows (and columns).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        (i < self.n).then(|| &self.data[i * self.n..(i + 1) * self.n])
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        (i < self.n && j < self.n).then(|| self.data[i * self.n + j])
    }
}
