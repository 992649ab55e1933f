//! TF-IDF vector space over normalized token strings.
//!
//! Raw term counts, smooth IDF (`ln((1 + n) / (1 + df)) + 1`), unigram and
//! bigram terms, and L2-normalized sparse vectors so cosine similarity is a
//! dot product.

use std::collections::{BTreeMap, HashMap};

use crate::config::VectorizerConfig;
use crate::core::{Error, Result};

/// Sparse vector: parallel arrays of column indices and values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVec {
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl SparseVec {
    /// Build from (column, value) pairs sorted by column.
    pub fn from_sorted(entries: Vec<(u32, f64)>) -> Self {
        let (indices, values) = entries.into_iter().unzip();
        Self { indices, values }
    }

    pub fn dot(&self, other: &SparseVec) -> f64 {
        let mut sum = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// True when every component is zero.
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }
}

/// A fitted vectorizer together with the vectors of the corpus it was fitted on.
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub vectorizer: TfidfVectorizer,
    /// One vector per input text, in input order.
    pub vectors: Vec<SparseVec>,
}

/// Fixed vocabulary and IDF weights.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocab: HashMap<String, u32>,
    terms: Vec<String>,
    idf: Vec<f64>,
    ngram_min: usize,
    ngram_max: usize,
}

impl TfidfVectorizer {
    /// Fit a vocabulary over `texts` and vectorize them.
    ///
    /// Fails when fewer than two texts carry any tokens, when `max_df` and
    /// `min_df` contradict each other for this corpus size, or when no term
    /// survives pruning.
    pub fn fit<S: AsRef<str>>(texts: &[S], config: &VectorizerConfig) -> Result<FittedModel> {
        let valid = texts.iter().filter(|t| !t.as_ref().trim().is_empty()).count();
        if valid < 2 {
            return Err(Error::insufficient_data(format!(
                "{valid} non-empty text(s), need at least 2"
            )));
        }

        let n = texts.len();
        let max_doc_count = config.max_df * n as f64;
        if max_doc_count < config.min_df as f64 {
            return Err(Error::Vectorizer(format!(
                "max_df corresponds to {max_doc_count:.2} documents, below min_df {}",
                config.min_df
            )));
        }

        let tokenized: Vec<Vec<String>> = texts
            .iter()
            .map(|t| ngrams(t.as_ref(), config.ngram_min, config.ngram_max))
            .collect();

        // Document and corpus frequency per term
        let mut df: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for tokens in &tokenized {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for t in tokens {
                *counts.entry(t.as_str()).or_insert(0) += 1;
            }
            for (term, count) in counts {
                let entry = df.entry(term).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += count;
            }
        }

        let mut kept: Vec<(&str, usize, usize)> = df
            .into_iter()
            .filter(|(_, (doc_freq, _))| {
                *doc_freq >= config.min_df && (*doc_freq as f64) <= max_doc_count
            })
            .map(|(term, (doc_freq, total))| (term, doc_freq, total))
            .collect();

        if kept.len() > config.max_features {
            // Highest corpus frequency first, ties broken alphabetically
            kept.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(b.0)));
            kept.truncate(config.max_features);
            kept.sort_by(|a, b| a.0.cmp(b.0));
        }

        if kept.is_empty() {
            return Err(Error::Vectorizer(
                "no terms remain after pruning".to_string(),
            ));
        }

        let terms: Vec<String> = kept.iter().map(|(term, _, _)| term.to_string()).collect();
        let vocab: HashMap<String, u32> = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx as u32))
            .collect();
        let idf: Vec<f64> = kept
            .iter()
            .map(|(_, doc_freq, _)| ((1.0 + n as f64) / (1.0 + *doc_freq as f64)).ln() + 1.0)
            .collect();

        let vectorizer = Self {
            vocab,
            terms,
            idf,
            ngram_min: config.ngram_min,
            ngram_max: config.ngram_max,
        };
        let vectors = tokenized
            .iter()
            .map(|tokens| vectorizer.weigh(tokens))
            .collect();

        Ok(FittedModel {
            vectorizer,
            vectors,
        })
    }

    /// Project a normalized text into the fitted space.
    ///
    /// Terms outside the vocabulary contribute nothing.
    pub fn transform(&self, text: &str) -> SparseVec {
        let tokens = ngrams(text, self.ngram_min, self.ngram_max);
        self.weigh(&tokens)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Vocabulary in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocab.get(term).map(|&idx| self.idf[idx as usize])
    }

    fn weigh(&self, tokens: &[String]) -> SparseVec {
        let mut tf: BTreeMap<u32, usize> = BTreeMap::new();
        for token in tokens {
            if let Some(&idx) = self.vocab.get(token) {
                *tf.entry(idx).or_insert(0) += 1;
            }
        }

        let mut vec = SparseVec::from_sorted(
            tf.into_iter()
                .map(|(idx, count)| (idx, count as f64 * self.idf[idx as usize]))
                .collect(),
        );
        vec.l2_normalize();
        vec
    }
}

/// Whitespace tokens plus every n-gram in `[min, max]`, joined by one space.
fn ngrams(text: &str, min: usize, max: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut out = Vec::new();
    for n in min.max(1)..=max {
        if n > words.len() {
            break;
        }
        for window in words.windows(n) {
            out.push(window.join(" "));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VectorizerConfig {
        VectorizerConfig::default()
    }

    #[test]
    fn test_ngrams_unigrams_and_bigrams() {
        let tokens = ngrams("aplikasi sehat desa", 1, 2);
        assert_eq!(
            tokens,
            vec![
                "aplikasi",
                "sehat",
                "desa",
                "aplikasi sehat",
                "sehat desa"
            ]
        );
    }

    #[test]
    fn test_ngrams_empty() {
        assert!(ngrams("", 1, 2).is_empty());
        assert_eq!(ngrams("tunggal", 1, 2), vec!["tunggal"]);
    }

    #[test]
    fn test_sparse_vec_dot_orthogonal() {
        let a = SparseVec::from_sorted(vec![(0, 1.0)]);
        let b = SparseVec::from_sorted(vec![(1, 1.0)]);
        assert_eq!(a.dot(&b), 0.0);
    }

    #[test]
    fn test_sparse_vec_l2_normalize() {
        let mut v = SparseVec::from_sorted(vec![(0, 3.0), (1, 4.0)]);
        v.l2_normalize();
        assert!((v.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sparse_vec_zero_stays_zero() {
        let mut v = SparseVec::default();
        v.l2_normalize();
        assert!(v.is_zero());
        assert_eq!(v.nnz(), 0);
    }

    #[test]
    fn test_fit_requires_two_texts() {
        let err = TfidfVectorizer::fit(&["aplikasi sehat", "  "], &config()).unwrap_err();
        assert!(err.is_data_absence());
    }

    #[test]
    fn test_fit_two_docs_contradicts_max_df() {
        // 0.85 * 2 = 1.7 documents, below min_df = 2
        let err = TfidfVectorizer::fit(&["aplikasi sehat", "aplikasi desa"], &config()).unwrap_err();
        assert!(matches!(err, Error::Vectorizer(_)));
    }

    #[test]
    fn test_fit_no_surviving_terms() {
        let texts = ["alpha", "beta", "gamma"];
        let err = TfidfVectorizer::fit(&texts, &config()).unwrap_err();
        assert!(matches!(err, Error::Vectorizer(_)));
    }

    #[test]
    fn test_vocabulary_pruned_and_sorted() {
        let texts = [
            "sehat desa aplikasi",
            "sehat desa kota",
            "aplikasi mesin",
            "mesin tani",
        ];
        let fitted = TfidfVectorizer::fit(&texts, &config()).unwrap();
        // df >= 2 and df <= 3.4
        assert_eq!(
            fitted.vectorizer.terms(),
            &["aplikasi", "desa", "mesin", "sehat", "sehat desa"]
        );
        assert_eq!(fitted.vectors.len(), 4);
    }

    #[test]
    fn test_max_df_drops_ubiquitous_terms() {
        let texts = ["umum satu", "umum satu", "umum dua", "umum dua"];
        let fitted = TfidfVectorizer::fit(&texts, &config()).unwrap();
        assert!(fitted.vectorizer.idf("umum").is_none());
        assert!(fitted.vectorizer.idf("satu").is_some());
    }

    #[test]
    fn test_smooth_idf() {
        let texts = ["satu dua", "satu dua", "satu tiga", "empat tiga"];
        let fitted = TfidfVectorizer::fit(&texts, &config()).unwrap();
        // n = 4, df(satu) = 3
        let expected = (5.0f64 / 4.0).ln() + 1.0;
        assert!((fitted.vectorizer.idf("satu").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let texts = ["aa bb", "aa bb", "aa cc", "bb cc", "dd ee"];
        let cfg = VectorizerConfig {
            max_features: 2,
            ngram_max: 1,
            ..config()
        };
        let fitted = TfidfVectorizer::fit(&texts, &cfg).unwrap();
        // aa = 3, bb = 3, cc = 2
        assert_eq!(fitted.vectorizer.terms(), &["aa", "bb"]);
    }

    #[test]
    fn test_vectors_unit_length_or_zero() {
        let texts = ["sehat desa", "sehat kota", "mesin tani", "mesin desa", "unik"];
        let fitted = TfidfVectorizer::fit(&texts, &config()).unwrap();
        for v in &fitted.vectors {
            if v.is_zero() {
                continue;
            }
            assert!((v.norm() - 1.0).abs() < 1e-9);
        }
        assert!(fitted.vectors[4].is_zero());
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let texts = ["sehat desa", "sehat kota", "mesin desa"];
        let fitted = TfidfVectorizer::fit(&texts, &config()).unwrap();
        assert!(fitted.vectorizer.transform("pesawat luar angkasa").is_zero());

        let q = fitted.vectorizer.transform("desa pesawat");
        assert_eq!(q.nnz(), 1);
        assert!((q.norm() - 1.0).abs() < 1e-9);
    }
}
