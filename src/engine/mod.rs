//! Recommendation engine.
//!
//! # Architecture
//!
//! - **tfidf**: vocabulary, IDF weights and sparse vectors
//! - **similarity**: dense pairwise cosine matrix
//! - **snapshot**: one immutable build of the model
//! - **cache**: TTL invalidation and serialized rebuilds
//! - **pool**: bounded-timeout parallel materialization
//! - **clock**: injectable time source
//!
//! Absence of data, unknown ids and empty queries all produce empty results.
//! Infrastructure failures surface only as `false` from [`RecommendationEngine::initialize`]
//! and [`RecommendationEngine::force_refresh`].

pub mod cache;
pub mod clock;
pub mod pool;
pub mod similarity;
pub mod snapshot;
pub mod tfidf;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::core::Recommendation;
use crate::store::DocumentStore;
use crate::text::Normalizer;

pub use cache::ModelCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use pool::WorkerPool;
pub use similarity::{cosine, SimilarityMatrix};
pub use snapshot::Snapshot;
pub use tfidf::{FittedModel, SparseVec, TfidfVectorizer};

/// Whether a model has been built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Initialized,
    NotInitialized,
}

/// Summary of the committed model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStats {
    pub status: ModelStatus,
    pub total_records: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub cache_ttl_secs: u64,
    pub vocabulary_size: usize,
    pub matrix_shape: Option<(usize, usize)>,
    pub builds: u64,
}

/// Content-based recommendation and search over a document store.
pub struct RecommendationEngine {
    config: Config,
    normalizer: Arc<Normalizer>,
    cache: ModelCache,
    pool: WorkerPool,
}

impl RecommendationEngine {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        let normalizer = Arc::new(Normalizer::new(&config.text));
        let pool = WorkerPool::new(config.retrieval.workers, config.retrieval.row_timeout());
        let cache = ModelCache::new(config.clone(), store, Arc::clone(&normalizer), clock);
        Self {
            config,
            normalizer,
            cache,
            pool,
        }
    }

    /// The last committed snapshot, without refreshing it.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.cache.snapshot()
    }

    /// Build the model eagerly. Returns whether a usable snapshot exists.
    pub fn initialize(&self) -> bool {
        self.cache.rebuild(false).is_ok()
    }

    /// Rebuild regardless of the TTL. Returns whether the rebuild succeeded.
    pub fn force_refresh(&self) -> bool {
        self.cache.rebuild(true).is_ok()
    }

    /// Records most similar to `record_id`, best first.
    pub fn recommend(&self, record_id: &str, top_n: usize, min_similarity: f64) -> Vec<Recommendation> {
        if record_id.trim().is_empty() || top_n == 0 {
            return Vec::new();
        }
        let Some(snapshot) = self.cache.ensure_fresh() else {
            return Vec::new();
        };
        let Some(row) = snapshot.row_of(record_id) else {
            tracing::debug!(id = record_id, "unknown record id");
            return Vec::new();
        };
        let Some(scores) = snapshot.matrix.row(row) else {
            return Vec::new();
        };

        let mut ranked: Vec<(usize, f64)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, score)| score.is_finite() && score >= min_similarity)
            // also drops later rows that share the query id
            .filter(|&(i, _)| i != row && snapshot.records[i].id != record_id)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_n);

        self.materialize(snapshot, ranked)
    }

    /// Recommendations with the configured defaults.
    pub fn recommend_default(&self, record_id: &str) -> Vec<Recommendation> {
        let retrieval = &self.config.retrieval;
        self.recommend(record_id, retrieval.top_n, retrieval.min_similarity)
    }

    /// Free-text search, best first.
    pub fn search(&self, query: &str, top_n: usize) -> Vec<Recommendation> {
        if query.trim().is_empty() || top_n == 0 || self.cache.snapshot().is_none() {
            return Vec::new();
        }
        let Some(snapshot) = self.cache.ensure_fresh() else {
            return Vec::new();
        };

        let processed = self.normalizer.normalize(query);
        if processed.is_empty() {
            return Vec::new();
        }
        let query_vec = snapshot.vectorizer.transform(&processed);
        if query_vec.is_zero() {
            return Vec::new();
        }

        let threshold = self.config.retrieval.search_min_similarity;
        let mut ranked: Vec<(usize, f64)> = snapshot
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine(&query_vec, v)))
            .filter(|&(_, score)| score.is_finite() && score > threshold)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_n);

        self.materialize_serial(&snapshot, ranked)
    }

    /// Search with the configured result count.
    pub fn search_default(&self, query: &str) -> Vec<Recommendation> {
        self.search(query, self.config.retrieval.search_top_n)
    }

    pub fn model_stats(&self) -> ModelStats {
        let ttl = self.config.cache.ttl_secs;
        let builds = self.cache.builds();
        match self.cache.snapshot() {
            Some(snapshot) => ModelStats {
                status: ModelStatus::Initialized,
                total_records: snapshot.len(),
                last_update: Some(snapshot.built_at),
                cache_ttl_secs: ttl,
                vocabulary_size: snapshot.vectorizer.vocabulary_size(),
                matrix_shape: Some(snapshot.matrix.shape()),
                builds,
            },
            None => ModelStats {
                status: ModelStatus::NotInitialized,
                total_records: 0,
                last_update: None,
                cache_ttl_secs: ttl,
                vocabulary_size: 0,
                matrix_shape: None,
                builds,
            },
        }
    }

    fn materialize(&self, snapshot: Arc<Snapshot>, ranked: Vec<(usize, f64)>) -> Vec<Recommendation> {
        if ranked.len() <= self.config.retrieval.parallel_threshold {
            return self.materialize_serial(&snapshot, ranked);
        }
        self.pool
            .run(ranked, move |(row, score)| snapshot.materialize(row, score))
            .into_iter()
            .flatten()
            .collect()
    }

    fn materialize_serial(&self, snapshot: &Snapshot, ranked: Vec<(usize, f64)>) -> Vec<Recommendation> {
        ranked
            .into_iter()
            .filter_map(|(row, score)| match snapshot.materialize(row, score) {
                Ok(rec) => Some(rec),
                Err(e) => {
                    tracing::debug!("skipping result: {}", e);
                    None
                }
            })
            .collect()
    }
}
