//! Snapshot cache with TTL invalidation and serialized rebuilds.
//!
//! Readers clone the current `Arc<Snapshot>` under a read lock held only for
//! the clone. Rebuilds run under a separate mutex, so at most one is in
//! flight, and take the write lock only to swap the pointer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use super::clock::Clock;
use super::similarity::SimilarityMatrix;
use super::snapshot::Snapshot;
use super::tfidf::TfidfVectorizer;
use crate::config::Config;
use crate::core::{Error, Record, Result};
use crate::store::DocumentStore;
use crate::text::Normalizer;

pub struct ModelCache {
    config: Config,
    store: Arc<dyn DocumentStore>,
    normalizer: Arc<Normalizer>,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<Arc<Snapshot>>>,
    rebuild_lock: Mutex<()>,
    builds: AtomicU64,
}

impl ModelCache {
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        normalizer: Arc<Normalizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            normalizer,
            clock,
            current: RwLock::new(None),
            rebuild_lock: Mutex::new(()),
            builds: AtomicU64::new(0),
        }
    }

    /// The last committed snapshot, without checking freshness.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /// Number of successful builds so far.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Acquire)
    }

    pub fn ttl(&self) -> Duration {
        self.config.cache.ttl()
    }

    /// Whether `snapshot` has outlived the TTL.
    pub fn is_stale(&self, snapshot: &Snapshot) -> bool {
        (self.clock.now() - snapshot.built_at)
            .to_std()
            .map(|elapsed| elapsed > self.ttl())
            .unwrap_or(false)
    }

    /// A snapshot within its TTL, rebuilding if needed.
    ///
    /// When a rebuild fails the previous snapshot, if any, is served.
    pub fn ensure_fresh(&self) -> Option<Arc<Snapshot>> {
        if let Some(snapshot) = self.snapshot() {
            if !self.is_stale(&snapshot) {
                return Some(snapshot);
            }
        }

        match self.rebuild(false) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                let previous = self.snapshot();
                if previous.is_some() {
                    tracing::warn!("model rebuild failed, serving previous snapshot: {}", e);
                }
                previous
            }
        }
    }

    /// Rebuild the model.
    ///
    /// Without `force`, a caller that waited on another rebuild gets that
    /// fresh snapshot instead of building again. On failure the committed
    /// snapshot is left untouched.
    pub fn rebuild(&self, force: bool) -> Result<Arc<Snapshot>> {
        let _guard = self.rebuild_lock.lock();

        if !force {
            if let Some(snapshot) = self.snapshot() {
                if !self.is_stale(&snapshot) {
                    return Ok(snapshot);
                }
            }
        }

        let generation = self.builds() + 1;
        let started = Instant::now();
        tracing::info!(generation, force, "rebuilding similarity model");

        match self.build(generation) {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.current.write() = Some(Arc::clone(&snapshot));
                self.builds.store(generation, Ordering::Release);
                tracing::info!(
                    generation,
                    records = snapshot.len(),
                    vocabulary = snapshot.vectorizer.vocabulary_size(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "similarity model ready"
                );
                Ok(snapshot)
            }
            Err(e) => {
                if e.is_data_absence() {
                    tracing::warn!(generation, "model not built: {}", e);
                } else {
                    tracing::error!(generation, "model rebuild failed: {}", e);
                }
                Err(e)
            }
        }
    }

    fn build(&self, generation: u64) -> Result<Snapshot> {
        let fields = &self.config.store.fields;
        let documents = self.store.fetch_all(&fields.all())?;
        if documents.is_empty() {
            return Err(Error::insufficient_data("document store returned no records"));
        }

        let fetched = documents.len();
        let records: Vec<Record> = documents
            .iter()
            .filter_map(|doc| Record::from_document(doc, fields))
            .collect();
        if records.len() < fetched {
            tracing::debug!(dropped = fetched - records.len(), "dropped records without an id");
        }

        let weight = self.config.text.category_weight;
        let combined: Vec<String> = records.iter().map(|r| r.combined_text(weight)).collect();
        let processed = self.normalizer.normalize_batch(&combined);

        let (records, texts): (Vec<Record>, Vec<String>) = records
            .into_iter()
            .zip(processed)
            .filter(|(_, text)| !text.is_empty())
            .unzip();
        tracing::debug!(fetched, retained = records.len(), "prepared model input");

        let fitted = TfidfVectorizer::fit(&texts, &self.config.vectorizer)?;
        let matrix = SimilarityMatrix::compute(&fitted.vectors)?;

        Ok(Snapshot::new(
            records,
            texts,
            fitted.vectorizer,
            fitted.vectors,
            matrix,
            self.clock.now(),
            generation,
        ))
    }
}
