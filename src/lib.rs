//! Innovation recommender - content-based recommendations for short text catalogs.
//!
//! Builds a TF-IDF model over each record's description and category, keeps
//! a full pairwise cosine similarity matrix in memory, and answers two kinds
//! of query: "records similar to this one" and free-text search.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use recommender::config::Config;
//! use recommender::engine::RecommendationEngine;
//! use recommender::store::JsonFileStore;
//!
//! let store = Arc::new(JsonFileStore::new("catalog.json"));
//! let engine = RecommendationEngine::new(Config::default(), store);
//! engine.initialize();
//! for rec in engine.recommend("inv-1", 5, 0.01) {
//!     println!("{} ({:.4})", rec.title, rec.similarity_score);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod output;
pub mod store;
pub mod text;

pub use core::{Error, Record, Recommendation, Result};
pub use engine::{ModelStats, ModelStatus, RecommendationEngine};
