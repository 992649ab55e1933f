//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::text::Language;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot cache lifecycle.
    pub cache: CacheConfig,
    /// Text normalization.
    pub text: TextConfig,
    /// TF-IDF vectorizer bounds.
    pub vectorizer: VectorizerConfig,
    /// Recommendation and search defaults.
    pub retrieval: RetrievalConfig,
    /// Document store settings.
    pub store: StoreConfig,
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config` flags.
    /// Env vars with `RECOMMENDER_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::core::Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("RECOMMENDER_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from directory, looking for recommender.toml or
    /// .recommender/recommender.toml.
    ///
    /// Missing files are silently skipped (defaults are used).
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("recommender.toml")))
            .merge(Toml::file(dir.join(".recommender/recommender.toml")))
            .merge(Env::prefixed("RECOMMENDER_").split("__"))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string layered over the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(content))
            .extract()
            .map_err(|e| crate::core::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Create default config file content.
    pub fn default_toml() -> &'static str {
        include_str!("default_config.toml")
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let v = &self.vectorizer;
        if !(v.max_df > 0.0 && v.max_df <= 1.0) {
            return Err(crate::core::Error::config(format!(
                "vectorizer.max_df must be in (0, 1], got {}",
                v.max_df
            )));
        }
        if v.ngram_min == 0 || v.ngram_min > v.ngram_max {
            return Err(crate::core::Error::config(format!(
                "invalid n-gram range ({}, {})",
                v.ngram_min, v.ngram_max
            )));
        }
        if v.max_features == 0 {
            return Err(crate::core::Error::config(
                "vectorizer.max_features must be positive",
            ));
        }
        if self.retrieval.workers == 0 {
            return Err(crate::core::Error::config(
                "retrieval.workers must be positive",
            ));
        }
        Ok(())
    }
}

/// Snapshot cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a snapshot stays fresh.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Text normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Natural language for stopwords and stemming.
    pub language: Language,
    /// Optional stopword resource, one word per line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopwords_path: Option<PathBuf>,
    /// Apply the stemmer.
    pub stemming: bool,
    /// How many times the category is repeated in the combined text.
    pub category_weight: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            language: Language::Indonesian,
            stopwords_path: None,
            stemming: true,
            category_weight: 1,
        }
    }
}

/// TF-IDF vectorizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Vocabulary cap.
    pub max_features: usize,
    /// Smallest n-gram length.
    pub ngram_min: usize,
    /// Largest n-gram length.
    pub ngram_max: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            min_df: 2,
            max_df: 0.85,
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 2,
        }
    }
}

/// Retrieval defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Default number of recommendations.
    pub top_n: usize,
    /// Minimum similarity kept by `recommend`.
    pub min_similarity: f64,
    /// Default number of search results.
    pub search_top_n: usize,
    /// Search scores must be strictly above this.
    pub search_min_similarity: f64,
    /// Above this many results, materialization runs on the worker pool.
    pub parallel_threshold: usize,
    /// Worker pool size.
    pub workers: usize,
    /// Per-row materialization timeout in milliseconds.
    pub row_timeout_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            min_similarity: 0.01,
            search_top_n: 10,
            search_min_similarity: 0.01,
            parallel_threshold: 10,
            workers: 4,
            row_timeout_ms: 5000,
        }
    }
}

impl RetrievalConfig {
    pub fn row_timeout(&self) -> Duration {
        Duration::from_millis(self.row_timeout_ms)
    }
}

/// Document store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON catalog file backing the file store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Field names used by the store.
    pub fields: FieldNames,
}

/// Names of the record fields in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldNames {
    pub description: String,
    pub category: String,
    pub title: String,
    pub creator_name: String,
    pub images: String,
    pub year_created: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            description: "description".to_string(),
            category: "category".to_string(),
            title: "title".to_string(),
            creator_name: "creatorName".to_string(),
            images: "images".to_string(),
            year_created: "yearCreated".to_string(),
        }
    }
}

impl FieldNames {
    /// Fields requested from the store on every fetch.
    pub fn all(&self) -> Vec<&str> {
        vec![
            self.description.as_str(),
            self.category.as_str(),
            self.title.as_str(),
            self.creator_name.as_str(),
            self.images.as_str(),
            self.year_created.as_str(),
        ]
    }
}
