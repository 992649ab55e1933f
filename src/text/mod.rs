//! Text normalization pipeline.
//!
//! Turns free text into a space-joined sequence of stemmed,
//! stopword-filtered tokens:
//!
//! 1. case-fold
//! 2. strip escape sequences, digits and punctuation
//! 3. collapse whitespace and tokenize, dropping single-character tokens
//! 4. remove stopwords, stem, then drop stems that are single characters or
//!    stopwords themselves
//!
//! The same input with the same resources always yields the same output.

pub mod stemmer;
pub mod stopwords;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::TextConfig;

pub use stemmer::{IndonesianStemmer, Stemmer};
pub use stopwords::{StopWordSource, StopWords};

static ESCAPED_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[tn]").expect("valid regex"));
static UNICODE_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\u[0-9a-fA-F]{4}").expect("valid regex"));
static BACKSLASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\+").expect("valid regex"));
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Natural language of the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Indonesian,
    English,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indonesian => f.write_str("indonesian"),
            Self::English => f.write_str("english"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "indonesian" | "id" => Ok(Self::Indonesian),
            "english" | "en" => Ok(Self::English),
            _ => Err(format!("Unknown language: {s}. Use 'indonesian' or 'english'")),
        }
    }
}

/// Text normalizer holding one stopword set and one stemmer.
#[derive(Debug)]
pub struct Normalizer {
    stopwords: Arc<StopWords>,
    stemmer: Stemmer,
}

impl Normalizer {
    /// Build a normalizer from configuration, loading stopwords once.
    pub fn new(config: &TextConfig) -> Self {
        Self {
            stopwords: StopWords::load(config.language, config.stopwords_path.as_deref()),
            stemmer: Stemmer::for_language(config.language, config.stemming),
        }
    }

    pub fn with_parts(stopwords: Arc<StopWords>, stemmer: Stemmer) -> Self {
        Self { stopwords, stemmer }
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    /// Normalize one text.
    pub fn normalize(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }

        let cleaned = clean(text);

        cleaned
            .split(' ')
            .filter(|token| token.chars().count() > 1)
            .filter(|token| !self.stopwords.contains(token))
            .map(|token| match self.stemmer.stem(token) {
                Ok(stem) => stem,
                Err(e) => {
                    tracing::debug!("{}; keeping token unstemmed", e);
                    token.to_string()
                }
            })
            .filter(|stem| stem.chars().count() > 1 && !self.stopwords.contains(stem))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalize many texts, isolating failures per item.
    ///
    /// An item whose processing panics yields an empty string.
    pub fn normalize_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<String> {
        texts
            .par_iter()
            .enumerate()
            .map(|(i, text)| {
                panic::catch_unwind(AssertUnwindSafe(|| self.normalize(text.as_ref())))
                    .unwrap_or_else(|_| {
                        tracing::warn!(item = i, "text normalization failed, using empty text");
                        String::new()
                    })
            })
            .collect()
    }
}

/// Lowercase and strip everything that is not a word or a single space.
fn clean(text: &str) -> String {
    let text = text.to_lowercase();
    let text = ESCAPED_WHITESPACE.replace_all(&text, " ");
    let text = UNICODE_ESCAPE.replace_all(&text, " ");
    let text = BACKSLASHES.replace_all(&text, "");
    let text = DIGITS.replace_all(&text, "");
    let text = PUNCTUATION.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Join description and category, repeating the category when weighted.
pub fn combine_features(description: &str, category: &str, category_weight: usize) -> String {
    if category_weight > 1 {
        let mut combined = String::with_capacity(description.len() + (category.len() + 1) * category_weight + 1);
        combined.push_str(description);
        combined.push(' ');
        for _ in 0..category_weight {
            combined.push_str(category);
            combined.push(' ');
        }
        combined
    } else {
        format!("{description} {category}")
    }
}
