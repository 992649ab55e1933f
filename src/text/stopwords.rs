//! Stopword sets: bundled lists plus optional on-disk resources.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::Language;

static INDONESIAN: Lazy<Arc<StopWords>> = Lazy::new(|| {
    Arc::new(StopWords::parse(
        include_str!("stopwords/indonesian.txt"),
        StopWordSource::Bundled,
    ))
});

static ENGLISH: Lazy<Arc<StopWords>> = Lazy::new(|| {
    Arc::new(StopWords::parse(
        include_str!("stopwords/english.txt"),
        StopWordSource::Bundled,
    ))
});

/// Where a stopword set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopWordSource {
    Bundled,
    Resource,
}

/// An immutable set of stopwords.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
    source: StopWordSource,
}

impl StopWords {
    /// The built-in list for a language. Initialized once per process.
    pub fn bundled(language: Language) -> Arc<Self> {
        match language {
            Language::Indonesian => Arc::clone(&INDONESIAN),
            Language::English => Arc::clone(&ENGLISH),
        }
    }

    /// Load a resource file, falling back to the bundled list.
    ///
    /// Never fails: a missing, unreadable, or empty resource only logs a
    /// warning.
    pub fn load(language: Language, path: Option<&Path>) -> Arc<Self> {
        let Some(path) = path else {
            return Self::bundled(language);
        };

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let words = Self::parse(&content, StopWordSource::Resource);
                if words.is_empty() {
                    tracing::warn!(
                        path = %path.display(),
                        "stopword resource is empty, using bundled {} list",
                        language
                    );
                    return Self::bundled(language);
                }
                tracing::debug!(path = %path.display(), count = words.len(), "loaded stopwords");
                Arc::new(words)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "stopword resource unavailable ({}), using bundled {} list",
                    e,
                    language
                );
                Self::bundled(language)
            }
        }
    }

    /// Parse one word per line; blank lines and `#` comments are ignored.
    pub fn parse(content: &str, source: StopWordSource) -> Self {
        let words = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Self { words, source }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn source(&self) -> StopWordSource {
        self.source
    }
}
