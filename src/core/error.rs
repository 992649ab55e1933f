//! Error types for the recommender library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using the recommender's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying the similarity model.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML rendering error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Document store error.
    #[error("Store error: {0}")]
    Store(String),

    /// Not enough usable records to build a model.
    #[error("Insufficient data: {message}")]
    InsufficientData { message: String },

    /// TF-IDF vectorizer could not be fitted.
    #[error("Vectorizer error: {0}")]
    Vectorizer(String),

    /// Similarity matrix could not be computed.
    #[error("Similarity error: {0}")]
    Similarity(String),

    /// A single result row could not be turned into a recommendation.
    #[error("Materialization error at row {row}: {message}")]
    Materialize { row: usize, message: String },

    /// Stemmer rejected a token.
    #[error("Stemming error for token '{token}'")]
    Stem { token: String },
}

impl Error {
    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create an insufficient-data error.
    pub fn insufficient_data(message: impl Into<String>) -> Self {
        Self::InsufficientData {
            message: message.into(),
        }
    }

    /// Create a materialization error for a row.
    pub fn materialize(row: usize, message: impl Into<String>) -> Self {
        Self::Materialize {
            row,
            message: message.into(),
        }
    }

    /// Whether this error only means "not enough data yet".
    pub fn is_data_absence(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::insufficient_data("1 valid text");
        assert_eq!(err.to_string(), "Insufficient data: 1 valid text");

        let err = Error::FileNotFound {
            path: PathBuf::from("catalog.json"),
        };
        assert_eq!(err.to_string(), "File not found: catalog.json");
    }

    #[test]
    fn test_materialize_error() {
        let err = Error::materialize(7, "row out of range");
        match err {
            Error::Materialize { row, message } => {
                assert_eq!(row, 7);
                assert_eq!(message, "row out of range");
            }
            _ => panic!("Expected Materialize"),
        }
    }

    #[test]
    fn test_is_data_absence() {
        assert!(Error::insufficient_data("x").is_data_absence());
        assert!(!Error::Similarity("nan".into()).is_data_absence());
    }
}
