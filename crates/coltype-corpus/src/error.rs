//! Corpus error types.

use std::path::PathBuf;

use coltype_model::Level;
use thiserror::Error;

/// Corpus and cache operation error.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The raw reference text could not be read. The owning type cannot be
    /// matched, but other types are unaffected.
    #[error("reference corpus '{corpus}' is unavailable")]
    Unavailable {
        corpus: String,
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// File I/O error in the cache store.
    #[error("failed to {operation} cache file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache table could not be encoded.
    #[error("failed to encode cache table {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Cache metadata could not be encoded.
    #[error("failed to encode cache metadata {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The corpus has no categorizer at the requested level.
    #[error("corpus '{corpus}' has no categorizer at {level}")]
    UnknownLevel { corpus: String, level: Level },
}

impl CorpusError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// True when the corpus source itself is missing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Result type alias for corpus operations.
pub type Result<T> = std::result::Result<T, CorpusError>;
