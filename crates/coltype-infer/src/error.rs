//! Error types for type definitions and matching.

use std::path::PathBuf;

use coltype_corpus::CorpusError;
use coltype_model::ModelError;
use thiserror::Error;

/// A type definition could not be registered.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A classification function panicked or behaved non-deterministically
    /// while being probed. This is a bug in the definition, not in the data.
    #[error("type '{type_name}': {function} failed probing with input {probe:?}: {message}")]
    Author {
        type_name: String,
        function: String,
        probe: String,
        message: String,
    },

    #[error("type '{type_name}': invalid pattern")]
    Pattern {
        type_name: String,
        #[source]
        source: regex::Error,
    },

    #[error("type '{type_name}': {source}")]
    Categorizer {
        type_name: String,
        #[source]
        source: ModelError,
    },

    #[error("type name must not be empty")]
    EmptyName,
}

/// Registry, matching and configuration error.
#[derive(Debug, Error)]
pub enum InferError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("unknown type: {name}")]
    UnknownType { name: String },

    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    /// The match was cancelled between two type evaluations.
    #[error("match cancelled")]
    Cancelled,

    #[error("failed to {operation} config file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result type alias for inference operations.
pub type Result<T> = std::result::Result<T, InferError>;
