//! Catalog error types.

use std::path::PathBuf;

use coltype_infer::{DefinitionError, InferError};
use thiserror::Error;

/// Failure to assemble the built-in type registry.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to {operation} corpora directory: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Registry(#[from] InferError),
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
