#![deny(unsafe_code)]

//! Built-in column types for `coltype`.
//!
//! Provides the standard string categorizers, the built-in type definitions
//! (postal codes, e-mail addresses, IPv4 addresses, phone numbers, top-level
//! domains, license keys and customer codes) and the assembly of a
//! [`TypeRegistry`](coltype_infer::TypeRegistry) from a corpora directory.

pub mod catalog;
pub mod error;
pub mod paths;
pub mod standard;
pub mod types;

pub use crate::catalog::{builtin_registry, builtin_registry_with_store, default_registry};
pub use crate::error::{CatalogError, Result};
pub use crate::paths::{CACHE_ENV_VAR, CORPORA_ENV_VAR, ResolvedDirs, cache_root, corpora_root};
pub use crate::standard::standard_categorizers;
pub use crate::types::builtin_types;
