#![deny(unsafe_code)]

//! Shared model for statistical column typing.
//!
//! A [`Column`] of raw values is reduced to [`FrequencyTable`]s, which are
//! coarsened by [`Categorizer`]s at numbered [`Level`]s before being compared
//! against reference distributions.

pub mod classify;
pub mod column;
pub mod error;
pub mod fingerprint;
pub mod level;
pub mod table;

pub use crate::classify::{Categorize, Categorizer, CategorizerSet, Normalizer, Outcome, Validator};
pub use crate::column::Column;
pub use crate::error::ModelError;
pub use crate::fingerprint::{fingerprint_hash, sha256_hex};
pub use crate::level::{Level, LevelRange};
pub use crate::table::FrequencyTable;
