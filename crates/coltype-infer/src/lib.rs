#![deny(unsafe_code)]

//! Statistical column type inference.
//!
//! A [`TypeRegistry`] holds [`TypeDefinition`]s, each with a normalizer,
//! categorizers and reference corpora. [`TypeRegistry::matches`] runs a column
//! through the funnel: cheap coarse categorizers on a small sample first,
//! finer and more expensive ones only while several types remain plausible.

pub mod cancel;
pub mod config;
pub mod definition;
pub mod distance;
pub mod error;
pub mod funnel;
pub mod probe;
pub mod registry;
pub mod sample;
pub mod scores;
pub mod threshold;

pub use crate::cancel::CancelToken;
pub use crate::config::EngineConfig;
pub use crate::definition::{TypeDefinition, TypeDefinitionBuilder};
pub use crate::distance::distance;
pub use crate::error::{DefinitionError, InferError, Result};
pub use crate::funnel::{FunnelConfig, StageConfig, VerifyConfig};
pub use crate::registry::{CacheReportEntry, MatchOptions, MatchResult, TypeRegistry};
pub use crate::scores::LevelScores;
pub use crate::threshold::{RmsSpread, ThresholdPolicy};
