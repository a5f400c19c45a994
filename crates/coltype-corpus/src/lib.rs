#![deny(unsafe_code)]

//! Reference corpora for statistical column typing.
//!
//! A [`ReferenceCorpus`] turns the raw text of known-good values into one
//! frequency table per categorizer level. Tables are persisted through a
//! [`CacheStore`] together with the content hashes they were derived from, so
//! a change in the source text, the normalizer or any categorizer at or below
//! a level triggers recomputation of exactly the affected tables.

pub mod corpus;
pub mod error;
pub mod ledger;
pub mod significance;
pub mod source;
pub mod store;

pub use crate::corpus::{CacheStatus, CorpusSettings, ReferenceCorpus, StaleReason};
pub use crate::error::{CorpusError, Result};
pub use crate::ledger::FunctionLedger;
pub use crate::significance::{COVERAGE_LEVELS, SignificanceCutoff, significance_count};
pub use crate::source::{CorpusSource, CorpusText, FileCorpusSource, MemoryCorpusSource};
pub use crate::store::{
    CacheKey, CacheMeta, CacheSlot, CacheStore, CachedTable, FsCacheStore, MemoryCacheStore,
};
