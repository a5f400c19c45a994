//! Persistence boundary for cached reference tables.

mod fs;
mod memory;

use std::fmt;

use coltype_model::{FrequencyTable, Level};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ledger::FunctionLedger;
use crate::significance::SignificanceCutoff;

pub use self::fs::FsCacheStore;
pub use self::memory::MemoryCacheStore;

/// Which table of a corpus an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheSlot {
    /// Normalized value counts, the input of every categorizer.
    Base,
    Level(Level),
}

impl CacheSlot {
    pub fn file_stem(&self) -> String {
        match self {
            Self::Base => "base".to_string(),
            Self::Level(level) => level.name(),
        }
    }
}

impl fmt::Display for CacheSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_stem())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub type_name: String,
    pub corpus: String,
    pub slot: CacheSlot,
}

impl CacheKey {
    pub fn new(type_name: impl Into<String>, corpus: impl Into<String>, slot: CacheSlot) -> Self {
        Self {
            type_name: type_name.into(),
            corpus: corpus.into(),
            slot,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.type_name, self.corpus, self.slot)
    }
}

/// Hashes and cutoffs a cached table was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// SHA-256 of the corpus source text.
    pub source_signature: String,
    pub normalize_hash: String,
    /// Hash of every categorizer at or below the table's level; `None` for the base table.
    #[serde(default)]
    pub categorizer_hash: Option<String>,
    #[serde(default)]
    pub significance: Vec<SignificanceCutoff>,
    /// Number of buckets before truncation.
    #[serde(default)]
    pub bucket_count: usize,
}

impl CacheMeta {
    /// True when both were derived from the same inputs.
    pub fn same_inputs(&self, other: &CacheMeta) -> bool {
        self.source_signature == other.source_signature
            && self.normalize_hash == other.normalize_hash
            && self.categorizer_hash == other.categorizer_hash
    }
}

/// A persisted table, entries sorted by descending count.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTable {
    pub meta: CacheMeta,
    pub entries: Vec<(String, u64)>,
}

impl CachedTable {
    pub fn to_table(&self) -> FrequencyTable {
        self.entries
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect()
    }
}

/// Storage for cached tables and function ledgers.
///
/// Loading never fails on corrupt or partial entries: those are reported as
/// absent so the caller recomputes them. Writes must be atomic per entry so
/// concurrent readers never observe a half-written table.
pub trait CacheStore: Send + Sync + fmt::Debug {
    fn load(&self, key: &CacheKey) -> Result<Option<CachedTable>>;

    fn save(&self, key: &CacheKey, table: &CachedTable) -> Result<()>;

    fn load_ledger(&self, type_name: &str) -> Result<FunctionLedger>;

    /// Record a function hash in the type's ledger and return the previous hash.
    fn record_function(&self, type_name: &str, function: &str, hash: &str)
    -> Result<Option<String>>;
}
