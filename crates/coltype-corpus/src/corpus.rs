//! Reference corpora and their per-level tables.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use coltype_model::{Categorizer, CategorizerSet, FrequencyTable, Level, Normalizer};
use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};
use crate::significance::{self, COVERAGE_LEVELS, SignificanceCutoff};
use crate::source::{CorpusSource, CorpusText};
use crate::store::{CacheKey, CacheMeta, CacheSlot, CacheStore, CachedTable};

/// Ledger name of the normalization function.
pub const NORMALIZE_FUNCTION: &str = "normalize";

/// Truncation settings for reference tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    /// Share of squared mass the in-memory table must cover.
    pub coverage: f64,
    /// Extra buckets kept beyond the significance count.
    pub slack: usize,
    /// Coverage levels whose cutoffs are recorded with each persisted table.
    /// Persisted tables are truncated at the largest of them.
    pub recorded_coverages: Vec<f64>,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            coverage: 0.9,
            slack: 3,
            recorded_coverages: COVERAGE_LEVELS.to_vec(),
        }
    }
}

/// Why a persisted table no longer matches its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    SourceChanged,
    NormalizeChanged,
    CategorizersChanged,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SourceChanged => "source changed",
            Self::NormalizeChanged => "normalizer changed",
            Self::CategorizersChanged => "categorizer changed",
        };
        f.write_str(text)
    }
}

/// State of the persisted table for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Stale(StaleReason),
    Missing,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh => f.write_str("fresh"),
            Self::Stale(reason) => write!(f, "stale ({reason})"),
            Self::Missing => f.write_str("missing"),
        }
    }
}

#[derive(Debug)]
struct LoadedTable {
    table: Arc<FrequencyTable>,
    significance: Vec<SignificanceCutoff>,
}

/// Known-good values of one type and the tables derived from them.
///
/// Tables are computed on first use, persisted through the cache store, and
/// kept in memory afterwards. A persisted table is reused only when its
/// source signature, normalizer hash and categorizer hash all match.
pub struct ReferenceCorpus {
    type_name: String,
    source: Box<dyn CorpusSource>,
    normalizer: Normalizer,
    categorizers: Arc<CategorizerSet>,
    store: Arc<dyn CacheStore>,
    settings: CorpusSettings,
    text: OnceLock<Arc<CorpusText>>,
    loaded: RwLock<HashMap<CacheSlot, Arc<LoadedTable>>>,
    build_locks: Mutex<HashMap<CacheSlot, Arc<Mutex<()>>>>,
}

impl ReferenceCorpus {
    pub fn new(
        type_name: impl Into<String>,
        source: Box<dyn CorpusSource>,
        normalizer: Normalizer,
        categorizers: Arc<CategorizerSet>,
        store: Arc<dyn CacheStore>,
        settings: CorpusSettings,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            source,
            normalizer,
            categorizers,
            store,
            settings,
            text: OnceLock::new(),
            loaded: RwLock::new(HashMap::new()),
            build_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn settings(&self) -> &CorpusSettings {
        &self.settings
    }

    /// SHA-256 of the source text, read once per process.
    pub fn source_signature(&self) -> Result<String> {
        Ok(self.text()?.signature.clone())
    }

    /// Reference table at `level`, truncated to the configured coverage.
    pub fn get(&self, level: Level) -> Result<Arc<FrequencyTable>> {
        Ok(Arc::clone(&self.loaded(CacheSlot::Level(level))?.table))
    }

    /// Normalized value counts of the whole corpus.
    pub fn base(&self) -> Result<Arc<FrequencyTable>> {
        Ok(Arc::clone(&self.loaded(CacheSlot::Base)?.table))
    }

    /// Significance count of the full table at `level` for `coverage`.
    ///
    /// Recorded coverages are answered from the table metadata. Any other
    /// coverage is computed exactly by recategorizing the base table.
    pub fn significance_count(&self, level: Level, coverage: f64) -> Result<usize> {
        let loaded = self.loaded(CacheSlot::Level(level))?;
        if let Some(count) = significance::recorded_count(&loaded.significance, coverage) {
            return Ok(count);
        }
        let full = self.categorizer(level)?.apply(&self.loaded(CacheSlot::Base)?.table);
        Ok(significance::significance_count(&full, coverage))
    }

    /// Compare the persisted table at `slot` with the current inputs.
    pub fn status(&self, slot: CacheSlot) -> Result<CacheStatus> {
        self.check_level(slot)?;
        let expected = self.expected_meta(slot)?;
        let stored = match self.store.load(&self.key(slot)) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(key = %self.key(slot), error = %err, "cache entry unreadable");
                None
            }
        };
        let Some(stored) = stored else {
            return Ok(CacheStatus::Missing);
        };
        let meta = &stored.meta;
        let status = if meta.source_signature != expected.source_signature {
            CacheStatus::Stale(StaleReason::SourceChanged)
        } else if meta.normalize_hash != expected.normalize_hash {
            CacheStatus::Stale(StaleReason::NormalizeChanged)
        } else if meta.categorizer_hash != expected.categorizer_hash {
            CacheStatus::Stale(StaleReason::CategorizersChanged)
        } else {
            CacheStatus::Fresh
        };
        Ok(status)
    }

    /// Build or load every table of this corpus.
    pub fn warm(&self) -> Result<()> {
        self.loaded(CacheSlot::Base)?;
        for level in self.categorizers.levels() {
            self.loaded(CacheSlot::Level(level))?;
        }
        Ok(())
    }

    fn text(&self) -> Result<Arc<CorpusText>> {
        if let Some(text) = self.text.get() {
            return Ok(Arc::clone(text));
        }
        let text = Arc::new(self.source.read()?);
        tracing::debug!(
            corpus = self.name(),
            type_name = %self.type_name,
            lines = text.lines.len(),
            "read reference corpus"
        );
        Ok(Arc::clone(self.text.get_or_init(|| text)))
    }

    fn key(&self, slot: CacheSlot) -> CacheKey {
        CacheKey::new(self.type_name.clone(), self.name().to_string(), slot)
    }

    fn check_level(&self, slot: CacheSlot) -> Result<()> {
        match slot {
            CacheSlot::Level(level) if !self.categorizers.contains(level) => {
                Err(CorpusError::UnknownLevel {
                    corpus: self.name().to_string(),
                    level,
                })
            }
            _ => Ok(()),
        }
    }

    fn expected_meta(&self, slot: CacheSlot) -> Result<CacheMeta> {
        Ok(CacheMeta {
            source_signature: self.source_signature()?,
            normalize_hash: self.normalizer.content_hash(),
            categorizer_hash: match slot {
                CacheSlot::Base => None,
                CacheSlot::Level(level) => Some(self.categorizers.hash_through(level)),
            },
            significance: Vec::new(),
            bucket_count: 0,
        })
    }

    fn cached(&self, slot: CacheSlot) -> Option<Arc<LoadedTable>> {
        let loaded = self.loaded.read().unwrap_or_else(PoisonError::into_inner);
        loaded.get(&slot).cloned()
    }

    fn build_lock(&self, slot: CacheSlot) -> Arc<Mutex<()>> {
        let mut locks = self.build_locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(slot).or_default())
    }

    fn loaded(&self, slot: CacheSlot) -> Result<Arc<LoadedTable>> {
        self.check_level(slot)?;
        if let Some(loaded) = self.cached(slot) {
            return Ok(loaded);
        }

        // One builder per slot; others wait and then find it in memory.
        let lock = self.build_lock(slot);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(loaded) = self.cached(slot) {
            return Ok(loaded);
        }

        let expected = self.expected_meta(slot)?;
        let key = self.key(slot);
        let stored = match self.store.load(&key) {
            Ok(stored) => stored.filter(|stored| stored.meta.same_inputs(&expected)),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "cache entry unreadable, rebuilding");
                None
            }
        };

        let cached = match stored {
            Some(stored) => {
                tracing::trace!(key = %key, "reusing persisted table");
                stored
            }
            None => self.rebuild(slot, expected)?,
        };

        let loaded = Arc::new(self.to_loaded(slot, cached));
        let mut tables = self.loaded.write().unwrap_or_else(PoisonError::into_inner);
        tables.insert(slot, Arc::clone(&loaded));
        Ok(loaded)
    }

    fn to_loaded(&self, slot: CacheSlot, cached: CachedTable) -> LoadedTable {
        let persisted = cached.to_table();
        let table = match slot {
            CacheSlot::Base => persisted,
            CacheSlot::Level(_) => {
                let coverage = self.settings.coverage;
                // Tables written with other settings lack this cutoff; their
                // head still covers the largest recorded coverage.
                let count = significance::recorded_count(&cached.meta.significance, coverage)
                    .unwrap_or_else(|| significance::significance_count(&persisted, coverage));
                persisted.truncated(count + self.settings.slack)
            }
        };
        LoadedTable {
            table: Arc::new(table),
            significance: cached.meta.significance,
        }
    }

    fn rebuild(&self, slot: CacheSlot, mut meta: CacheMeta) -> Result<CachedTable> {
        let key = self.key(slot);
        let _span = tracing::debug_span!("rebuild_table", key = %key).entered();

        let (full, function, hash) = match slot {
            CacheSlot::Base => (
                self.normalized_counts()?,
                NORMALIZE_FUNCTION.to_string(),
                self.normalizer.content_hash(),
            ),
            CacheSlot::Level(level) => {
                let categorizer = self.categorizer(level)?;
                let base = self.loaded(CacheSlot::Base)?;
                (
                    categorizer.apply(&base.table),
                    categorizer.name(),
                    categorizer.content_hash(),
                )
            }
        };

        let sorted = full.sorted_desc();
        let counts: Vec<u64> = sorted.iter().map(|(_, count)| *count).collect();
        meta.significance = significance::cutoffs(&counts, &self.cutoff_coverages());
        meta.bucket_count = sorted.len();

        let entries = match slot {
            CacheSlot::Base => sorted,
            CacheSlot::Level(_) => {
                let keep = meta
                    .significance
                    .iter()
                    .map(|cutoff| cutoff.count)
                    .max()
                    .unwrap_or(counts.len())
                    + self.settings.slack;
                sorted.into_iter().take(keep).collect()
            }
        };
        let table = CachedTable { meta, entries };

        if let Err(err) = self.store.save(&key, &table) {
            tracing::warn!(key = %key, error = %err, "failed to persist reference table");
        }
        self.note_function(&function, &hash);
        tracing::debug!(
            key = %key,
            buckets = table.meta.bucket_count,
            kept = table.entries.len(),
            "rebuilt reference table"
        );
        Ok(table)
    }

    fn categorizer(&self, level: Level) -> Result<&Categorizer> {
        self.categorizers
            .get(level)
            .ok_or_else(|| CorpusError::UnknownLevel {
                corpus: self.name().to_string(),
                level,
            })
    }

    /// Recorded coverages plus the in-memory coverage.
    fn cutoff_coverages(&self) -> Vec<f64> {
        let coverage = self.settings.coverage;
        let mut coverages = self.settings.recorded_coverages.clone();
        if !coverages.iter().any(|c| (c - coverage).abs() < 1e-9) {
            coverages.push(coverage);
        }
        coverages
    }

    fn note_function(&self, function: &str, hash: &str) {
        match self.store.record_function(&self.type_name, function, hash) {
            Ok(Some(previous)) if previous != hash => {
                tracing::info!(
                    type_name = %self.type_name,
                    function,
                    "function changed since tables were last built"
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(type_name = %self.type_name, function, error = %err, "failed to update function ledger");
            }
        }
    }

    fn normalized_counts(&self) -> Result<FrequencyTable> {
        let text = self.text()?;
        let raw = FrequencyTable::from_values(&text.lines);
        Ok(raw.relabel(|value| self.normalizer.apply(value)))
    }
}

impl fmt::Debug for ReferenceCorpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceCorpus")
            .field("type_name", &self.type_name)
            .field("source", &self.source)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryCorpusSource;
    use crate::store::MemoryCacheStore;
    use coltype_model::{Categorizer, Outcome};

    fn level(value: u8) -> Level {
        Level::new(value).unwrap()
    }

    fn categorizers() -> Arc<CategorizerSet> {
        let mut set = CategorizerSet::new();
        set.insert(Categorizer::per_value(level(5), "length", |v| {
            Outcome::Keep(v.chars().count().to_string())
        }))
        .unwrap();
        set.insert(Categorizer::per_value(level(99), "identity", |v| {
            Outcome::Keep(v.to_string())
        }))
        .unwrap();
        Arc::new(set)
    }

    fn corpus(store: Arc<MemoryCacheStore>, lines: &[&str]) -> ReferenceCorpus {
        ReferenceCorpus::new(
            "word",
            Box::new(MemoryCorpusSource::new("words", lines.iter().copied())),
            Normalizer::new("lower", |v: &str| {
                let v = v.trim().to_lowercase();
                if v.is_empty() {
                    Outcome::Skip
                } else {
                    Outcome::Keep(v)
                }
            }),
            categorizers(),
            store,
            CorpusSettings::default(),
        )
    }

    #[test]
    fn base_counts_normalized_values() {
        let corpus = corpus(Arc::new(MemoryCacheStore::new()), &["Ab", "ab ", "  ", "cde"]);
        let base = corpus.base().unwrap();
        assert_eq!(base.get("ab"), 2);
        assert_eq!(base.get("cde"), 1);
        assert_eq!(base.total(), 3);
    }

    #[test]
    fn level_table_is_truncated_to_coverage() {
        let mut lines = vec!["aaaa"; 50];
        lines.extend(["b", "cc", "ddd", "eeeee", "ffffff", "ggggggg", "hhhhhhhh"]);
        let corpus = corpus(Arc::new(MemoryCacheStore::new()), &lines);
        let lengths = corpus.get(level(5)).unwrap();
        // One dominant bucket plus the slack.
        assert_eq!(lengths.len(), 1 + 3);
        assert_eq!(lengths.get("4"), 50);
        assert_eq!(corpus.significance_count(level(5), 0.9).unwrap(), 1);
    }

    #[test]
    fn unrecorded_coverage_counts_the_full_table() {
        let tail: Vec<String> = (0..50).map(|i| format!("v{i:02}")).collect();
        let mut lines = vec!["big"; 1000];
        lines.extend(tail.iter().map(String::as_str));
        let corpus = corpus(Arc::new(MemoryCacheStore::new()), &lines);
        assert_eq!(corpus.get(level(99)).unwrap().len(), 1 + 3);
        assert_eq!(corpus.significance_count(level(99), 0.999).unwrap(), 1);
        // 40 singletons past the retained head are needed to reach this share.
        assert_eq!(corpus.significance_count(level(99), 0.99999).unwrap(), 41);
    }

    #[test]
    fn tables_are_built_once() {
        let store = Arc::new(MemoryCacheStore::new());
        let corpus = corpus(Arc::clone(&store), &["a", "bb", "bb"]);
        corpus.get(level(5)).unwrap();
        corpus.get(level(5)).unwrap();
        // base + cat05
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn fresh_corpus_reuses_persisted_tables() {
        let store = Arc::new(MemoryCacheStore::new());
        corpus(Arc::clone(&store), &["a", "bb"]).warm().unwrap();
        let saves = store.save_count();

        let again = corpus(Arc::clone(&store), &["a", "bb"]);
        assert_eq!(again.status(CacheSlot::Level(level(99))).unwrap(), CacheStatus::Fresh);
        again.warm().unwrap();
        assert_eq!(store.save_count(), saves);
    }

    #[test]
    fn changed_source_is_stale() {
        let store = Arc::new(MemoryCacheStore::new());
        corpus(Arc::clone(&store), &["a", "bb"]).warm().unwrap();
        let changed = corpus(Arc::clone(&store), &["a", "bb", "ccc"]);
        assert_eq!(
            changed.status(CacheSlot::Base).unwrap(),
            CacheStatus::Stale(StaleReason::SourceChanged)
        );
        assert_eq!(changed.get(level(5)).unwrap().get("3"), 1);
    }

    #[test]
    fn unknown_level_is_an_error() {
        let corpus = corpus(Arc::new(MemoryCacheStore::new()), &["a"]);
        let err = corpus.get(level(42)).unwrap_err();
        assert!(matches!(err, CorpusError::UnknownLevel { .. }));
    }

    #[test]
    fn missing_status_before_first_build() {
        let corpus = corpus(Arc::new(MemoryCacheStore::new()), &["a"]);
        assert_eq!(corpus.status(CacheSlot::Base).unwrap(), CacheStatus::Missing);
    }
}
