//! Classification functions supplied by type authors.
//!
//! Normalizers, validators and categorizers are total functions: a value they
//! cannot handle yields [`Outcome::Skip`] instead of an error. Each carries a
//! fingerprint so cached reference tables can detect a change in logic.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ModelError;
use crate::fingerprint::fingerprint_hash;
use crate::level::{Level, LevelRange};
use crate::table::FrequencyTable;

/// Result of applying a classification function to a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Keep(T),
    /// The value is not meaningful for this function and is left out.
    Skip,
}

impl<T> Outcome<T> {
    pub fn keep(self) -> Option<T> {
        match self {
            Self::Keep(value) => Some(value),
            Self::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Keep(value) => Outcome::Keep(f(value)),
            Self::Skip => Outcome::Skip,
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Outcome<U>) -> Outcome<U> {
        match self {
            Self::Keep(value) => f(value),
            Self::Skip => Outcome::Skip,
        }
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Skip, Self::Keep)
    }
}

type ValueFn = dyn Fn(&str) -> Outcome<String> + Send + Sync;
type PredicateFn = dyn Fn(&str) -> bool + Send + Sync;

/// Cleans a raw value into the canonical form of a type.
#[derive(Clone)]
pub struct Normalizer {
    fingerprint: String,
    func: Arc<ValueFn>,
}

impl Normalizer {
    pub fn new<F>(fingerprint: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Outcome<String> + Send + Sync + 'static,
    {
        Self {
            fingerprint: fingerprint.into(),
            func: Arc::new(func),
        }
    }

    /// Keeps every non-empty value as is.
    pub fn identity() -> Self {
        Self::new("identity", |value| {
            if value.is_empty() {
                Outcome::Skip
            } else {
                Outcome::Keep(value.to_string())
            }
        })
    }

    pub fn apply(&self, value: &str) -> Outcome<String> {
        (self.func)(value)
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn content_hash(&self) -> String {
        fingerprint_hash(["normalize", self.fingerprint.as_str()])
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Decides whether an already normalized value is a valid instance of a type.
#[derive(Clone)]
pub struct Validator {
    fingerprint: String,
    func: Arc<PredicateFn>,
}

impl Validator {
    pub fn new<F>(fingerprint: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            fingerprint: fingerprint.into(),
            func: Arc::new(func),
        }
    }

    pub fn is_valid(&self, value: &str) -> bool {
        (self.func)(value)
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Coarsens a frequency table into comparable buckets.
///
/// Implementations must be deterministic: the same input always gives the
/// same output, otherwise cached reference tables are meaningless.
pub trait Categorize: Send + Sync {
    fn categorize(&self, table: &FrequencyTable) -> FrequencyTable;
}

struct PerValue<F>(F);

impl<F> Categorize for PerValue<F>
where
    F: Fn(&str) -> Outcome<String> + Send + Sync,
{
    fn categorize(&self, table: &FrequencyTable) -> FrequencyTable {
        table.relabel(|label| (self.0)(label))
    }
}

/// A categorizer bound to its level.
#[derive(Clone)]
pub struct Categorizer {
    level: Level,
    fingerprint: String,
    func: Arc<dyn Categorize>,
}

impl Categorizer {
    /// Categorizer that maps each value label independently.
    pub fn per_value<F>(level: Level, fingerprint: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> Outcome<String> + Send + Sync + 'static,
    {
        Self::from_table_fn(level, fingerprint, PerValue(func))
    }

    /// Categorizer working on the whole table at once.
    pub fn from_table_fn(
        level: Level,
        fingerprint: impl Into<String>,
        func: impl Categorize + 'static,
    ) -> Self {
        Self {
            level,
            fingerprint: fingerprint.into(),
            func: Arc::new(func),
        }
    }

    /// The same categorizer moved to another level.
    pub fn at_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn apply(&self, table: &FrequencyTable) -> FrequencyTable {
        self.func.categorize(table)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Ledger name, e.g. `cat05`.
    pub fn name(&self) -> String {
        self.level.name()
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn content_hash(&self) -> String {
        fingerprint_hash([self.name().as_str(), self.fingerprint.as_str()])
    }
}

impl fmt::Debug for Categorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Categorizer")
            .field("level", &self.level)
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// The categorizers of one type, at most one per level.
#[derive(Debug, Clone, Default)]
pub struct CategorizerSet {
    by_level: BTreeMap<Level, Categorizer>,
}

impl CategorizerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the categorizer's own level; fails when the level is taken.
    pub fn insert(&mut self, categorizer: Categorizer) -> Result<(), ModelError> {
        if let Some(existing) = self.by_level.get(&categorizer.level()) {
            return Err(ModelError::LevelOccupied {
                level: categorizer.level().to_string(),
                existing: existing.fingerprint().to_string(),
            });
        }
        self.by_level.insert(categorizer.level(), categorizer);
        Ok(())
    }

    /// Insert or overwrite at the categorizer's own level.
    pub fn replace(&mut self, categorizer: Categorizer) -> Option<Categorizer> {
        self.by_level.insert(categorizer.level(), categorizer)
    }

    /// Insert at the requested level or the first free level above it.
    pub fn insert_at_free_level(&mut self, categorizer: Categorizer) -> Result<Level, ModelError> {
        let requested = categorizer.level();
        let mut level = requested;
        while self.by_level.contains_key(&level) {
            level = level.next().ok_or_else(|| ModelError::NoFreeLevel {
                from: requested.to_string(),
            })?;
        }
        self.by_level.insert(level, categorizer.at_level(level));
        Ok(level)
    }

    pub fn get(&self, level: Level) -> Option<&Categorizer> {
        self.by_level.get(&level)
    }

    pub fn contains(&self, level: Level) -> bool {
        self.by_level.contains_key(&level)
    }

    pub fn len(&self) -> usize {
        self.by_level.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_level.is_empty()
    }

    /// Categorizers in ascending level order.
    pub fn iter(&self) -> impl Iterator<Item = &Categorizer> {
        self.by_level.values()
    }

    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        self.by_level.keys().copied()
    }

    pub fn in_range(&self, range: LevelRange) -> impl Iterator<Item = &Categorizer> {
        self.by_level
            .values()
            .filter(move |categorizer| range.contains(categorizer.level()))
    }

    /// Hash of every categorizer at or below `level`.
    ///
    /// Lower levels are included because higher tables may be derived from
    /// them; a change anywhere below invalidates the table at `level`.
    pub fn hash_through(&self, level: Level) -> String {
        let parts: Vec<String> = self
            .by_level
            .range(..=level)
            .map(|(_, categorizer)| categorizer.content_hash())
            .collect();
        fingerprint_hash(parts)
    }
}
