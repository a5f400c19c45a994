//! Frequency tables: bucket label to occurrence count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::Outcome;

/// Mapping from bucket label to occurrence count.
///
/// Empty labels are never stored: they stand for missing or rejected values
/// and must not take part in any statistical comparison. Duplicate labels are
/// aggregated by summation on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: BTreeMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count raw values, one occurrence per item.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for value in values {
            table.add(value.as_ref(), 1);
        }
        table
    }

    /// Add `count` occurrences of `label`. Empty labels and zero counts are ignored.
    pub fn add(&mut self, label: impl AsRef<str>, count: u64) {
        let label = label.as_ref();
        if label.is_empty() || count == 0 {
            return;
        }
        match self.counts.get_mut(label) {
            Some(existing) => *existing += count,
            None => {
                self.counts.insert(label.to_string(), count);
            }
        }
    }

    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Entries in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    /// Map every label through `f` and aggregate the counts of equal results.
    ///
    /// Labels mapped to [`Outcome::Skip`] or to an empty string are dropped.
    pub fn relabel<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&str) -> Outcome<String>,
    {
        let mut out = Self::new();
        for (label, count) in &self.counts {
            if let Outcome::Keep(mapped) = f(label) {
                out.add(mapped, *count);
            }
        }
        out
    }

    /// Entries sorted by descending count; ties are ordered by label.
    pub fn sorted_desc(&self) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|(label, count)| (label.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    /// Keep only the `n` highest-count buckets.
    pub fn truncated(&self, n: usize) -> Self {
        if n >= self.len() {
            return self.clone();
        }
        self.sorted_desc().into_iter().take(n).collect()
    }
}

impl FromIterator<(String, u64)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl Extend<(String, u64)> for FrequencyTable {
    fn extend<T: IntoIterator<Item = (String, u64)>>(&mut self, iter: T) {
        for (label, count) in iter {
            self.add(label, count);
        }
    }
}

impl<'a> FromIterator<(&'a str, u64)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (&'a str, u64)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (label, count) in iter {
            table.add(label, count);
        }
        table
    }
}
