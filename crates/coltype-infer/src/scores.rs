//! Per-level distances accumulated across funnel stages.

use std::collections::BTreeMap;

use coltype_model::Level;

/// Distance per categorizer level for one candidate type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelScores {
    by_level: BTreeMap<Level, f64>,
}

impl LevelScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, level: Level, distance: f64) {
        self.by_level.insert(level, distance);
    }

    pub fn get(&self, level: Level) -> Option<f64> {
        self.by_level.get(&level).copied()
    }

    pub fn len(&self) -> usize {
        self.by_level.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_level.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, f64)> + '_ {
        self.by_level.iter().map(|(level, d)| (*level, *d))
    }

    /// Mean distance; `1.0` without any score.
    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            return 1.0;
        }
        self.by_level.values().sum::<f64>() / self.len() as f64
    }

    /// Mean of squared distances; `1.0` without any score.
    pub fn mean_square(&self) -> f64 {
        if self.is_empty() {
            return 1.0;
        }
        self.by_level.values().map(|d| d * d).sum::<f64>() / self.len() as f64
    }

    /// Share of levels with a distance strictly below `threshold`.
    pub fn fraction_below(&self, threshold: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let below = self.by_level.values().filter(|d| **d < threshold).count();
        below as f64 / self.len() as f64
    }
}

impl FromIterator<(Level, f64)> for LevelScores {
    fn from_iter<T: IntoIterator<Item = (Level, f64)>>(iter: T) -> Self {
        Self {
            by_level: iter.into_iter().collect(),
        }
    }
}
