//! Significance-based truncation of reference tables.
//!
//! The chi-square distance is dominated by the heaviest buckets, so only the
//! head of a reference distribution is kept. The significance count is the
//! number of leading buckets whose squared counts reach a given share of the
//! total squared mass.

use coltype_model::FrequencyTable;
use serde::{Deserialize, Serialize};

/// Coverage levels recorded with every persisted table.
pub const COVERAGE_LEVELS: [f64; 6] = [0.5, 0.75, 0.9, 0.95, 0.99, 0.999];

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceCutoff {
    pub coverage: f64,
    pub count: usize,
}

/// Significance count of a table for `coverage` in `[0, 1]`.
pub fn significance_count(table: &FrequencyTable, coverage: f64) -> usize {
    let counts: Vec<u64> = table.sorted_desc().into_iter().map(|(_, c)| c).collect();
    count_for_coverage(&counts, coverage)
}

/// Same as [`significance_count`] for counts already sorted descending.
pub fn count_for_coverage(sorted_counts: &[u64], coverage: f64) -> usize {
    let total: f64 = sorted_counts.iter().map(|&c| square(c)).sum();
    if total <= 0.0 {
        return 0;
    }
    let target = coverage.clamp(0.0, 1.0) * total;
    let mut acc = 0.0;
    for (index, &count) in sorted_counts.iter().enumerate() {
        acc += square(count);
        if acc >= target - EPSILON {
            return index + 1;
        }
    }
    sorted_counts.len()
}

/// Cutoffs for each of `levels`, in the given order.
pub fn cutoffs(sorted_counts: &[u64], levels: &[f64]) -> Vec<SignificanceCutoff> {
    levels
        .iter()
        .map(|&coverage| SignificanceCutoff {
            coverage,
            count: count_for_coverage(sorted_counts, coverage),
        })
        .collect()
}

/// Recorded count for `coverage`, if that exact coverage was recorded.
pub fn recorded_count(cutoffs: &[SignificanceCutoff], coverage: f64) -> Option<usize> {
    cutoffs
        .iter()
        .find(|cutoff| (cutoff.coverage - coverage).abs() < 1e-9)
        .map(|cutoff| cutoff.count)
}

fn square(count: u64) -> f64 {
    let c = count as f64;
    c * c
}
