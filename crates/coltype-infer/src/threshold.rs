//! Adaptive acceptance thresholds for funnel stages.

use std::fmt;

use crate::scores::LevelScores;

/// Computes the distance below which a level counts as matching, from the
/// scores of every candidate still in a stage.
pub trait ThresholdPolicy: Send + Sync + fmt::Debug {
    fn threshold(&self, candidates: &[&LevelScores]) -> f64;
}

/// Square root of the best mean squared distance plus the sample standard
/// deviation of the mean squared distances across candidates.
///
/// Empirically tuned: with one clear winner the spread widens the threshold
/// just enough to tolerate some contamination in its column.
#[derive(Debug, Clone, Copy, Default)]
pub struct RmsSpread;

impl ThresholdPolicy for RmsSpread {
    fn threshold(&self, candidates: &[&LevelScores]) -> f64 {
        let mean_squares: Vec<f64> = candidates.iter().map(|s| s.mean_square()).collect();
        let Some(best) = mean_squares.iter().copied().reduce(f64::min) else {
            return 0.0;
        };
        best.sqrt() + sample_std_dev(&mean_squares)
    }
}

/// Standard deviation with one degree of freedom removed; `0` below two values.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
