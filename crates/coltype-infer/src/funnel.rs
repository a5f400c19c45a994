//! Funnel stages and per-stage candidate filtering.
//!
//! Each stage compares the surviving candidates on one band of categorizer
//! levels, then keeps only those whose accumulated per-level distances are
//! mostly below an adaptive threshold. Later stages are more expensive and
//! only run while more than one candidate is left.

use std::cmp::Ordering;
use std::sync::Arc;

use coltype_model::LevelRange;
use serde::{Deserialize, Serialize};

use crate::definition::TypeDefinition;
use crate::scores::LevelScores;
use crate::threshold::ThresholdPolicy;

/// Fraction required when no candidate has any level below the threshold.
const FALLBACK_FRACTION: f64 = 0.9;

/// One funnel stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub levels: LevelRange,
    /// Number of values sampled from the column; absent means the whole column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<usize>,
    /// Upper bound on the adaptive threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<f64>,
    /// Share of a candidate's levels that must be below the threshold.
    /// Absent means the best share reached by any candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction: Option<f64>,
}

impl StageConfig {
    pub fn new(levels: LevelRange, sample_size: Option<usize>) -> Self {
        Self {
            levels,
            sample_size,
            ceiling: None,
            fraction: None,
        }
    }

    pub fn with_ceiling(mut self, ceiling: f64) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = Some(fraction);
        self
    }
}

/// Parameters of the cheap re-validation of a single type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// The column is sampled with stride `max(1, n / sample_divisor)`.
    pub sample_divisor: usize,
    pub levels: LevelRange,
    /// Every level distance must stay below this value.
    pub ceiling: f64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            sample_divisor: 97,
            levels: LevelRange::SHAPE,
            ceiling: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunnelConfig {
    pub stages: Vec<StageConfig>,
    /// Stop after this many stages, trading precision for latency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stages: Option<usize>,
    pub verify: VerifyConfig,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            stages: vec![
                StageConfig::new(LevelRange::SHAPE, Some(47))
                    .with_ceiling(0.7)
                    .with_fraction(0.95),
                StageConfig::new(LevelRange::PRESENCE, Some(47)),
                StageConfig::new(LevelRange::COMPRESSED, Some(47)),
                StageConfig::new(LevelRange::DETAIL, Some(347)),
                StageConfig::new(LevelRange::EXACT, None),
            ],
            max_stages: None,
            verify: VerifyConfig::default(),
        }
    }
}

/// A type still in the running, with its scores so far.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub definition: Arc<TypeDefinition>,
    pub scores: LevelScores,
}

impl Candidate {
    pub fn new(definition: Arc<TypeDefinition>) -> Self {
        Self {
            definition,
            scores: LevelScores::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }
}

/// Keep the candidates that pass `stage`, best first.
pub fn filter_candidates(
    candidates: Vec<Candidate>,
    stage: &StageConfig,
    policy: &dyn ThresholdPolicy,
) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let scores: Vec<&LevelScores> = candidates.iter().map(|c| &c.scores).collect();
    let mut threshold = policy.threshold(&scores);
    if let Some(ceiling) = stage.ceiling {
        threshold = threshold.min(ceiling);
    }

    let fractions: Vec<f64> = candidates
        .iter()
        .map(|c| c.scores.fraction_below(threshold))
        .collect();
    let required = stage.fraction.unwrap_or_else(|| {
        let best = fractions.iter().copied().fold(0.0, f64::max);
        if best > 0.0 { best } else { FALLBACK_FRACTION }
    });
    tracing::debug!(threshold, required, candidates = candidates.len(), "stage threshold");

    let mut survivors: Vec<Candidate> = candidates
        .into_iter()
        .zip(fractions)
        .filter_map(|(candidate, fraction)| {
            tracing::trace!(
                type_name = candidate.name(),
                mean = candidate.scores.mean(),
                fraction,
                "candidate scored"
            );
            (fraction >= required).then_some(candidate)
        })
        .collect();
    survivors.sort_by(compare_candidates);
    survivors
}

fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    a.scores
        .mean()
        .total_cmp(&b.scores.mean())
        .then_with(|| a.name().cmp(b.name()))
}
