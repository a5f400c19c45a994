//! Registry of type definitions and the funnel match.

use std::collections::BTreeMap;
use std::sync::Arc;

use coltype_corpus::{CacheSlot, CacheStatus};
use coltype_model::Column;

use crate::cancel::CancelToken;
use crate::definition::TypeDefinition;
use crate::error::{InferError, Result};
use crate::funnel::{Candidate, FunnelConfig, filter_candidates};
use crate::sample::{sample_values, strided_values};
use crate::scores::LevelScores;
use crate::threshold::{RmsSpread, ThresholdPolicy};

/// A type that survived the funnel.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub type_name: String,
    /// Mean of the per-level distances; lower is better.
    pub mean_distance: f64,
    pub scores: LevelScores,
}

/// Per-call controls for [`TypeRegistry::matches_with`].
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    /// Stop after this many stages; overrides the registry config when lower.
    pub max_stages: Option<usize>,
    pub cancel: CancelToken,
}

/// Cache state of one persisted table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheReportEntry {
    pub type_name: String,
    pub corpus: String,
    pub slot: CacheSlot,
    /// `None` when the corpus source cannot be read.
    pub status: Option<CacheStatus>,
}

/// Explicitly populated set of type definitions.
#[derive(Debug)]
pub struct TypeRegistry {
    types: BTreeMap<String, Arc<TypeDefinition>>,
    funnel: FunnelConfig,
    policy: Box<dyn ThresholdPolicy>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(FunnelConfig::default())
    }
}

impl TypeRegistry {
    pub fn new(funnel: FunnelConfig) -> Self {
        Self::with_policy(funnel, Box::new(RmsSpread))
    }

    pub fn with_policy(funnel: FunnelConfig, policy: Box<dyn ThresholdPolicy>) -> Self {
        Self {
            types: BTreeMap::new(),
            funnel,
            policy,
        }
    }

    pub fn register(&mut self, definition: TypeDefinition) -> Result<()> {
        let name = definition.name().to_string();
        if self.types.contains_key(&name) {
            return Err(InferError::DuplicateType { name });
        }
        tracing::debug!(type_name = %name, "registered type");
        self.types.insert(name, Arc::new(definition));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TypeDefinition>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDefinition>> {
        self.types.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn funnel(&self) -> &FunnelConfig {
        &self.funnel
    }

    /// Types the column plausibly holds, best first. Empty when no type is
    /// statistically close enough.
    pub fn matches(&self, column: &Column) -> Vec<MatchResult> {
        // Cancellation is the only failure and a fresh token is never cancelled.
        self.matches_with(column, &MatchOptions::default())
            .unwrap_or_default()
    }

    /// [`matches`](Self::matches) with a stage cap and cancellation.
    pub fn matches_with(&self, column: &Column, options: &MatchOptions) -> Result<Vec<MatchResult>> {
        let _span = tracing::info_span!("matches", column = column.name()).entered();
        let present: Vec<&str> = column.present().collect();

        let max_stages = [self.funnel.max_stages, options.max_stages]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(usize::MAX);

        let mut candidates: Vec<Candidate> =
            self.types.values().cloned().map(Candidate::new).collect();
        let mut previous: Vec<Candidate> = Vec::new();

        for (index, stage) in self.funnel.stages.iter().enumerate().take(max_stages) {
            if index > 0 && candidates.len() <= 1 {
                break;
            }
            let _stage_span =
                tracing::info_span!("funnel_stage", stage = index + 1, levels = %stage.levels)
                    .entered();

            let sample = sample_values(&present, stage.sample_size);
            let mut evaluated = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                if options.cancel.is_cancelled() {
                    tracing::info!(stage = index + 1, "match cancelled");
                    return Err(InferError::Cancelled);
                }
                let Candidate { definition, scores } = candidate;
                match definition.match_sample(&sample, stage.levels, scores) {
                    Ok(scores) => evaluated.push(Candidate { definition, scores }),
                    Err(err) => {
                        tracing::warn!(
                            type_name = definition.name(),
                            error = %err,
                            "dropping type from match"
                        );
                    }
                }
            }

            let survivors = filter_candidates(evaluated, stage, self.policy.as_ref());
            tracing::debug!(
                sample = sample.len(),
                survivors = survivors.len(),
                "stage finished"
            );
            if survivors.is_empty() {
                candidates = Vec::new();
                break;
            }
            previous = survivors.clone();
            candidates = survivors;
        }

        let winners = if candidates.is_empty() { previous } else { candidates };
        let results: Vec<MatchResult> = winners
            .into_iter()
            .map(|candidate| MatchResult {
                type_name: candidate.name().to_string(),
                mean_distance: candidate.scores.mean(),
                scores: candidate.scores,
            })
            .collect();
        tracing::info!(
            matches = results.len(),
            best = results.first().map(|r| r.type_name.as_str()),
            "column matched"
        );
        Ok(results)
    }

    /// Cheap re-check of an assigned type on the first funnel band only.
    pub fn verify(&self, type_name: &str, column: &Column) -> Result<bool> {
        let definition = self.get(type_name).ok_or_else(|| InferError::UnknownType {
            name: type_name.to_string(),
        })?;
        let verify = &self.funnel.verify;
        let present: Vec<&str> = column.present().collect();
        let sample = strided_values(&present, verify.sample_divisor);
        let scores = definition.match_sample(&sample, verify.levels, LevelScores::new())?;
        let verified = scores.iter().all(|(_, d)| d < verify.ceiling);
        tracing::debug!(type_name, column = column.name(), verified, "verified column");
        Ok(verified)
    }

    /// State of every persisted table, without recomputing anything.
    pub fn cache_report(&self) -> Result<Vec<CacheReportEntry>> {
        let mut report = Vec::new();
        for definition in self.types.values() {
            let slots: Vec<CacheSlot> = std::iter::once(CacheSlot::Base)
                .chain(definition.categorizers().levels().map(CacheSlot::Level))
                .collect();
            for corpus in definition.corpora() {
                for &slot in &slots {
                    let status = match corpus.status(slot) {
                        Ok(status) => Some(status),
                        Err(err) if err.is_unavailable() => None,
                        Err(err) => return Err(err.into()),
                    };
                    report.push(CacheReportEntry {
                        type_name: definition.name().to_string(),
                        corpus: corpus.name().to_string(),
                        slot,
                        status,
                    });
                }
            }
        }
        Ok(report)
    }

    /// Load or build every reference table. Returns the number of corpora
    /// warmed; unavailable corpora are skipped with a warning.
    pub fn warm(&self) -> Result<usize> {
        let mut warmed = 0;
        for definition in self.types.values() {
            for corpus in definition.corpora() {
                match corpus.warm() {
                    Ok(()) => warmed += 1,
                    Err(err) if err.is_unavailable() => {
                        tracing::warn!(
                            type_name = definition.name(),
                            corpus = corpus.name(),
                            error = %err,
                            "skipping unavailable corpus"
                        );
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        tracing::info!(corpora = warmed, "reference tables warm");
        Ok(warmed)
    }
}
