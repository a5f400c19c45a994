//! Type definitions: normalization, categorizers and reference corpora.

use std::fmt;
use std::sync::Arc;

use coltype_corpus::{CacheStore, CorpusError, CorpusSettings, CorpusSource, ReferenceCorpus};
use coltype_model::{
    Categorizer, CategorizerSet, FrequencyTable, Level, LevelRange, Normalizer, Outcome,
    Validator,
};
use regex::Regex;

use crate::distance::distance;
use crate::error::DefinitionError;
use crate::probe;
use crate::scores::LevelScores;

/// Level of the inclusion pattern categorizer.
pub const PATTERN_LEVEL: u8 = 15;
/// Level of the exclusion pattern categorizer.
pub const PATTERN_DETAIL_LEVEL: u8 = 75;
pub const VALIDATOR_LEVEL: u8 = 16;
pub const VALIDATOR_DETAIL_LEVEL: u8 = 76;

/// A semantic type that columns can be matched against.
pub struct TypeDefinition {
    name: String,
    description: Option<String>,
    normalizer: Normalizer,
    validator: Option<Validator>,
    categorizers: Arc<CategorizerSet>,
    corpora: Vec<ReferenceCorpus>,
}

impl TypeDefinition {
    pub fn builder(name: impl Into<String>) -> TypeDefinitionBuilder {
        TypeDefinitionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn categorizers(&self) -> &CategorizerSet {
        &self.categorizers
    }

    pub fn corpora(&self) -> &[ReferenceCorpus] {
        &self.corpora
    }

    pub fn normalize(&self, value: &str) -> Outcome<String> {
        self.normalizer.apply(value)
    }

    /// Normalize `value` and keep it only if it validates.
    pub fn convert(&self, value: &str) -> Outcome<String> {
        self.normalize(value).and_then(|normalized| match &self.validator {
            Some(validator) if !validator.is_valid(&normalized) => Outcome::Skip,
            _ => Outcome::Keep(normalized),
        })
    }

    pub fn validate(&self, value: &str) -> bool {
        !self.convert(value).is_skip()
    }

    /// Counts of the normalized sample values; rejected values are left out.
    pub fn observed_table(&self, sample: &[&str]) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for value in sample {
            if let Outcome::Keep(normalized) = self.normalize(value) {
                table.add(normalized, 1);
            }
        }
        table
    }

    /// Score `sample` on every categorizer level in `levels` and merge the
    /// distances into `previous`.
    ///
    /// Each level is scored against the closest of the type's corpora. A type
    /// without corpora scores `1.0` everywhere.
    pub fn match_sample(
        &self,
        sample: &[&str],
        levels: LevelRange,
        previous: LevelScores,
    ) -> Result<LevelScores, CorpusError> {
        let observed = self.observed_table(sample);
        let mut scores = previous;
        for categorizer in self.categorizers.in_range(levels) {
            let level = categorizer.level();
            let categorized = categorizer.apply(&observed);
            scores.insert(level, self.best_distance(level, &categorized)?);
        }
        Ok(scores)
    }

    fn best_distance(&self, level: Level, observed: &FrequencyTable) -> Result<f64, CorpusError> {
        let mut best = 1.0f64;
        for corpus in &self.corpora {
            let reference = corpus.get(level)?;
            best = best.min(distance(&reference, observed));
        }
        Ok(best)
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("name", &self.name)
            .field("normalizer", &self.normalizer)
            .field("validator", &self.validator)
            .field("categorizers", &self.categorizers.len())
            .field("corpora", &self.corpora.len())
            .finish()
    }
}

/// Builder for [`TypeDefinition`].
///
/// ```ignore
/// let definition = TypeDefinition::builder("customer_code")
///     .normalize(Normalizer::new("upper alnum 2014-03-04", normalize))
///     .pattern(r"[A-Z]{4}\d{4}")
///     .categorizers(standard_categorizers())
///     .corpus(FileCorpusSource::new("kpn", path))
///     .build(store, &CorpusSettings::default())?;
/// ```
pub struct TypeDefinitionBuilder {
    name: String,
    description: Option<String>,
    normalizer: Normalizer,
    pattern: Option<String>,
    validator: Option<Validator>,
    categorizers: Vec<Categorizer>,
    sources: Vec<Box<dyn CorpusSource>>,
}

impl TypeDefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            normalizer: Normalizer::identity(),
            pattern: None,
            validator: None,
            categorizers: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn normalize(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Regular expression a normalized value must match as a whole.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn categorizer(mut self, categorizer: Categorizer) -> Self {
        self.categorizers.push(categorizer);
        self
    }

    pub fn categorizers(mut self, categorizers: impl IntoIterator<Item = Categorizer>) -> Self {
        self.categorizers.extend(categorizers);
        self
    }

    pub fn corpus(mut self, source: impl CorpusSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn corpus_source(mut self, source: Box<dyn CorpusSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Probe every function, derive pattern and validator categorizers and
    /// attach the corpora to `store`.
    pub fn build(
        self,
        store: Arc<dyn CacheStore>,
        settings: &CorpusSettings,
    ) -> Result<TypeDefinition, DefinitionError> {
        let name = self.name;
        if name.trim().is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        let level_error = |source| DefinitionError::Categorizer {
            type_name: name.clone(),
            source,
        };

        let mut set = CategorizerSet::new();
        for categorizer in self.categorizers {
            set.insert(categorizer).map_err(level_error)?;
        }

        let pattern = self
            .pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                    DefinitionError::Pattern {
                        type_name: name.clone(),
                        source,
                    }
                })
            })
            .transpose()?;

        if let Some(regex) = &pattern {
            for at in [PATTERN_LEVEL, PATTERN_DETAIL_LEVEL] {
                set.insert_at_free_level(pattern_categorizer(&name, at, regex)?)
                    .map_err(level_error)?;
            }
        }
        if let Some(validator) = &self.validator {
            for at in [VALIDATOR_LEVEL, VALIDATOR_DETAIL_LEVEL] {
                set.insert_at_free_level(validator_categorizer(&name, at, validator)?)
                    .map_err(level_error)?;
            }
        }

        // Without an explicit validator the pattern decides validity.
        let validator = self.validator.or_else(|| {
            pattern.map(|regex| {
                Validator::new(format!("pattern {}", regex.as_str()), move |value| {
                    regex.is_match(value)
                })
            })
        });

        probe::normalizer(&name, &self.normalizer)?;
        if let Some(validator) = &validator {
            probe::validator(&name, validator)?;
        }
        for categorizer in set.iter() {
            probe::categorizer(&name, categorizer)?;
        }

        let categorizers = Arc::new(set);
        let corpora = self
            .sources
            .into_iter()
            .map(|source| {
                ReferenceCorpus::new(
                    name.clone(),
                    source,
                    self.normalizer.clone(),
                    Arc::clone(&categorizers),
                    Arc::clone(&store),
                    settings.clone(),
                )
            })
            .collect();

        tracing::debug!(
            type_name = %name,
            categorizers = categorizers.len(),
            "type definition built"
        );
        Ok(TypeDefinition {
            name,
            description: self.description,
            normalizer: self.normalizer,
            validator,
            categorizers,
            corpora,
        })
    }
}

fn level(type_name: &str, value: u8) -> Result<Level, DefinitionError> {
    Level::new(value).map_err(|source| DefinitionError::Categorizer {
        type_name: type_name.to_string(),
        source,
    })
}

fn pattern_categorizer(
    type_name: &str,
    at: u8,
    regex: &Regex,
) -> Result<Categorizer, DefinitionError> {
    let regex = regex.clone();
    let matched = type_name.to_string();
    let unmatched = format!("no_{type_name}");
    Ok(Categorizer::per_value(
        level(type_name, at)?,
        format!("pattern {}", regex.as_str()),
        move |value| {
            if regex.is_match(value) {
                Outcome::Keep(matched.clone())
            } else {
                Outcome::Keep(unmatched.clone())
            }
        },
    ))
}

fn validator_categorizer(
    type_name: &str,
    at: u8,
    validator: &Validator,
) -> Result<Categorizer, DefinitionError> {
    let validator = validator.clone();
    Ok(Categorizer::per_value(
        level(type_name, at)?,
        format!("validator {}", validator.fingerprint()),
        move |value| {
            let label = if validator.is_valid(value) {
                "valid"
            } else {
                "invalid"
            };
            Outcome::Keep(label.to_string())
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coltype_corpus::{MemoryCacheStore, MemoryCorpusSource};

    fn store() -> Arc<dyn CacheStore> {
        Arc::new(MemoryCacheStore::new())
    }

    fn upper() -> Normalizer {
        Normalizer::new("upper alnum", |v: &str| {
            let out: String = v
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .map(|c| c.to_ascii_uppercase())
                .collect();
            if out.is_empty() {
                Outcome::Skip
            } else {
                Outcome::Keep(out)
            }
        })
    }

    #[test]
    fn pattern_adds_inclusion_and_exclusion_levels() {
        let definition = TypeDefinition::builder("code")
            .normalize(upper())
            .pattern(r"[A-Z]{2}\d{2}")
            .build(store(), &CorpusSettings::default())
            .unwrap();
        let levels: Vec<u8> = definition.categorizers().levels().map(Level::value).collect();
        assert_eq!(levels, vec![15, 75]);

        let labels = definition
            .categorizers()
            .get(Level::new(15).unwrap())
            .unwrap()
            .apply(&FrequencyTable::from_values(["AB12", "AB123"]));
        assert_eq!(labels.get("code"), 1);
        assert_eq!(labels.get("no_code"), 1);
    }

    #[test]
    fn occupied_pattern_level_moves_up() {
        let taken = Categorizer::per_value(Level::new(15).unwrap(), "length", |v| {
            Outcome::Keep(v.len().to_string())
        });
        let definition = TypeDefinition::builder("code")
            .pattern("x+")
            .validate(Validator::new("long", |v| v.len() > 3))
            .categorizer(taken)
            .build(store(), &CorpusSettings::default())
            .unwrap();
        let levels: Vec<u8> = definition.categorizers().levels().map(Level::value).collect();
        assert_eq!(levels, vec![15, 16, 17, 75, 76]);
    }

    #[test]
    fn convert_normalizes_then_validates() {
        let definition = TypeDefinition::builder("code")
            .normalize(upper())
            .pattern(r"[A-Z]{2}\d{2}")
            .build(store(), &CorpusSettings::default())
            .unwrap();
        assert_eq!(definition.convert("ab-12"), Outcome::Keep("AB12".to_string()));
        assert_eq!(definition.convert("abc"), Outcome::Skip);
        assert_eq!(definition.convert("--"), Outcome::Skip);
        assert!(definition.validate("xy 99"));
        assert!(!definition.validate("xy 999"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = TypeDefinition::builder("code")
            .pattern("([A-Z")
            .build(store(), &CorpusSettings::default())
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Pattern { .. }));
    }

    #[test]
    fn panicking_categorizer_is_rejected() {
        let fragile = Categorizer::per_value(Level::new(5).unwrap(), "third char", |v| {
            Outcome::Keep(v.chars().nth(2).map(String::from).unwrap_or_else(|| panic!("short")))
        });
        let err = TypeDefinition::builder("code")
            .categorizer(fragile)
            .build(store(), &CorpusSettings::default())
            .unwrap_err();
        assert!(matches!(err, DefinitionError::Author { .. }));
    }

    #[test]
    fn sample_is_scored_against_best_corpus() {
        let length = Categorizer::per_value(Level::new(5).unwrap(), "length", |v| {
            Outcome::Keep(v.len().to_string())
        });
        let definition = TypeDefinition::builder("code")
            .normalize(upper())
            .categorizer(length)
            .corpus(MemoryCorpusSource::new("long", ["AAAAAA", "BBBBBB"]))
            .corpus(MemoryCorpusSource::new("short", ["AA", "BB"]))
            .build(store(), &CorpusSettings::default())
            .unwrap();

        let scores = definition
            .match_sample(&["xy", "zz", "q-q"], LevelRange::SHAPE, LevelScores::new())
            .unwrap();
        assert_eq!(scores.get(Level::new(5).unwrap()), Some(0.0));
    }

    #[test]
    fn type_without_corpora_scores_one() {
        let length = Categorizer::per_value(Level::new(5).unwrap(), "length", |v| {
            Outcome::Keep(v.len().to_string())
        });
        let definition = TypeDefinition::builder("code")
            .categorizer(length)
            .build(store(), &CorpusSettings::default())
            .unwrap();
        let scores = definition
            .match_sample(&["a"], LevelRange::SHAPE, LevelScores::new())
            .unwrap();
        assert_eq!(scores.get(Level::new(5).unwrap()), Some(1.0));
    }
}
