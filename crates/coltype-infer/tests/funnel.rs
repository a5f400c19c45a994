//! Funnel behavior on small synthetic types.

use std::sync::Arc;

use coltype_corpus::{
    CacheSlot, CacheStatus, CacheStore, CorpusSettings, FileCorpusSource, MemoryCacheStore,
    MemoryCorpusSource,
};
use coltype_infer::{CancelToken, InferError, MatchOptions, TypeDefinition, TypeRegistry};
use coltype_model::{Categorizer, Column, Level, Outcome};

const NUMBERS: [&str; 10] = [
    "1234", "5678", "9012", "3456", "7890", "2468", "1357", "8642", "9753", "1111",
];
const CODES: [&str; 10] = [
    "4321", "8765", "2109", "6543", "0987", "5555", "7531", "6666", "3579", "2222",
];
const WORDS: [&str; 6] = ["abcd", "efgh", "ijkl", "mnop", "qrst", "uvwx"];

fn level(value: u8) -> Level {
    Level::new(value).unwrap()
}

fn categorizers() -> Vec<Categorizer> {
    vec![
        Categorizer::per_value(level(5), "length", |v| {
            Outcome::Keep(v.chars().count().to_string())
        }),
        Categorizer::per_value(level(10), "classes", |v| {
            let mut classes: Vec<char> = v
                .chars()
                .map(|c| if c.is_ascii_digit() { 'd' } else { 'c' })
                .collect();
            classes.sort_unstable();
            classes.dedup();
            Outcome::Keep(classes.into_iter().collect())
        }),
        Categorizer::per_value(level(20), "exact", |v| Outcome::Keep(v.to_string())),
    ]
}

fn definition(name: &str, lines: &[&str], store: &Arc<dyn CacheStore>) -> TypeDefinition {
    TypeDefinition::builder(name)
        .categorizers(categorizers())
        .corpus(MemoryCorpusSource::new("reference", lines.iter().copied()))
        .build(Arc::clone(store), &CorpusSettings::default())
        .unwrap()
}

fn registry() -> TypeRegistry {
    let store: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new());
    let mut registry = TypeRegistry::default();
    registry.register(definition("number", &NUMBERS, &store)).unwrap();
    registry.register(definition("code", &CODES, &store)).unwrap();
    registry.register(definition("word", &WORDS, &store)).unwrap();
    registry
}

fn number_column() -> Column {
    Column::from_values("amount", (0..47).map(|i| NUMBERS[i % NUMBERS.len()]))
}

#[test]
fn best_type_wins_after_later_stages() {
    let results = registry().matches(&number_column());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].type_name, "number");
    assert!(results[0].mean_distance < 0.05);
    assert!(results[0].scores.get(level(20)).is_some());
}

#[test]
fn stage_cap_returns_undecided_candidates() {
    let options = MatchOptions {
        max_stages: Some(1),
        ..MatchOptions::default()
    };
    let results = registry().matches_with(&number_column(), &options).unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.type_name.as_str()).collect();
    assert_eq!(names, vec!["code", "number"]);
    assert!(results.iter().all(|r| r.scores.get(level(20)).is_none()));
}

#[test]
fn cancelled_match_reports_cancellation() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let options = MatchOptions {
        max_stages: None,
        cancel,
    };
    let err = registry().matches_with(&number_column(), &options).unwrap_err();
    assert!(matches!(err, InferError::Cancelled));
}

#[test]
fn matching_is_repeatable() {
    let registry = registry();
    let column = number_column();
    assert_eq!(registry.matches(&column), registry.matches(&column));
}

#[test]
fn empty_column_matches_nothing() {
    let column = Column::new("empty", vec![None; 20]);
    assert!(registry().matches(&column).is_empty());
}

#[test]
fn unavailable_corpus_drops_only_its_type() {
    let store: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new());
    let mut registry = registry();
    let phantom = TypeDefinition::builder("phantom")
        .categorizers(categorizers())
        .corpus(FileCorpusSource::new("gone", "/no/such/corpus.txt"))
        .build(store, &CorpusSettings::default())
        .unwrap();
    registry.register(phantom).unwrap();

    let results = registry.matches(&number_column());
    assert_eq!(results[0].type_name, "number");
    assert!(results.iter().all(|r| r.type_name != "phantom"));

    assert_eq!(registry.warm().unwrap(), 3);
    let report = registry.cache_report().unwrap();
    assert!(
        report
            .iter()
            .filter(|entry| entry.type_name == "phantom")
            .all(|entry| entry.status.is_none())
    );
    assert!(
        report
            .iter()
            .filter(|entry| entry.type_name == "number")
            .all(|entry| entry.status == Some(CacheStatus::Fresh))
    );
    assert!(report.iter().any(|entry| entry.slot == CacheSlot::Base));
}

#[test]
fn verify_checks_first_band_only() {
    let registry = registry();
    let column = number_column();
    assert!(registry.verify("number", &column).unwrap());
    // Same shape, different values: only the exact level would tell them apart.
    assert!(registry.verify("code", &column).unwrap());
    assert!(!registry.verify("word", &column).unwrap());
    assert!(matches!(
        registry.verify("nope", &column),
        Err(InferError::UnknownType { .. })
    ));
}

#[test]
fn duplicate_names_are_rejected() {
    let store: Arc<dyn CacheStore> = Arc::new(MemoryCacheStore::new());
    let mut registry = registry();
    let err = registry
        .register(definition("word", &WORDS, &store))
        .unwrap_err();
    assert!(matches!(err, InferError::DuplicateType { .. }));
}
