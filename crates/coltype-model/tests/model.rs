//! Tests for coltype-model types.

use coltype_model::{
    Categorizer, CategorizerSet, Column, FrequencyTable, Level, LevelRange, Normalizer, Outcome,
};

#[test]
fn normalized_column_reduces_to_categorized_table() {
    let column = Column::new(
        "postcode",
        vec![
            Some("1234 ab".to_string()),
            None,
            Some("1234AB".to_string()),
            Some("---".to_string()),
        ],
    );
    let normalize = Normalizer::new("upper alnum v1", |value| {
        let cleaned: String = value
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();
        Outcome::Keep(cleaned)
    });

    let base: FrequencyTable = column
        .present()
        .filter_map(|value| normalize.apply(value).keep())
        .map(|value| (value, 1))
        .collect();
    // "---" normalizes to the empty label, which is dropped.
    assert_eq!(base.len(), 1);
    assert_eq!(base.get("1234AB"), 2);

    let length = Categorizer::per_value(Level::new(5).unwrap(), "length v1", |value| {
        Outcome::Keep(value.len().to_string())
    });
    assert_eq!(length.apply(&base).get("6"), 2);
}

#[test]
fn level_serializes_as_number_and_rejects_out_of_range() {
    let level = Level::new(42).unwrap();
    assert_eq!(serde_json::to_string(&level).unwrap(), "42");
    assert!(serde_json::from_str::<Level>("100").is_err());
    let range: LevelRange = serde_json::from_str(r#"{"start":60,"end":90}"#).unwrap();
    assert!(range.contains(Level::new(75).unwrap()));
}

#[test]
fn normalizer_hash_tracks_fingerprint() {
    let a = Normalizer::new("trim 2024-01-01", |v| Outcome::Keep(v.trim().to_string()));
    let b = Normalizer::new("trim 2024-02-01", |v| Outcome::Keep(v.trim().to_string()));
    assert_ne!(a.content_hash(), b.content_hash());
    assert_eq!(a.content_hash(), a.clone().content_hash());
}

#[test]
fn categorizer_set_iterates_in_level_order() {
    let mut set = CategorizerSet::new();
    for at in [60, 5, 30] {
        set.insert(Categorizer::per_value(
            Level::new(at).unwrap(),
            format!("cat{at}"),
            |v| Outcome::Keep(v.to_string()),
        ))
        .unwrap();
    }
    let levels: Vec<u8> = set.levels().map(Level::value).collect();
    assert_eq!(levels, vec![5, 30, 60]);
}
