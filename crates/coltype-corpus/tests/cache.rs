//! Cache coherence across processes sharing one cache directory.

use std::fs;
use std::sync::Arc;

use coltype_corpus::{
    CacheSlot, CacheStatus, CacheStore, CorpusSettings, FsCacheStore, MemoryCorpusSource,
    ReferenceCorpus, StaleReason,
};
use coltype_model::{Categorizer, CategorizerSet, Level, Normalizer, Outcome};
use tempfile::tempdir;

fn level(value: u8) -> Level {
    Level::new(value).unwrap()
}

fn categorizers(level_30_fingerprint: &str) -> Arc<CategorizerSet> {
    let mut set = CategorizerSet::new();
    set.insert(Categorizer::per_value(level(5), "length", |v| {
        Outcome::Keep(v.chars().count().to_string())
    }))
    .unwrap();
    set.insert(Categorizer::per_value(level(30), level_30_fingerprint, |v| {
        Outcome::Keep(v.chars().filter(char::is_ascii_digit).collect())
    }))
    .unwrap();
    set.insert(Categorizer::per_value(level(40), "upper", |v| {
        Outcome::Keep(v.to_uppercase())
    }))
    .unwrap();
    Arc::new(set)
}

fn corpus(
    type_name: &str,
    store: &Arc<FsCacheStore>,
    level_30_fingerprint: &str,
) -> ReferenceCorpus {
    ReferenceCorpus::new(
        type_name,
        Box::new(MemoryCorpusSource::new(
            "reference",
            ["1234AB", "1234AB", "5678CD", "9999zz"],
        )),
        Normalizer::identity(),
        categorizers(level_30_fingerprint),
        Arc::clone(store) as Arc<dyn CacheStore>,
        CorpusSettings::default(),
    )
}

#[test]
fn changed_categorizer_invalidates_its_level_and_above_only() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FsCacheStore::new(dir.path()));
    corpus("postal_code", &store, "digits v1").warm().unwrap();
    corpus("other", &store, "digits v1").warm().unwrap();

    let changed = corpus("postal_code", &store, "digits v2");
    assert_eq!(changed.status(CacheSlot::Base).unwrap(), CacheStatus::Fresh);
    assert_eq!(
        changed.status(CacheSlot::Level(level(5))).unwrap(),
        CacheStatus::Fresh
    );
    for at in [30, 40] {
        assert_eq!(
            changed.status(CacheSlot::Level(level(at))).unwrap(),
            CacheStatus::Stale(StaleReason::CategorizersChanged)
        );
    }

    let untouched = corpus("other", &store, "digits v1");
    for at in [5, 30, 40] {
        assert_eq!(
            untouched.status(CacheSlot::Level(level(at))).unwrap(),
            CacheStatus::Fresh
        );
    }

    changed.warm().unwrap();
    assert_eq!(
        changed.status(CacheSlot::Level(level(40))).unwrap(),
        CacheStatus::Fresh
    );
    let ledger = store.load_ledger("postal_code").unwrap();
    assert!(ledger.get("cat30").is_some());
    assert!(ledger.get("normalize").is_some());
}

#[test]
fn corrupt_table_is_rebuilt_silently() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FsCacheStore::new(dir.path()));
    corpus("postal_code", &store, "digits v1").warm().unwrap();

    let path = dir.path().join("postal_code/reference/cat05.csv");
    fs::write(&path, "garbage").unwrap();

    let fresh = corpus("postal_code", &store, "digits v1");
    assert_eq!(
        fresh.status(CacheSlot::Level(level(5))).unwrap(),
        CacheStatus::Missing
    );
    assert_eq!(fresh.get(level(5)).unwrap().get("6"), 4);
    assert_eq!(
        fresh.status(CacheSlot::Level(level(5))).unwrap(),
        CacheStatus::Fresh
    );
}

#[test]
fn persisted_base_table_layout() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FsCacheStore::new(dir.path()));
    corpus("postal_code", &store, "digits v1").base().unwrap();

    let csv = fs::read_to_string(dir.path().join("postal_code/reference/base.csv")).unwrap();
    insta::assert_snapshot!(csv, @r"
    value,count
    1234AB,2
    5678CD,1
    9999zz,1
    ");
}
