//! Directory-backed cache store.
//!
//! Layout under the cache root:
//!
//! ```text
//! <type>/functions.json
//! <type>/<corpus>/base.csv
//! <type>/<corpus>/base.json
//! <type>/<corpus>/cat05.csv
//! <type>/<corpus>/cat05.json
//! ```
//!
//! Each table is a `value,count` CSV sorted by descending count. The JSON
//! sidecar holds the [`CacheMeta`] plus the SHA-256 of the CSV, so a torn or
//! edited table is detected and recomputed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use coltype_model::sha256_hex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::{CacheKey, CacheMeta, CacheStore, CachedTable};
use crate::error::{CorpusError, Result};
use crate::ledger::FunctionLedger;

const LEDGER_FILE: &str = "functions.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredMeta {
    #[serde(flatten)]
    meta: CacheMeta,
    table_sha256: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    value: String,
    count: u64,
}

/// Cache store persisting tables as CSV files under a root directory.
#[derive(Debug)]
pub struct FsCacheStore {
    root: PathBuf,
    ledger_lock: Mutex<()>,
}

impl FsCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ledger_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the CSV table for `key`.
    pub fn table_path(&self, key: &CacheKey) -> PathBuf {
        self.corpus_dir(key).join(format!("{}.csv", key.slot.file_stem()))
    }

    fn meta_path(&self, key: &CacheKey) -> PathBuf {
        self.corpus_dir(key).join(format!("{}.json", key.slot.file_stem()))
    }

    fn corpus_dir(&self, key: &CacheKey) -> PathBuf {
        self.type_dir(&key.type_name).join(sanitize(&key.corpus))
    }

    fn type_dir(&self, type_name: &str) -> PathBuf {
        self.root.join(sanitize(type_name))
    }

    fn ledger_path(&self, type_name: &str) -> PathBuf {
        self.type_dir(type_name).join(LEDGER_FILE)
    }

    fn read_ledger(&self, type_name: &str) -> Result<FunctionLedger> {
        let path = self.ledger_path(type_name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FunctionLedger::new());
            }
            Err(err) => return Err(CorpusError::io("read", path, err)),
        };
        match serde_json::from_slice(&bytes) {
            Ok(ledger) => Ok(ledger),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "discarding corrupt function ledger");
                Ok(FunctionLedger::new())
            }
        }
    }
}

impl CacheStore for FsCacheStore {
    fn load(&self, key: &CacheKey) -> Result<Option<CachedTable>> {
        let meta_path = self.meta_path(key);
        let meta_bytes = match fs::read(&meta_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(CorpusError::io("read", meta_path, err)),
        };
        let stored: StoredMeta = match serde_json::from_slice(&meta_bytes) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "discarding corrupt cache metadata");
                return Ok(None);
            }
        };

        let table_path = self.table_path(key);
        let table_bytes = match fs::read(&table_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(key = %key, "cache metadata without table");
                return Ok(None);
            }
            Err(err) => return Err(CorpusError::io("read", table_path, err)),
        };
        if sha256_hex(&table_bytes) != stored.table_sha256 {
            tracing::warn!(key = %key, "cache table does not match its recorded hash");
            return Ok(None);
        }

        match parse_rows(&table_bytes) {
            Ok(entries) => Ok(Some(CachedTable {
                meta: stored.meta,
                entries,
            })),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "discarding unreadable cache table");
                Ok(None)
            }
        }
    }

    fn save(&self, key: &CacheKey, table: &CachedTable) -> Result<()> {
        let table_path = self.table_path(key);
        let csv_bytes = encode_rows(&table.entries).map_err(|source| CorpusError::Csv {
            path: table_path.clone(),
            source,
        })?;

        let meta_path = self.meta_path(key);
        let stored = StoredMeta {
            meta: table.meta.clone(),
            table_sha256: sha256_hex(&csv_bytes),
        };
        let meta_bytes =
            serde_json::to_vec_pretty(&stored).map_err(|source| CorpusError::Json {
                path: meta_path.clone(),
                source,
            })?;

        // Table first: a reader that sees the new sidecar must find the matching table.
        write_atomic(&table_path, &csv_bytes)?;
        write_atomic(&meta_path, &meta_bytes)?;
        tracing::debug!(key = %key, buckets = table.entries.len(), "saved cache table");
        Ok(())
    }

    fn load_ledger(&self, type_name: &str) -> Result<FunctionLedger> {
        let _guard = self.ledger_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_ledger(type_name)
    }

    fn record_function(
        &self,
        type_name: &str,
        function: &str,
        hash: &str,
    ) -> Result<Option<String>> {
        let _guard = self.ledger_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ledger = self.read_ledger(type_name)?;
        if !ledger.changed(function, hash) {
            return Ok(Some(hash.to_string()));
        }
        let previous = ledger.record(function, hash);
        let path = self.ledger_path(type_name);
        let bytes = serde_json::to_vec_pretty(&ledger).map_err(|source| CorpusError::Json {
            path: path.clone(),
            source,
        })?;
        write_atomic(&path, &bytes)?;
        Ok(previous)
    }
}

fn encode_rows(entries: &[(String, u64)]) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    // Header is written explicitly so an empty table still has one.
    writer.write_record(["value", "count"])?;
    for (value, count) in entries {
        writer.write_record([value.as_str(), count.to_string().as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

fn parse_rows(bytes: &[u8]) -> std::result::Result<Vec<(String, u64)>, csv::Error> {
    let mut reader = csv::Reader::from_reader(bytes);
    reader
        .deserialize::<CsvRow>()
        .map(|row| row.map(|row| (row.value, row.count)))
        .collect()
}

/// Write through a uniquely named temp file in the same directory and rename
/// over the target.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| CorpusError::io("create directory", parent, err))?;

    let mut file =
        NamedTempFile::new_in(parent).map_err(|err| CorpusError::io("create", parent, err))?;
    file.write_all(bytes)
        .map_err(|err| CorpusError::io("write", file.path(), err))?;
    file.as_file()
        .sync_all()
        .map_err(|err| CorpusError::io("sync", file.path(), err))?;
    file.persist(path)
        .map_err(|err| CorpusError::io("rename", path, err.error))?;
    Ok(())
}

/// Directory-safe form of a type or corpus name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CacheSlot;
    use coltype_model::Level;
    use tempfile::tempdir;

    fn meta() -> CacheMeta {
        CacheMeta {
            source_signature: "src".to_string(),
            normalize_hash: "norm".to_string(),
            categorizer_hash: Some("cat".to_string()),
            significance: Vec::new(),
            bucket_count: 2,
        }
    }

    fn table() -> CachedTable {
        CachedTable {
            meta: meta(),
            entries: vec![("dddd".to_string(), 7), ("a,b".to_string(), 2)],
        }
    }

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        let key = CacheKey::new("email", "crm", CacheSlot::Level(Level::new(5).unwrap()));

        assert!(store.load(&key).unwrap().is_none());
        store.save(&key, &table()).unwrap();
        assert_eq!(store.load(&key).unwrap(), Some(table()));
        assert!(store.table_path(&key).ends_with("email/crm/cat05.csv"));
    }

    #[test]
    fn edited_table_is_treated_as_missing() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        let key = CacheKey::new("email", "crm", CacheSlot::Base);
        store.save(&key, &table()).unwrap();

        fs::write(store.table_path(&key), "value,count\ndddd,8\n").unwrap();
        assert!(store.load(&key).unwrap().is_none());
    }

    #[test]
    fn corrupt_metadata_is_treated_as_missing() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        let key = CacheKey::new("email", "crm", CacheSlot::Base);
        store.save(&key, &table()).unwrap();

        fs::write(store.meta_path(&key), "{ not json").unwrap();
        assert!(store.load(&key).unwrap().is_none());
    }

    #[test]
    fn ledger_records_previous_hash() {
        let dir = tempdir().unwrap();
        let store = FsCacheStore::new(dir.path());
        assert_eq!(store.record_function("email", "normalize", "h1").unwrap(), None);
        assert_eq!(
            store.record_function("email", "normalize", "h2").unwrap(),
            Some("h1".to_string())
        );
        let ledger = store.load_ledger("email").unwrap();
        assert_eq!(ledger.get("normalize"), Some("h2"));
        assert!(store.load_ledger("tld").unwrap().is_empty());
    }

    #[test]
    fn concurrent_saves_of_one_key_leave_a_loadable_table() {
        let dir = tempdir().unwrap();
        let key = &CacheKey::new("email", "crm", CacheSlot::Base);
        let stores: Vec<FsCacheStore> = (0..4).map(|_| FsCacheStore::new(dir.path())).collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = stores
                .iter()
                .map(|store| scope.spawn(move || (0..10).try_for_each(|_| store.save(key, &table()))))
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });

        assert_eq!(stores[0].load(key).unwrap(), Some(table()));
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("email/crm"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| !name.to_string_lossy().starts_with("base."))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize("postal code/nl"), "postal_code_nl");
        assert_eq!(sanitize("ip_address"), "ip_address");
    }
}
