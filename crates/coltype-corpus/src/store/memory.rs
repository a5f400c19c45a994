//! In-process cache store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{CacheKey, CacheStore, CachedTable};
use crate::error::Result;
use crate::ledger::FunctionLedger;

/// Cache store that keeps everything in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    tables: Mutex<HashMap<CacheKey, CachedTable>>,
    ledgers: Mutex<HashMap<String, FunctionLedger>>,
    saves: AtomicUsize,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tables written so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self, key: &CacheKey) -> Result<Option<CachedTable>> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.get(key).cloned())
    }

    fn save(&self, key: &CacheKey, table: &CachedTable) -> Result<()> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables.insert(key.clone(), table.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_ledger(&self, type_name: &str) -> Result<FunctionLedger> {
        let ledgers = self.ledgers.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(ledgers.get(type_name).cloned().unwrap_or_default())
    }

    fn record_function(
        &self,
        type_name: &str,
        function: &str,
        hash: &str,
    ) -> Result<Option<String>> {
        let mut ledgers = self.ledgers.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(ledgers
            .entry(type_name.to_string())
            .or_default()
            .record(function, hash))
    }
}
