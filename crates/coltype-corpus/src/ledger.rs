//! Content-hash ledger of classification functions.
//!
//! One ledger per type records the hash each function had when a cache table
//! was last written. It is used only to report what changed; validity of a
//! cached table is decided by the hashes stored with the table itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionLedger {
    #[serde(default)]
    functions: BTreeMap<String, String>,
}

impl FunctionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, function: &str) -> Option<&str> {
        self.functions.get(function).map(String::as_str)
    }

    /// True when `function` is unknown or was recorded with another hash.
    pub fn changed(&self, function: &str, hash: &str) -> bool {
        self.get(function) != Some(hash)
    }

    /// Record `hash` for `function`, returning the previous hash.
    pub fn record(&mut self, function: &str, hash: &str) -> Option<String> {
        self.functions
            .insert(function.to_string(), hash.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.functions
            .iter()
            .map(|(name, hash)| (name.as_str(), hash.as_str()))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_reports_previous_hash() {
        let mut ledger = FunctionLedger::new();
        assert!(ledger.changed("normalize", "aa"));
        assert_eq!(ledger.record("normalize", "aa"), None);
        assert!(!ledger.changed("normalize", "aa"));
        assert_eq!(ledger.record("normalize", "bb"), Some("aa".to_string()));
        assert!(ledger.changed("normalize", "aa"));
        assert_eq!(ledger.len(), 1);
    }
}
