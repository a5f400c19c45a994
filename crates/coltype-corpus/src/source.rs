//! Raw reference text for a corpus.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use coltype_model::sha256_hex;

use crate::error::{CorpusError, Result};

/// Lines of a reference corpus and the signature of their content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusText {
    pub lines: Vec<String>,
    /// SHA-256 of the raw bytes.
    pub signature: String,
}

impl CorpusText {
    /// One value per line; blank lines are skipped and `\r\n` is accepted.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let lines = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            lines,
            signature: sha256_hex(bytes),
        }
    }
}

/// Where the known-good values of a corpus come from.
pub trait CorpusSource: Send + Sync + fmt::Debug {
    /// Corpus name, unique within its type.
    fn name(&self) -> &str;

    fn read(&self) -> Result<CorpusText>;
}

/// Corpus stored as a text file with one value per line.
#[derive(Debug, Clone)]
pub struct FileCorpusSource {
    name: String,
    path: PathBuf,
}

impl FileCorpusSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CorpusSource for FileCorpusSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<CorpusText> {
        let bytes = fs::read(&self.path).map_err(|source| CorpusError::Unavailable {
            corpus: self.name.clone(),
            path: Some(self.path.clone()),
            source,
        })?;
        Ok(CorpusText::from_bytes(&bytes))
    }
}

/// Corpus held in memory, mainly for tests and embedded reference data.
#[derive(Debug, Clone)]
pub struct MemoryCorpusSource {
    name: String,
    content: String,
}

impl MemoryCorpusSource {
    pub fn new<I, S>(name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let content = lines
            .into_iter()
            .map(|line| line.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            name: name.into(),
            content,
        }
    }
}

impl CorpusSource for MemoryCorpusSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<CorpusText> {
        Ok(CorpusText::from_bytes(self.content.as_bytes()))
    }
}
