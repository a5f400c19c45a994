//! Engine configuration.
//!
//! Every field has a default, so an empty TOML file is a valid config:
//!
//! ```toml
//! corpora_dir = "corpora"
//!
//! [corpus]
//! coverage = 0.9
//! slack = 3
//!
//! [funnel]
//! max_stages = 3
//!
//! [[funnel.stages]]
//! levels = { start = 0, end = 18 }
//! sample_size = 47
//! ceiling = 0.7
//! fraction = 0.95
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use coltype_corpus::CorpusSettings;
use serde::{Deserialize, Serialize};

use crate::error::{InferError, Result};
use crate::funnel::FunnelConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root of the reference corpora, `<type>/<corpus>/corpus.txt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpora_dir: Option<PathBuf>,
    /// Where persisted reference tables go.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    pub corpus: CorpusSettings,
    pub funnel: FunnelConfig,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(|source| InferError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.resolve_relative_to(path.parent().unwrap_or_else(|| Path::new("")));
        Ok(config)
    }

    /// Load a config file. Relative directories are taken relative to the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| InferError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content, path)?;
        tracing::info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for dir in [&mut self.corpora_dir, &mut self.cache_dir].into_iter().flatten() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}
