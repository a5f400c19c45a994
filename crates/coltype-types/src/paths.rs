//! Corpora and cache directory resolution.

use std::path::{Path, PathBuf};

use coltype_infer::EngineConfig;

/// Environment variable for overriding the corpora directory.
pub const CORPORA_ENV_VAR: &str = "COLTYPE_CORPORA_DIR";

/// Environment variable for overriding the cache directory.
pub const CACHE_ENV_VAR: &str = "COLTYPE_CACHE_DIR";

/// Name of the cache directory inside the corpora root.
pub const CACHE_DIR_NAME: &str = ".cache";

/// Get the corpora root directory.
///
/// Resolution order:
/// 1. `COLTYPE_CORPORA_DIR` environment variable
/// 2. `corpora/` directory relative to workspace root
pub fn corpora_root() -> PathBuf {
    if let Some(root) = std::env::var_os(CORPORA_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../corpora")
}

/// Get the cache directory for a corpora root.
///
/// Resolution order:
/// 1. `COLTYPE_CACHE_DIR` environment variable
/// 2. `.cache/` inside the corpora root
pub fn cache_root(corpora: &Path) -> PathBuf {
    if let Some(root) = std::env::var_os(CACHE_ENV_VAR) {
        return PathBuf::from(root);
    }
    corpora.join(CACHE_DIR_NAME)
}

/// Directory of one type's corpora.
pub fn type_dir(corpora: &Path, type_name: &str) -> PathBuf {
    corpora.join(type_name)
}

/// Directories the engine reads corpora from and writes tables to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirs {
    pub corpora: PathBuf,
    pub cache: PathBuf,
}

impl ResolvedDirs {
    /// Explicit paths first, then the config file, then the environment and
    /// the workspace defaults.
    pub fn resolve(corpora: Option<&Path>, cache: Option<&Path>, config: &EngineConfig) -> Self {
        let corpora = corpora
            .map(Path::to_path_buf)
            .or_else(|| config.corpora_dir.clone())
            .unwrap_or_else(corpora_root);
        let cache = cache
            .map(Path::to_path_buf)
            .or_else(|| config.cache_dir.clone())
            .unwrap_or_else(|| cache_root(&corpora));
        Self { corpora, cache }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_win() {
        let config = EngineConfig {
            corpora_dir: Some(PathBuf::from("/from/config")),
            ..EngineConfig::default()
        };
        let dirs = ResolvedDirs::resolve(Some(Path::new("/from/flag")), None, &config);
        assert_eq!(dirs.corpora, PathBuf::from("/from/flag"));
    }

    #[test]
    fn config_beats_environment_defaults() {
        let config = EngineConfig {
            corpora_dir: Some(PathBuf::from("/from/config")),
            cache_dir: Some(PathBuf::from("/cache/config")),
            ..EngineConfig::default()
        };
        let dirs = ResolvedDirs::resolve(None, None, &config);
        assert_eq!(dirs.corpora, PathBuf::from("/from/config"));
        assert_eq!(dirs.cache, PathBuf::from("/cache/config"));
    }

    #[test]
    fn type_dir_is_under_root() {
        assert_eq!(
            type_dir(Path::new("/data"), "email"),
            PathBuf::from("/data/email")
        );
    }
}
