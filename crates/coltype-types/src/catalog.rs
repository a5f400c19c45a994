//! Assembly of the built-in type registry from a corpora directory.
//!
//! Corpora are discovered as `<root>/<type>/<corpus>/corpus.txt`. A type
//! without any corpus directory is still registered; it never matches.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use coltype_corpus::{CacheStore, FileCorpusSource, FsCacheStore};
use coltype_infer::{EngineConfig, TypeRegistry};

use crate::error::{CatalogError, Result};
use crate::paths::{ResolvedDirs, type_dir};
use crate::standard::standard_categorizers;
use crate::types::builtin_types;

/// File holding the values of one corpus.
pub const CORPUS_FILE: &str = "corpus.txt";

/// Corpus sources of `type_name`, sorted by corpus name.
pub fn discover_corpora(corpora: &Path, type_name: &str) -> Result<Vec<FileCorpusSource>> {
    let dir = type_dir(corpora, type_name);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(CatalogError::Io {
                operation: "read",
                path: dir,
                source,
            });
        }
    };

    let mut found: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CatalogError::Io {
            operation: "read",
            path: dir.clone(),
            source,
        })?;
        let file = entry.path().join(CORPUS_FILE);
        if !file.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        found.push((name, file));
    }
    found.sort();
    Ok(found
        .into_iter()
        .map(|(name, file)| FileCorpusSource::new(name, file))
        .collect())
}

/// Registry of every built-in type with corpora from `dirs.corpora` and
/// tables cached under `dirs.cache`.
pub fn builtin_registry(dirs: &ResolvedDirs, config: &EngineConfig) -> Result<TypeRegistry> {
    let store: Arc<dyn CacheStore> = Arc::new(FsCacheStore::new(&dirs.cache));
    builtin_registry_with_store(&dirs.corpora, store, config)
}

/// Same as [`builtin_registry`] with an explicit cache store.
pub fn builtin_registry_with_store(
    corpora: &Path,
    store: Arc<dyn CacheStore>,
    config: &EngineConfig,
) -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new(config.funnel.clone());
    for builder in builtin_types() {
        let sources = discover_corpora(corpora, builder.name())?;
        if sources.is_empty() {
            tracing::warn!(
                type_name = builder.name(),
                corpora = %corpora.display(),
                "no reference corpora found"
            );
        }
        let definition = sources
            .into_iter()
            .fold(builder, |builder, source| builder.corpus(source))
            .categorizers(standard_categorizers())
            .build(Arc::clone(&store), &config.corpus)?;
        registry.register(definition)?;
    }
    tracing::info!(
        types = registry.len(),
        corpora = %corpora.display(),
        "built-in types registered"
    );
    Ok(registry)
}

static DEFAULT_REGISTRY: OnceLock<Result<TypeRegistry>> = OnceLock::new();

/// Process-wide registry over the default corpora and cache directories.
///
/// Built on first use; later calls return the same registry or the same error.
pub fn default_registry() -> std::result::Result<&'static TypeRegistry, &'static CatalogError> {
    DEFAULT_REGISTRY
        .get_or_init(|| {
            let config = EngineConfig::default();
            builtin_registry(&ResolvedDirs::resolve(None, None, &config), &config)
        })
        .as_ref()
}
