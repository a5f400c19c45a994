use anyhow::{Context, Result};
use coltype_infer::{EngineConfig, MatchOptions, TypeRegistry};
use coltype_types::{ResolvedDirs, builtin_registry};
use tracing::{info, info_span};

use coltype_cli::input::{read_column, read_columns, select_columns};

use crate::cli::{CacheCommand, Cli, InferArgs, VerifyArgs};
use crate::summary::{print_cache_report, print_types};
use crate::types::{ColumnMatches, VerifyOutcome};

/// Registry of the built-in types, honoring the global directory flags.
pub fn load_registry(cli: &Cli) -> Result<TypeRegistry> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("load config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let dirs = ResolvedDirs::resolve(cli.corpora.as_deref(), cli.cache.as_deref(), &config);
    info!(
        corpora = %dirs.corpora.display(),
        cache = %dirs.cache.display(),
        "resolved directories"
    );
    builtin_registry(&dirs, &config).context("build type registry")
}

pub fn run_infer(registry: &TypeRegistry, args: &InferArgs) -> Result<Vec<ColumnMatches>> {
    let span = info_span!("infer", path = %args.csv.display());
    let _guard = span.enter();
    let columns = select_columns(read_columns(&args.csv, args.delimiter)?, &args.columns)?;
    let options = MatchOptions {
        max_stages: args.max_stages,
        ..MatchOptions::default()
    };
    columns
        .into_iter()
        .map(|column| {
            let results = registry
                .matches_with(&column, &options)
                .with_context(|| format!("match column {:?}", column.name()))?;
            Ok(ColumnMatches {
                column: column.name().to_string(),
                present: column.present_count(),
                missing: column.missing_count(),
                results,
            })
        })
        .collect()
}

pub fn run_verify(registry: &TypeRegistry, args: &VerifyArgs) -> Result<VerifyOutcome> {
    let column = read_column(&args.csv, &args.column, args.delimiter)?;
    let accepted = registry
        .verify(&args.type_name, &column)
        .with_context(|| format!("verify column {:?}", args.column))?;
    Ok(VerifyOutcome {
        type_name: args.type_name.clone(),
        column: args.column.clone(),
        accepted,
    })
}

pub fn run_types(registry: &TypeRegistry) {
    print_types(registry);
}

pub fn run_cache(registry: &TypeRegistry, command: &CacheCommand) -> Result<()> {
    match command {
        CacheCommand::Status => {
            let report = registry.cache_report().context("inspect cache")?;
            print_cache_report(&report);
        }
        CacheCommand::Warm => {
            let warmed = registry.warm().context("warm cache")?;
            println!("Warmed {warmed} corpora");
        }
    }
    Ok(())
}
