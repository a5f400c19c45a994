//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "coltype",
    version,
    about = "Infer the semantic type of table columns from reference corpora",
    long_about = "Infer the semantic type of table columns.\n\n\
                  Columns are compared against reference corpora of known-good values\n\
                  at increasing levels of detail; the closest types are reported."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding `<type>/<corpus>/corpus.txt` reference corpora.
    #[arg(long = "corpora", value_name = "DIR", global = true)]
    pub corpora: Option<PathBuf>,

    /// Directory for cached reference tables (default: <CORPORA>/.cache).
    #[arg(long = "cache", value_name = "DIR", global = true)]
    pub cache: Option<PathBuf>,

    /// TOML engine configuration file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rank the registered types that match each column of a CSV file.
    Infer(InferArgs),

    /// Check whether a column holds values of one specific type.
    Verify(VerifyArgs),

    /// List the registered types.
    Types,

    /// Inspect or populate the reference table cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Parser)]
pub struct InferArgs {
    /// CSV file with a header row.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Only infer these columns (repeatable; default: all columns).
    #[arg(long = "column", short = 'c', value_name = "NAME")]
    pub columns: Vec<String>,

    /// Stop the funnel after this many stages.
    #[arg(long = "max-stages", value_name = "N")]
    pub max_stages: Option<usize>,

    /// Field delimiter.
    #[arg(long = "delimiter", default_value_t = ',')]
    pub delimiter: char,
}

#[derive(Parser)]
pub struct VerifyArgs {
    /// Registered type name.
    #[arg(value_name = "TYPE")]
    pub type_name: String,

    /// CSV file with a header row.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Column to verify.
    #[arg(long = "column", short = 'c', value_name = "NAME")]
    pub column: String,

    /// Field delimiter.
    #[arg(long = "delimiter", default_value_t = ',')]
    pub delimiter: char,
}

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Show whether every cached table is fresh, stale or missing.
    Status,

    /// Build every missing or stale table.
    Warm,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
