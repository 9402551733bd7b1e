//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "onco-abgleich",
    version,
    about = "Reconcile lab accession numbers and enrich ADT/GEKID reports",
    long_about = "Reconcile lab accession numbers against a clinical database extract.\n\n\
                  Fills missing diagnosis data of ADT/GEKID report messages from the\n\
                  extract row sharing the message's accession number."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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

    /// Include accession numbers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// TOML file with cache retention and refresh settings.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the canonical form of accession numbers.
    Normalize(NormalizeArgs),

    /// Look up one accession number in the extract.
    Lookup(LookupArgs),

    /// Enrich a report document and write the mapped output.
    Map(MapArgs),
}

#[derive(Parser)]
pub struct NormalizeArgs {
    #[arg(value_name = "ID", required = true)]
    pub ids: Vec<String>,
}

#[derive(Parser)]
pub struct LookupArgs {
    /// Database extract CSV (default: $ONCO_ROWS_FILE).
    #[arg(long = "rows", value_name = "CSV")]
    pub rows: Option<PathBuf>,

    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Parser)]
pub struct MapArgs {
    /// Database extract CSV (default: $ONCO_ROWS_FILE).
    #[arg(long = "rows", value_name = "CSV")]
    pub rows: Option<PathBuf>,

    /// ADT/GEKID report document.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write the mapped document here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Drop patients without messages from the output.
    #[arg(long = "ignore-unmappable")]
    pub ignore_unmappable: bool,
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
