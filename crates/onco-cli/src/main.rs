//! Accession reconciliation CLI.

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use onco_cli::commands::{
    MapOptions, load_config, resolve_rows_path, run_lookup, run_map, run_normalize,
};
use onco_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, LookupArgs, MapArgs};
use crate::summary::{print_lookup, print_mapping, print_normalized};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Command::Normalize(args) => {
            print_normalized(&run_normalize(&args.ids));
            Ok(0)
        }
        Command::Lookup(args) => lookup(args),
        Command::Map(args) => map(cli, args),
    }
}

fn lookup(args: &LookupArgs) -> Result<i32> {
    let rows = resolve_rows_path(args.rows.as_deref())?;
    let outcome = run_lookup(&rows, &args.id)?;
    print_lookup(&outcome);
    Ok(if outcome.record.is_some() { 0 } else { 1 })
}

fn map(cli: &Cli, args: &MapArgs) -> Result<i32> {
    let options = MapOptions {
        rows: resolve_rows_path(args.rows.as_deref())?,
        input: args.input.clone(),
        ignore_unmappable: args.ignore_unmappable,
        config: load_config(cli.config.as_deref())?,
    };
    let outcome = run_map(&options)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &outcome.payload)
                .with_context(|| format!("write {}", path.display()))?;
            print_mapping(&outcome.result, &outcome.stats);
        }
        None => {
            // The summary goes to stderr so stdout carries only the document.
            io::stdout()
                .write_all(&outcome.payload)
                .context("write mapped output")?;
            eprintln!("Key: {}", outcome.result.key);
            if outcome.result.has_warning() {
                eprintln!("warning: the mapped document has fewer patients or messages than the input");
            }
        }
    }
    Ok(0)
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
