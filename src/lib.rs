pub mod cli;
pub mod dataset;
pub mod error;
pub mod fields;
pub mod format;
pub mod io_utils;
pub mod merge;
pub mod pipeline;
pub mod preview;
pub mod repair;
pub mod validate;
pub mod writer;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::{
    cli::{Cli, Commands, FormatArgs, MergeArgs},
    pipeline::{MergeOutcome, MergeRequest},
    validate::ValidationReport,
};

/// Exit status for a run that found no valid rows to merge.
pub const EXIT_NO_VALID_DATA: i32 = 2;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("call_merge", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

/// Parses the command line and runs it, returning the process exit status.
pub fn run() -> Result<i32> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Merge(args) => handle_merge(&args),
        Commands::Format(args) => handle_format(&args),
    }
}

fn handle_merge(args: &MergeArgs) -> Result<i32> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let request = MergeRequest {
        primary: args.primary.clone(),
        new_data: args.new_data.clone(),
        output: args.output.clone(),
        primary_separator: args.delimiter,
        new_data_separator: args.new_data_delimiter,
        output_separator: args.output_delimiter.unwrap_or(args.delimiter),
        encoding,
    };
    info!(
        "Merging {:?} (delimiter '{}') into {:?} (delimiter '{}')",
        request.new_data, request.new_data_separator, request.primary, request.primary_separator
    );
    let outcome = pipeline::run_merge(&request)
        .with_context(|| format!("Merging {:?} into {:?}", request.new_data, request.primary))?;
    match outcome {
        MergeOutcome::Merged(summary) => {
            info!(
                "Merged {} primary row(s) and {} new row(s) -> {} ({} row(s), {} column(s))",
                summary.primary_rows,
                summary.new_rows,
                summary.output,
                summary.total_rows,
                summary.columns.len()
            );
            if let Some(path) = &args.report {
                pipeline::write_summary(&summary, path)
                    .with_context(|| format!("Writing merge summary to {path:?}"))?;
            }
            Ok(0)
        }
        MergeOutcome::NoValidData(report) => {
            report_no_valid_data(&report, &args.new_data.display().to_string());
            Ok(EXIT_NO_VALID_DATA)
        }
    }
}

fn handle_format(args: &FormatArgs) -> Result<i32> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let outcome = pipeline::run_format(&args.input, args.new_data_delimiter, encoding)
        .with_context(|| format!("Formatting {:?}", args.input))?;
    if outcome.is_empty() {
        report_no_valid_data(&outcome.report, &args.input.display().to_string());
        return Ok(EXIT_NO_VALID_DATA);
    }
    let dataset = outcome.to_dataset();
    if args.table {
        print!("{}", preview::render_dataset(&dataset, args.limit));
    } else {
        writer::write_dataset_to(&dataset, args.output.as_deref(), args.delimiter)
            .context("Writing formatted rows")?;
    }
    Ok(0)
}

fn report_no_valid_data(report: &ValidationReport, source: &str) {
    warn!(
        "No valid rows in {source}: {} row(s) read, {} dropped",
        report.input_rows,
        report.dropped_rows()
    );
    eprintln!("warning: no valid rows were found in {source}; nothing was written");
}
