//! Pipeline entry points.
//!
//! [`run_merge()`] executes every stage once: load primary, repair and parse
//! the new data, validate, derive, merge, write. [`format_new_data()`] is the
//! validate + derive unit on its own, for callers that already hold a parsed
//! table.
//!
//! Fatal problems come back as [`crate::error::MergeError`]. A new-data file
//! that validates down to zero rows is reported as
//! [`MergeOutcome::NoValidData`] and no output is written.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    dataset::{Dataset, Separator},
    error::Result,
    fields::{self, ParsedTable},
    format::{self, FORMATTED_COLUMNS, FormattedCallRecord},
    io_utils, merge, repair,
    validate::{self, SortOutcome, ValidationReport},
    writer,
};

#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub primary: PathBuf,
    pub new_data: PathBuf,
    /// `None` or `-` writes to stdout.
    pub output: Option<PathBuf>,
    pub primary_separator: Separator,
    pub new_data_separator: Separator,
    pub output_separator: Separator,
    pub encoding: &'static Encoding,
}

impl MergeRequest {
    pub fn new(
        primary: impl Into<PathBuf>,
        new_data: impl Into<PathBuf>,
        output: Option<PathBuf>,
    ) -> Self {
        MergeRequest {
            primary: primary.into(),
            new_data: new_data.into(),
            output,
            primary_separator: Separator::Semicolon,
            new_data_separator: Separator::Comma,
            output_separator: Separator::Semicolon,
            encoding: UTF_8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub primary_rows: usize,
    pub new_rows: usize,
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub output: String,
    pub report: ValidationReport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(MergeSummary),
    /// Validation left nothing to append; the output was not written.
    NoValidData(ValidationReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutcome {
    pub records: Vec<FormattedCallRecord>,
    pub report: ValidationReport,
}

impl FormatOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The formatted rows as a dataset; keeps the fixed header when empty.
    pub fn to_dataset(&self) -> Dataset {
        let mut dataset =
            Dataset::with_columns(FORMATTED_COLUMNS.iter().map(|c| c.to_string()).collect());
        dataset.extend(self.records.iter().map(FormattedCallRecord::to_record));
        dataset
    }
}

/// Repairs and parses the raw text of a new-data export.
pub fn parse_new_data(text: &str, separator: Separator) -> Result<ParsedTable> {
    let repaired = repair::repair_text(text);
    debug!(
        "Repaired new data: header {:?}, {} data line(s)",
        repaired.header,
        repaired.lines.len()
    );
    fields::parse_repaired(&repaired, separator)
}

pub fn load_new_data(
    path: &Path,
    separator: Separator,
    encoding: &'static Encoding,
) -> Result<ParsedTable> {
    let text = io_utils::read_text(path, encoding)?;
    let table = parse_new_data(&text, separator)?;
    info!(
        "Parsed new data {:?}: {} column(s), {} row(s)",
        path,
        table.headers.len(),
        table.rows.len()
    );
    Ok(table)
}

/// Validates a parsed table and derives the formatted call records.
pub fn format_new_data(table: &ParsedTable) -> Result<FormatOutcome> {
    let validated = validate::validate(table)?;
    log_report(&validated.report);
    let records = format::format_calls(&validated.records);
    info!("Formatted {} call record(s)", records.len());
    Ok(FormatOutcome {
        records,
        report: validated.report,
    })
}

/// Reads, repairs, validates, and formats one new-data file.
pub fn run_format(
    path: &Path,
    separator: Separator,
    encoding: &'static Encoding,
) -> Result<FormatOutcome> {
    let table = load_new_data(path, separator, encoding)?;
    format_new_data(&table)
}

pub fn run_merge(request: &MergeRequest) -> Result<MergeOutcome> {
    let primary = merge::load_primary(
        &request.primary,
        request.primary_separator,
        request.encoding,
    )?;
    let formatted = run_format(
        &request.new_data,
        request.new_data_separator,
        request.encoding,
    )?;
    if formatted.is_empty() {
        warn!("No valid rows found in {:?}; nothing merged", request.new_data);
        return Ok(MergeOutcome::NoValidData(formatted.report));
    }

    let primary_rows = primary.len();
    let new_rows = formatted.records.len();
    let merged = merge::merge(
        primary,
        formatted.records.iter().map(FormattedCallRecord::to_record),
    );
    let output = request.output.as_deref();
    writer::write_dataset_to(&merged, output, request.output_separator)?;

    Ok(MergeOutcome::Merged(MergeSummary {
        primary_rows,
        new_rows,
        total_rows: merged.len(),
        columns: merged.columns().to_vec(),
        output: output
            .filter(|path| !io_utils::is_dash(path))
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "stdout".to_string()),
        report: formatted.report,
    }))
}

pub fn write_summary(summary: &MergeSummary, path: &Path) -> Result<()> {
    let mut file = io_utils::create_file(path)?;
    serde_json::to_writer_pretty(&mut file, summary)?;
    file.flush()?;
    info!("Wrote merge summary to {:?}", path);
    Ok(())
}

fn log_report(report: &ValidationReport) {
    if !report.invalid_timestamps.is_empty() {
        let values = report
            .invalid_timestamps
            .iter()
            .map(|invalid| format!("'{}' x{}", invalid.value, invalid.count))
            .collect::<Vec<_>>();
        warn!(
            "{} unparsable 'Call Time' value(s) dropped: {}",
            report.invalid_timestamps.len(),
            values.join(", ")
        );
    }
    if report.missing_call_time > 0 {
        warn!(
            "{} row(s) without a 'Call Time' dropped",
            report.missing_call_time
        );
    }
    debug!("'Call Time' slash dates read {:?}", report.date_order);
    match &report.sort {
        SortOutcome::Sorted { before, after } => {
            info!("'Call Time' was not ascending; rows sorted explicitly");
            debug!("Before sort (first {}): {:?}", before.len(), before);
            debug!("After sort (first {}): {:?}", after.len(), after);
        }
        SortOutcome::AlreadyOrdered => debug!("'Call Time' already ascending; no sort needed"),
        SortOutcome::Empty => debug!("No rows left to order"),
    }
}
