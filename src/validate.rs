//! Required-column checks, `Call Time` normalization, and chronological order.
//!
//! Validation reports what it did through [`ValidationReport`] instead of
//! printing it, so callers and tests can inspect dropped values and whether a
//! sort happened.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::Serialize;

use crate::{
    dataset::Record,
    error::{MergeError, Result},
    fields::ParsedTable,
};

pub const CALL_TIME: &str = "Call Time";
pub const FROM: &str = "From";
pub const TO: &str = "To";
pub const STATUS: &str = "Status";
pub const TALKING: &str = "Talking";

pub const REQUIRED_COLUMNS: [&str; 5] = [CALL_TIME, FROM, TO, STATUS, TALKING];

const SORT_SAMPLE_SIZE: usize = 5;

const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];

/// How `DD/MM` vs `MM/DD` slash dates are read for a whole `Call Time` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    #[default]
    MonthFirst,
    DayFirst,
}

impl DateOrder {
    fn slash_formats(self) -> &'static [&'static str] {
        match self {
            DateOrder::MonthFirst => MONTH_FIRST_FORMATS,
            DateOrder::DayFirst => DAY_FIRST_FORMATS,
        }
    }
}

/// A new-data row that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCallRecord {
    pub call_time: NaiveDateTime,
    pub from: String,
    pub to: String,
    pub status: String,
    pub talking: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidTimestamp {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SortOutcome {
    /// Nothing survived validation, so there was nothing to order.
    Empty,
    AlreadyOrdered,
    Sorted {
        before: Vec<NaiveDateTime>,
        after: Vec<NaiveDateTime>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub input_rows: usize,
    pub valid_rows: usize,
    /// Distinct unparsable `Call Time` values, in first-seen order.
    pub invalid_timestamps: Vec<InvalidTimestamp>,
    pub missing_call_time: usize,
    pub date_order: DateOrder,
    pub sort: SortOutcome,
}

impl ValidationReport {
    pub fn dropped_rows(&self) -> usize {
        self.input_rows - self.valid_rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCalls {
    pub records: Vec<RawCallRecord>,
    pub report: ValidationReport,
}

/// Returns every required column absent from `headers`, in canonical order.
pub fn missing_columns(headers: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|header| header == *required))
        .map(|required| required.to_string())
        .collect()
}

pub fn validate(table: &ParsedTable) -> Result<ValidatedCalls> {
    let missing = missing_columns(&table.headers);
    if !missing.is_empty() {
        return Err(MergeError::MissingColumns { columns: missing });
    }

    let rows = table
        .rows
        .iter()
        .map(|row| Record::from_row(&table.headers, row))
        .collect::<Vec<_>>();
    let date_order = detect_date_order(rows.iter().filter_map(|record| record.get(CALL_TIME)));

    let mut records = Vec::with_capacity(rows.len());
    let mut invalid = Vec::new();
    let mut missing_call_time = 0usize;

    for record in &rows {
        let raw_time = record.get(CALL_TIME).unwrap_or("");
        if raw_time.trim().is_empty() {
            missing_call_time += 1;
            continue;
        }
        match parse_call_time_with(raw_time, date_order) {
            Some(call_time) => records.push(RawCallRecord {
                call_time,
                from: field(record, FROM),
                to: field(record, TO),
                status: field(record, STATUS),
                talking: field(record, TALKING),
            }),
            None => invalid.push(raw_time.to_string()),
        }
    }

    let sort = ensure_chronological(&mut records);
    let report = ValidationReport {
        input_rows: table.rows.len(),
        valid_rows: records.len(),
        invalid_timestamps: tally(invalid),
        missing_call_time,
        date_order,
        sort,
    };
    Ok(ValidatedCalls { records, report })
}

fn field(record: &Record, column: &str) -> String {
    record.get(column).unwrap_or_default().to_string()
}

/// Parses a single `Call Time` value on its own.
///
/// Slash dates are tried month-first, then day-first, so `13/03/2024` still
/// parses. Within a column, [`validate()`] locks one order for every row.
pub fn parse_call_time(value: &str) -> Option<NaiveDateTime> {
    parse_call_time_with(value, DateOrder::MonthFirst)
        .or_else(|| parse_call_time_with(value, DateOrder::DayFirst))
}

pub fn parse_call_time_with(value: &str, order: DateOrder) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    ISO_FORMATS
        .iter()
        .chain(order.slash_formats())
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Picks the slash order from the first value that parses as a slash date.
///
/// Month-first wins when both read the value; day-first is chosen only when
/// the leading number cannot be a month. Columns without slash dates default
/// to month-first.
pub fn detect_date_order<'a, I>(values: I) -> DateOrder
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .find_map(|value| {
            [DateOrder::MonthFirst, DateOrder::DayFirst]
                .into_iter()
                .find(|order| parse_slash_date(value, *order).is_some())
        })
        .unwrap_or_default()
}

fn parse_slash_date(value: &str, order: DateOrder) -> Option<NaiveDateTime> {
    order
        .slash_formats()
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Stable-sorts by `call_time` only when the input is out of order.
pub fn ensure_chronological(records: &mut [RawCallRecord]) -> SortOutcome {
    if records.is_empty() {
        return SortOutcome::Empty;
    }
    if is_chronological(records) {
        return SortOutcome::AlreadyOrdered;
    }
    let before = sample(records);
    records.sort_by_key(|record| record.call_time);
    let after = sample(records);
    SortOutcome::Sorted { before, after }
}

pub fn is_chronological(records: &[RawCallRecord]) -> bool {
    records
        .iter()
        .tuple_windows()
        .all(|(left, right)| left.call_time <= right.call_time)
}

fn sample(records: &[RawCallRecord]) -> Vec<NaiveDateTime> {
    records
        .iter()
        .take(SORT_SAMPLE_SIZE)
        .map(|record| record.call_time)
        .collect()
}

fn tally(values: Vec<String>) -> Vec<InvalidTimestamp> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in &values {
        *counts.entry(value.as_str()).or_default() += 1;
    }
    values
        .iter()
        .unique()
        .map(|value| InvalidTimestamp {
            value: value.clone(),
            count: counts.get(value.as_str()).copied().unwrap_or_default(),
        })
        .collect()
}
