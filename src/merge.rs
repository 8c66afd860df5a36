//! Loading the primary dataset and appending new records onto it.

use std::path::Path;

use encoding_rs::Encoding;
use itertools::Itertools;
use log::{debug, info};

use crate::{
    dataset::{Dataset, Record, Separator},
    error::{MergeError, Result},
    io_utils,
};

/// Loads the existing dataset verbatim: values stay text, nothing is retyped.
pub fn load_primary(
    path: &Path,
    separator: Separator,
    encoding: &'static Encoding,
) -> Result<Dataset> {
    let text = io_utils::read_text(path, encoding)?;
    let dataset = parse_primary(&text, separator)?;
    info!(
        "Loaded primary dataset {:?}: {} row(s), {} column(s)",
        path,
        dataset.len(),
        dataset.columns().len()
    );
    Ok(dataset)
}

pub fn parse_primary(text: &str, separator: Separator) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(separator.as_byte())
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut dataset = Dataset::with_columns(headers.clone());
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        if row.len() > headers.len() {
            let line = row.iter().join(separator.to_string().as_str());
            return Err(MergeError::parse(
                line,
                format!(
                    "row {} has {} field(s) but the header declares {}",
                    idx + 2,
                    row.len(),
                    headers.len()
                ),
            ));
        }
        let values: Vec<String> = row.iter().map(str::to_string).collect();
        dataset.push(Record::from_row(&headers, &values));
    }
    debug!("Parsed {} primary row(s)", dataset.len());
    Ok(dataset)
}

/// Primary rows first, then new rows; the schema is the ordered column union.
///
/// No deduplication happens here, so repeated IDs survive.
pub fn merge(primary: Dataset, new_records: impl IntoIterator<Item = Record>) -> Dataset {
    let mut merged = primary;
    let before = merged.columns().len();
    merged.extend(new_records);
    debug!(
        "Merged dataset has {} row(s); {} column(s) added to the primary schema",
        merged.len(),
        merged.columns().len() - before
    );
    merged
}
