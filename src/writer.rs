//! Delimited-text serialization of a [`Dataset`].

use std::{io::Write, path::Path};

use csv::QuoteStyle;
use log::info;

use crate::{
    dataset::{Dataset, Separator},
    error::Result,
    io_utils,
};

/// Writes the schema as the header row, then one line per record.
///
/// Fields are quoted only when they contain the separator, a quote, or a line
/// break; embedded quotes are doubled.
pub fn write_dataset<W: Write>(dataset: &Dataset, writer: W, separator: Separator) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(separator.as_byte())
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .flexible(false)
        .from_writer(writer);
    csv_writer.write_record(dataset.columns())?;
    for record in dataset.records() {
        csv_writer.write_record(dataset.row_values(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_dataset_to_string(dataset: &Dataset, separator: Separator) -> Result<String> {
    let mut buffer = Vec::new();
    write_dataset(dataset, &mut buffer, separator)?;
    // Every field is UTF-8 and separators are ASCII.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes to `path` (or stdout for `None`/`-`); a failure leaves no file.
pub fn write_dataset_to(dataset: &Dataset, path: Option<&Path>, separator: Separator) -> Result<()> {
    io_utils::write_output(path, |sink| write_dataset(dataset, sink, separator))?;
    info!(
        "Wrote {} row(s) x {} column(s) -> {}",
        dataset.len(),
        dataset.columns().len(),
        path.filter(|p| !io_utils::is_dash(p))
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string())
    );
    Ok(())
}
