//! Strict field splitting of repaired lines.
//!
//! Runs after [`crate::repair`]: each line is handed to a `csv` reader on its
//! own, so a stray quote can never swallow the rows after it. The header must
//! have balanced quotes; data rows are parsed best-effort.

use crate::{
    dataset::Separator,
    error::{MergeError, Result},
    repair::RepairedLines,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn parse_repaired(repaired: &RepairedLines, separator: Separator) -> Result<ParsedTable> {
    parse_table(&repaired.header, &repaired.lines, separator)
}

pub fn parse_table<S>(header: &str, lines: &[S], separator: Separator) -> Result<ParsedTable>
where
    S: AsRef<str>,
{
    if !has_balanced_quotes(header) {
        return Err(MergeError::parse(header, "unbalanced quotes in header"));
    }
    let headers = split_line(header, separator)?;

    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line.as_ref();
        let fields = split_line(line, separator)?;
        if fields.is_empty() {
            continue;
        }
        if fields.len() > headers.len() {
            return Err(MergeError::parse(
                line,
                format!(
                    "{} field(s) but the header declares {}",
                    fields.len(),
                    headers.len()
                ),
            ));
        }
        rows.push(fields);
    }
    Ok(ParsedTable { headers, rows })
}

/// Splits one line into fields using standard CSV quoting.
pub fn split_line(line: &str, separator: Separator) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(separator.as_byte())
        .double_quote(true)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Ok(Vec::new());
    }
    Ok(record.iter().map(str::to_string).collect())
}

/// Doubled quotes toggle twice, so only a dangling quote leaves the scan open.
fn has_balanced_quotes(line: &str) -> bool {
    line.chars().filter(|&ch| ch == '"').count() % 2 == 0
}
