//! Tolerant line repair for the call-log export format.
//!
//! The export wraps some data lines in one extra pair of quotes and doubles
//! every quote inside them, e.g.
//!
//! ```text
//! "2024-03-05 14:05:10,0102,0607,Unanswered,""No answer, busy"""
//! ```
//!
//! [`repair_line()`] turns that back into a line a standard CSV reader accepts.
//! Repair never fails: anything that does not match the wrapped shape passes
//! through untouched.

use std::borrow::Cow;

const BYTE_ORDER_MARK: char = '\u{feff}';
const TRAILER_PREFIX: &str = "Totals,";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairedLines {
    pub header: String,
    pub lines: Vec<String>,
}

/// Splits `text` into lines and repairs them; see [`repair_lines()`].
pub fn repair_text(text: &str) -> RepairedLines {
    repair_lines(text.lines())
}

/// Repairs the header (first line) and every data line that follows it.
///
/// Blank lines and the `Totals,` trailer are dropped from the data lines.
pub fn repair_lines<I, S>(lines: I) -> RepairedLines
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = lines.into_iter();
    let header = iter
        .next()
        .map(|line| repair_header(line.as_ref()))
        .unwrap_or_default();
    let lines = iter
        .filter_map(|line| {
            let trimmed = line.as_ref().trim();
            if trimmed.is_empty() || trimmed.starts_with(TRAILER_PREFIX) {
                None
            } else {
                Some(repair_line(trimmed).into_owned())
            }
        })
        .collect();
    RepairedLines { header, lines }
}

/// Header lines are never outer-wrapped, but may still carry doubled quotes.
pub fn repair_header(line: &str) -> String {
    let trimmed = line.trim_start_matches(BYTE_ORDER_MARK).trim();
    collapse_doubled_quotes(trimmed).into_owned()
}

/// Strips one enclosing quote pair and collapses `""` to `"` inside it.
///
/// A lone `"` counts as a wrapper around an empty line.
pub fn repair_line(line: &str) -> Cow<'_, str> {
    let trimmed = line.trim();
    if trimmed == "\"" {
        return Cow::Borrowed("");
    }
    let unwrapped = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'));
    match unwrapped {
        Some(inner) => Cow::Owned(collapse_doubled_quotes(inner).into_owned()),
        None => Cow::Borrowed(trimmed),
    }
}

fn collapse_doubled_quotes(value: &str) -> Cow<'_, str> {
    if value.contains("\"\"") {
        Cow::Owned(value.replace("\"\"", "\""))
    } else {
        Cow::Borrowed(value)
    }
}
