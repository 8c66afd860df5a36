//! Aligned plain-text rendering of a dataset for terminal previews.

use std::fmt::Write as _;

use crate::dataset::Dataset;

const MAX_CELL_WIDTH: usize = 40;
const COLUMN_GAP: &str = "  ";

pub fn render_dataset(dataset: &Dataset, limit: Option<usize>) -> String {
    let rows = dataset
        .rows()
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .collect::<Vec<_>>();
    render_table(dataset.columns(), &rows)
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let headers = headers.iter().map(|h| clean_cell(h)).collect::<Vec<_>>();
    let rows = rows
        .iter()
        .map(|row| row.iter().map(|cell| clean_cell(cell)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(1))
        .collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_line(&mut output, &headers, &widths);
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    push_line(&mut output, &rule, &widths);
    for row in &rows {
        push_line(&mut output, row, &widths);
    }
    output
}

fn push_line(output: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str(COLUMN_GAP);
        }
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        let _ = write!(line, "{cell:<width$}");
    }
    let _ = writeln!(output, "{}", line.trim_end());
}

/// Flattens control characters and caps very long values with an ellipsis.
fn clean_cell(value: &str) -> String {
    let flat: String = value
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();
    if flat.chars().count() > MAX_CELL_WIDTH {
        let mut truncated: String = flat.chars().take(MAX_CELL_WIDTH - 1).collect();
        truncated.push('…');
        truncated
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Record;

    #[test]
    fn columns_align_on_character_width() {
        let headers = vec!["Durée".to_string(), "Répondu".to_string()];
        let rows = vec![vec!["150".to_string(), "répondu".to_string()]];
        let rendered = render_table(&headers, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["Durée  Répondu", "-----  -------", "150    répondu"]);
    }

    #[test]
    fn long_and_multiline_cells_are_flattened() {
        let headers = vec!["note".to_string()];
        let rows = vec![vec![format!("a\nb{}", "x".repeat(60))]];
        let rendered = render_table(&headers, &rows);
        let body = rendered.lines().nth(2).unwrap();
        assert!(body.starts_with("a b"));
        assert_eq!(body.chars().count(), MAX_CELL_WIDTH);
        assert!(body.ends_with('…'));
    }

    #[test]
    fn limit_caps_rendered_rows() {
        let dataset =
            Dataset::from_records((0..5).map(|i| Record::from_pairs([("n", i.to_string())])));
        let rendered = render_dataset(&dataset, Some(2));
        assert_eq!(rendered.lines().count(), 4);
    }
}
