mod common;

use call_merge::{
    dataset::Separator,
    error::MergeError,
    fields::ParsedTable,
    format::{DURATION_SENTINEL, FORMATTED_COLUMNS},
    pipeline::{self, MergeOutcome, MergeRequest},
    validate::{DateOrder, SortOutcome},
};
use common::{NEW_DATA_HEADER, TestWorkspace, sample_export, sample_primary};

fn table(headers: &[&str], rows: &[&[&str]]) -> ParsedTable {
    ParsedTable {
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect(),
    }
}

#[test]
fn export_is_repaired_parsed_and_sorted() {
    let parsed = pipeline::parse_new_data(&sample_export(), Separator::Comma).unwrap();
    assert_eq!(parsed.headers[0], "Call Time");
    assert_eq!(parsed.rows.len(), 3);
    assert_eq!(parsed.rows[1][6], "No answer, caller hung up");

    let outcome = pipeline::format_new_data(&parsed).unwrap();
    let dates: Vec<&str> = outcome.records.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(
        dates,
        vec![
            "05/03/2024 09:15:00",
            "05/03/2024 14:05:10",
            "05/03/2024 23:59:59"
        ]
    );
    assert!(matches!(outcome.report.sort, SortOutcome::Sorted { .. }));

    let unanswered = &outcome.records[0];
    assert_eq!(unanswered.conversation, "non répondu");
    assert_eq!(unanswered.duree, DURATION_SENTINEL);

    let late = &outcome.records[2];
    assert_eq!(late.heure, "23h  - 00h");
    assert_eq!(late.duree, 3900);
}

#[test]
fn formatting_matches_reference_row() {
    let parsed = table(
        &["Call Time", "From", "To", "Status", "Talking"],
        &[&["2024-03-05 14:05:10", "0102030405", "0607080910", "Answered", "02:30"]],
    );
    let outcome = pipeline::format_new_data(&parsed).unwrap();
    let dataset = outcome.to_dataset();
    assert_eq!(dataset.columns(), FORMATTED_COLUMNS);
    assert_eq!(
        dataset.rows(),
        vec![vec![
            "05/03/2024 14:05:10",
            "0102030405",
            "0607080910",
            "02:30",
            "05/03/2024 14:05:100102030405",
            "14h  - 15h",
            "répondu",
            "150",
            "2024-03",
        ]]
    );
}

#[test]
fn formatting_is_deterministic() {
    let parsed = table(
        &["Call Time", "From", "To", "Status", "Talking"],
        &[&["2024-03-05 14:05:10", "01", "06", "Answered", "bogus"]],
    );
    let first = pipeline::format_new_data(&parsed).unwrap();
    let second = pipeline::format_new_data(&parsed).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.records[0].duree, DURATION_SENTINEL);
}

#[test]
fn empty_formatted_result_keeps_fixed_header() {
    let parsed = table(&["Call Time", "From", "To", "Status", "Talking"], &[]);
    let outcome = pipeline::format_new_data(&parsed).unwrap();
    assert!(outcome.is_empty());
    assert_eq!(outcome.to_dataset().columns(), FORMATTED_COLUMNS);
}

#[test]
fn missing_status_column_is_fatal() {
    let parsed = table(
        &["Call Time", "From", "To", "Talking"],
        &[&["2024-03-05 14:05:10", "01", "06", "02:30"]],
    );
    match pipeline::format_new_data(&parsed) {
        Err(MergeError::MissingColumns { columns }) => assert_eq!(columns, vec!["Status"]),
        other => panic!("expected missing columns, got {other:?}"),
    }
}

#[test]
fn merge_writes_primary_rows_then_new_rows() {
    let ws = TestWorkspace::new();
    let primary = ws.write("main.csv", &sample_primary());
    let new_data = ws.write("export.csv", &sample_export());
    let output = ws.file("merged.csv");

    let request = MergeRequest::new(&primary, &new_data, Some(output.clone()));
    let summary = match pipeline::run_merge(&request).unwrap() {
        MergeOutcome::Merged(summary) => summary,
        other => panic!("expected merge, got {other:?}"),
    };
    assert_eq!(summary.primary_rows, 1);
    assert_eq!(summary.new_rows, 3);
    assert_eq!(summary.total_rows, 4);

    let text = ws.read("merged.csv");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[0],
        "Date;Appelant;Destination;Conversation;ID;Heure;Répondu;Durée;Mois"
    );
    assert!(lines[1].starts_with("04/03/2024 08:00:00;"));
    assert_eq!(
        lines[2],
        "05/03/2024 09:15:00;0111111111;0622222222;non répondu;05/03/2024 09:15:000111111111;09h  - 10h;non répondu;10000;2024-03"
    );
}

#[test]
fn schema_union_fills_missing_primary_columns() {
    let ws = TestWorkspace::new();
    let primary = ws.write("main.csv", "Date;Note\n01/01/2024 10:00:00;legacy\n");
    let new_data = ws.write(
        "export.csv",
        "Call Time,From,To,Status,Talking\n2024-03-05 14:05:10,01,06,Answered,02:30\n",
    );
    let output = ws.file("merged.csv");

    let request = MergeRequest::new(&primary, &new_data, Some(output));
    let summary = match pipeline::run_merge(&request).unwrap() {
        MergeOutcome::Merged(summary) => summary,
        other => panic!("expected merge, got {other:?}"),
    };
    assert_eq!(summary.columns.len(), 10);
    assert_eq!(summary.columns[..2], ["Date", "Note"]);

    let text = ws.read("merged.csv");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Date;Note;Appelant;Destination;Conversation;ID;Heure;Répondu;Durée;Mois"
    );
    assert_eq!(lines[1], "01/01/2024 10:00:00;legacy;;;;;;;;");
    assert!(lines[2].starts_with("05/03/2024 14:05:10;;01;06;02:30;"));
}

#[test]
fn unparsable_timestamps_yield_no_valid_data_and_no_output() {
    let ws = TestWorkspace::new();
    let primary = ws.write("main.csv", &sample_primary());
    let new_data = ws.write(
        "export.csv",
        "Call Time,From,To,Status,Talking\nyesterday,01,06,Answered,02:30\nsoon,01,06,Answered,02:30\n",
    );
    let output = ws.file("merged.csv");

    let request = MergeRequest::new(&primary, &new_data, Some(output.clone()));
    match pipeline::run_merge(&request).unwrap() {
        MergeOutcome::NoValidData(report) => {
            assert_eq!(report.input_rows, 2);
            assert_eq!(report.invalid_timestamps.len(), 2);
        }
        other => panic!("expected no valid data, got {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn missing_column_aborts_without_output() {
    let ws = TestWorkspace::new();
    let primary = ws.write("main.csv", &sample_primary());
    let new_data = ws.write(
        "export.csv",
        "Call Time,From,To,Talking\n2024-03-05 14:05:10,01,06,02:30\n",
    );
    let output = ws.file("merged.csv");

    let request = MergeRequest::new(&primary, &new_data, Some(output.clone()));
    let err = pipeline::run_merge(&request).unwrap_err();
    assert_eq!(err.kind(), "missing_columns");
    assert!(err.to_string().contains("Status"));
    assert!(!output.exists());
}

#[test]
fn malformed_header_aborts_with_the_line() {
    let ws = TestWorkspace::new();
    let primary = ws.write("main.csv", &sample_primary());
    let new_data = ws.write("export.csv", "\"Call Time,From,To,Status,Talking\n");
    let request = MergeRequest::new(&primary, &new_data, Some(ws.file("merged.csv")));
    let err = pipeline::run_merge(&request).unwrap_err();
    assert_eq!(err.kind(), "parse");
    assert!(err.to_string().contains("\"Call Time,From,To,Status,Talking"));
}

#[test]
fn missing_primary_file_is_an_io_error() {
    let ws = TestWorkspace::new();
    let new_data = ws.write("export.csv", &sample_export());
    let request = MergeRequest::new(ws.file("absent.csv"), &new_data, Some(ws.file("out.csv")));
    let err = pipeline::run_merge(&request).unwrap_err();
    assert_eq!(err.kind(), "io");
}

#[test]
fn summary_serializes_to_json() {
    let ws = TestWorkspace::new();
    let primary = ws.write("main.csv", &sample_primary());
    let new_data = ws.write("export.csv", &sample_export());
    let request = MergeRequest::new(&primary, &new_data, Some(ws.file("merged.csv")));
    let MergeOutcome::Merged(summary) = pipeline::run_merge(&request).unwrap() else {
        panic!("expected merge");
    };
    let report_path = ws.file("summary.json");
    pipeline::write_summary(&summary, &report_path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&ws.read("summary.json")).unwrap();
    assert_eq!(json["new_rows"], 3);
    assert_eq!(json["report"]["sort"]["outcome"], "sorted");
}

#[test]
fn lone_quote_line_is_not_counted_as_a_row() {
    let text = format!(
        "{NEW_DATA_HEADER}\n\"\n2024-03-05 14:05:10,0102,0607,Inbound,Answered,00:05,02:30\n"
    );
    let parsed = pipeline::parse_new_data(&text, Separator::Comma).unwrap();
    assert_eq!(parsed.rows.len(), 1);

    let outcome = pipeline::format_new_data(&parsed).unwrap();
    assert_eq!(outcome.report.input_rows, 1);
    assert_eq!(outcome.report.missing_call_time, 0);
    assert_eq!(outcome.records.len(), 1);
}

#[test]
fn day_first_export_keeps_every_row() {
    let text = format!(
        "{NEW_DATA_HEADER}\n\
         13/03/2024 14:05:10,0102,0607,Inbound,Answered,00:05,02:30\n\
         02/04/2024 09:15:00,0103,0608,Inbound,Answered,00:03,01:00\n"
    );
    let parsed = pipeline::parse_new_data(&text, Separator::Comma).unwrap();
    let outcome = pipeline::format_new_data(&parsed).unwrap();
    assert_eq!(outcome.report.date_order, DateOrder::DayFirst);
    assert!(outcome.report.invalid_timestamps.is_empty());
    let dates: Vec<&str> = outcome.records.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["13/03/2024 14:05:10", "02/04/2024 09:15:00"]);
    assert_eq!(outcome.records[1].mois, "2024-04");
}
