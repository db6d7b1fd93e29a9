use std::collections::HashMap;

use pdf_table_xlsx::{
    ExtractError, ExtractionRun, IssueCode, NormalizedTable, PageIssue, PageResult,
};
use pdf_table_worker::error::ApiError;
use pdf_table_worker::models::{IssueItem, MAX_PDF_BYTES, TablesResponse};
use pdf_table_worker::pipeline::{check_content_length, check_pdf_body, page_count};
use pdf_table_worker::routes::parse_extract_options;
use pretty_assertions::assert_eq;

fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

fn sample_run() -> ExtractionRun {
    ExtractionRun {
        page_count: 3,
        tables: vec![PageResult {
            page: 1,
            table: NormalizedTable {
                headers: vec!["Name".to_string(), "Age".to_string()],
                rows: vec![
                    vec!["Alice".to_string(), "30".to_string()],
                    vec!["Bob".to_string(), "22".to_string()],
                    vec!["Carol".to_string(), "41".to_string()],
                ],
            },
        }],
        issues: vec![PageIssue::new(
            IssueCode::ExtractionFailed,
            2,
            "could not extract table: bad stream",
        )],
    }
}

#[test]
fn options_default_to_all_pages_combined() {
    let options = parse_extract_options(&query(&[])).expect("defaults should parse");
    assert!(options.pages.is_none());
    assert!(options.combine);
    assert_eq!((options.min_rows, options.min_cols), (2, 2));
}

#[test]
fn options_read_pages_combine_and_thresholds() {
    let options = parse_extract_options(&query(&[
        ("pages", "1-2,4"),
        ("combine", "false"),
        ("min_rows", "3"),
        ("min_cols", "4"),
    ]))
    .expect("options should parse");

    let pages = options.pages.expect("pages should be set");
    assert_eq!(pages.pages().collect::<Vec<_>>(), vec![1, 2, 4]);
    assert!(!options.combine);
    assert_eq!((options.min_rows, options.min_cols), (3, 4));
}

#[test]
fn bad_options_are_bad_requests() {
    for pairs in [
        vec![("pages", "3-1")],
        vec![("combine", "maybe")],
        vec![("min_cols", "0")],
        vec![("min_rows", "two")],
    ] {
        let error = parse_extract_options(&query(&pairs)).expect_err("options should fail");
        assert_eq!(error.status_code(), 400, "{pairs:?} -> {error}");
    }
}

#[test]
fn empty_body_is_rejected_before_parsing() {
    let error = check_pdf_body(&[]).expect_err("empty body should fail");
    assert_eq!(error.code(), "bad_request");
}

#[test]
fn oversized_content_length_is_rejected_before_buffering() {
    let declared = (MAX_PDF_BYTES + 1).to_string();
    let error = check_content_length(Some(&declared)).expect_err("oversized body should fail");
    assert_eq!(error.status_code(), 413);

    let error = check_content_length(Some("4294967296000")).expect_err("huge body should fail");
    assert_eq!(error.code(), "payload_too_large");

    let error = check_content_length(Some("lots")).expect_err("garbage length should fail");
    assert_eq!(error.status_code(), 400);

    assert!(check_content_length(Some(&MAX_PDF_BYTES.to_string())).is_ok());
    assert!(check_content_length(None).is_ok());
}

#[test]
fn oversized_body_is_rejected() {
    let body = vec![0_u8; MAX_PDF_BYTES + 1];
    let error = check_pdf_body(&body).expect_err("oversized body should fail");
    assert_eq!(error.status_code(), 413);
}

#[test]
fn non_pdf_body_is_unprocessable() {
    let error = page_count(b"hello").expect_err("text is not a PDF");
    assert_eq!(error.status_code(), 422);
}

#[test]
fn no_tables_maps_to_not_found() {
    let error = ApiError::from(ExtractError::NoTablesFound);
    assert_eq!(error.status_code(), 404);
    assert_eq!(error.message(), "no tables found on the selected pages");
}

#[test]
fn preview_truncates_rows_and_carries_issues() {
    let response = TablesResponse::from_run(&sample_run(), 2);

    assert_eq!(response.summary.tables_extracted, 1);
    assert_eq!(response.summary.total_rows, 3);
    assert_eq!(response.summary.max_columns, 2);
    assert_eq!(response.tables[0].rows.len(), 2);
    assert_eq!(response.tables[0].row_count, 3);
    assert!(response.tables[0].truncated);
    assert_eq!(
        response.issues,
        vec![IssueItem {
            page: 2,
            code: "extraction_failed".to_string(),
            message: "could not extract table: bad stream".to_string(),
        }]
    );
}

#[test]
fn preview_serializes_with_snake_case_fields() {
    let json = serde_json::to_value(TablesResponse::from_run(&sample_run(), 10))
        .expect("response should serialize");
    assert_eq!(json["summary"]["tables_extracted"], 1);
    assert_eq!(json["tables"][0]["headers"][1], "Age");
    assert_eq!(json["issues"][0]["code"], "extraction_failed");
}
