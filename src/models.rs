use pdf_table_xlsx::{ExtractionRun, PageIssue, PageResult, RunSummary};
use serde::{Deserialize, Serialize};

/// Largest PDF body the worker accepts. The parsed document and the
/// workbook must fit beside it in the isolate's 128 MB heap.
pub const MAX_PDF_BYTES: usize = 25 * 1024 * 1024;
/// Rows per table included in JSON previews.
pub const PREVIEW_ROW_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageCountResponse {
    pub page_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TablePreview {
    pub page: u32,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
    pub truncated: bool,
}

impl TablePreview {
    #[must_use]
    pub fn from_result(result: &PageResult, row_limit: usize) -> Self {
        let row_count = result.table.row_count();
        Self {
            page: result.page,
            headers: result.table.headers.clone(),
            rows: result.table.rows.iter().take(row_limit).cloned().collect(),
            row_count,
            truncated: row_count > row_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueItem {
    pub page: u32,
    pub code: String,
    pub message: String,
}

impl From<&PageIssue> for IssueItem {
    fn from(issue: &PageIssue) -> Self {
        Self {
            page: issue.page,
            code: issue.code.as_str().to_string(),
            message: issue.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryItem {
    pub tables_extracted: usize,
    pub total_rows: usize,
    pub max_columns: usize,
}

impl From<RunSummary> for SummaryItem {
    fn from(summary: RunSummary) -> Self {
        Self {
            tables_extracted: summary.table_count,
            total_rows: summary.total_rows,
            max_columns: summary.max_columns,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TablesResponse {
    pub page_count: u32,
    pub summary: SummaryItem,
    pub tables: Vec<TablePreview>,
    pub issues: Vec<IssueItem>,
}

impl TablesResponse {
    #[must_use]
    pub fn from_run(run: &ExtractionRun, row_limit: usize) -> Self {
        Self {
            page_count: run.page_count,
            summary: run.summary().into(),
            tables: run
                .tables
                .iter()
                .map(|result| TablePreview::from_result(result, row_limit))
                .collect(),
            issues: run.issues.iter().map(IssueItem::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
