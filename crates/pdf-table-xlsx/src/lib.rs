mod columns;
mod error;
mod extract;
mod model;
mod options;
mod pdf_reader;
mod table_detect;
mod table_parse;
mod validate;
mod warning;
mod workbook;

use std::path::Path;

use tracing::info;

pub use columns::{UNNAMED_COLUMN, normalize_header_strings, normalize_headers};
pub use error::ExtractError;
pub use extract::{TableSource, extract_tables};
pub use model::{ExtractionRun, NormalizedTable, PageResult, RawTable, RunSummary, Sheet};
pub use options::{ExtractOptions, PageSelection};
pub use pdf_reader::PdfDocument;
pub use table_detect::{EdgeStrategy, TableSettings};
pub use validate::{
    MIN_CONFORMITY, Rejection, TableShape, ValidationRules, is_table, validate_table,
};
pub use warning::{IssueCode, PageIssue};
pub use workbook::{
    COMBINED_SHEET_NAME, XLSX_FILE_NAME, XLSX_MIME_TYPE, assemble_sheets, build_workbook,
    page_sheet_name, write_workbook,
};

/// Outcome of a PDF-to-workbook conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub run: ExtractionRun,
    /// `None` when no page yielded a table.
    pub workbook: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    pub summary: RunSummary,
    pub page_count: u32,
    pub issues: Vec<PageIssue>,
    pub written: bool,
}

fn check_options(options: &ExtractOptions) -> Result<(), ExtractError> {
    if options.min_rows < 1 {
        return Err(ExtractError::InvalidOption(
            "min_rows must be at least 1".to_string(),
        ));
    }
    if options.min_cols < 1 {
        return Err(ExtractError::InvalidOption(
            "min_cols must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// # Errors
///
/// Fails when the bytes are not a readable PDF.
pub fn count_pdf_pages(input_pdf: &[u8]) -> Result<u32, ExtractError> {
    Ok(PdfDocument::from_bytes(input_pdf)?.page_count())
}

/// Opens the PDF and runs table extraction over the selected pages.
///
/// # Errors
///
/// Only document-level failures are returned; page-level ones are recorded
/// in the run's issues.
pub fn extract_tables_from_bytes(
    input_pdf: &[u8],
    options: &ExtractOptions,
) -> Result<ExtractionRun, ExtractError> {
    check_options(options)?;
    let document = PdfDocument::from_bytes(input_pdf)?;
    Ok(run_extraction(&document, options))
}

fn run_extraction(document: &PdfDocument, options: &ExtractOptions) -> ExtractionRun {
    let run = extract_tables(
        document,
        options.pages.as_ref(),
        &options.validation_rules(),
    );
    let summary = run.summary();
    info!(
        pages = run.page_count,
        tables = summary.table_count,
        rows = summary.total_rows,
        issues = run.issues.len(),
        "table extraction finished"
    );
    run
}

/// Extracts tables and builds the workbook in memory.
///
/// # Errors
///
/// Fails on unreadable input or when the workbook cannot be written.
pub fn convert_pdf_bytes_to_xlsx(
    input_pdf: &[u8],
    options: &ExtractOptions,
) -> Result<Conversion, ExtractError> {
    let run = extract_tables_from_bytes(input_pdf, options)?;
    let workbook = if run.is_empty() {
        None
    } else {
        Some(build_workbook(&run.tables, options.combine)?)
    };
    Ok(Conversion { run, workbook })
}

/// File-to-file conversion. Nothing is written when no table was found.
///
/// # Errors
///
/// Fails on I/O errors, unreadable input, or workbook write errors.
pub fn convert_pdf_to_xlsx(
    input_pdf: &Path,
    output_xlsx: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    check_options(options)?;
    let document = PdfDocument::from_path(input_pdf)?;
    let run = run_extraction(&document, options);

    let written = if run.is_empty() {
        false
    } else {
        let bytes = build_workbook(&run.tables, options.combine)?;
        std::fs::write(output_xlsx, bytes)?;
        true
    };

    Ok(ExtractionReport {
        summary: run.summary(),
        page_count: run.page_count,
        issues: run.issues,
        written,
    })
}
