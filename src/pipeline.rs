use pdf_table_xlsx::{
    ExtractOptions, IssueCode, RunSummary, build_workbook, count_pdf_pages,
    extract_tables_from_bytes,
};

use crate::error::ApiError;
use crate::models::{MAX_PDF_BYTES, PREVIEW_ROW_LIMIT, PageCountResponse, TablesResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxExport {
    pub bytes: Vec<u8>,
    pub summary: RunSummary,
}

/// Rejects a request whose declared `Content-Length` is over the limit,
/// before its body is buffered.
pub fn check_content_length(header: Option<&str>) -> Result<(), ApiError> {
    let Some(raw) = header else {
        return Ok(());
    };
    let declared = raw.trim().parse::<u64>().map_err(|_| {
        ApiError::BadRequest(format!("invalid Content-Length header: '{raw}'"))
    })?;
    if declared > MAX_PDF_BYTES as u64 {
        return Err(ApiError::PayloadTooLarge(format!(
            "PDF is {declared} bytes, the limit is {MAX_PDF_BYTES}"
        )));
    }
    Ok(())
}

pub fn check_pdf_body(pdf_bytes: &[u8]) -> Result<(), ApiError> {
    if pdf_bytes.is_empty() {
        return Err(ApiError::BadRequest(
            "request body must contain a PDF file".to_string(),
        ));
    }
    if pdf_bytes.len() > MAX_PDF_BYTES {
        return Err(ApiError::PayloadTooLarge(format!(
            "PDF is {} bytes, the limit is {MAX_PDF_BYTES}",
            pdf_bytes.len()
        )));
    }
    Ok(())
}

pub fn page_count(pdf_bytes: &[u8]) -> Result<PageCountResponse, ApiError> {
    check_pdf_body(pdf_bytes)?;
    let page_count = count_pdf_pages(pdf_bytes)?;
    Ok(PageCountResponse { page_count })
}

pub fn preview_tables(
    pdf_bytes: &[u8],
    options: &ExtractOptions,
) -> Result<TablesResponse, ApiError> {
    check_pdf_body(pdf_bytes)?;
    let run = extract_tables_from_bytes(pdf_bytes, options)?;
    Ok(TablesResponse::from_run(&run, PREVIEW_ROW_LIMIT))
}

pub fn build_xlsx(pdf_bytes: &[u8], options: &ExtractOptions) -> Result<XlsxExport, ApiError> {
    check_pdf_body(pdf_bytes)?;
    let run = extract_tables_from_bytes(pdf_bytes, options)?;

    for issue in run.issues_with_code(IssueCode::ExtractionFailed) {
        worker::console_error!("{issue}");
    }

    if run.is_empty() {
        return Err(ApiError::NotFound(
            "no tables found on the selected pages".to_string(),
        ));
    }

    let bytes = build_workbook(&run.tables, options.combine)?;
    let summary = run.summary();
    worker::console_log!(
        "xlsx export completed: tables={}, rows={}, max_columns={}, combined={}",
        summary.table_count,
        summary.total_rows,
        summary.max_columns,
        options.combine
    );

    Ok(XlsxExport { bytes, summary })
}
