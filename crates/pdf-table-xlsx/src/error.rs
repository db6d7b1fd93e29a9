use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("page {page} does not exist (document has {page_count} page(s))")]
    PageNotFound { page: u32, page_count: u32 },

    #[error("failed to read content of page {page}: {reason}")]
    PageContent { page: u32, reason: String },

    #[error("workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("sheet '{sheet}' exceeds worksheet row or column limits")]
    SheetTooLarge { sheet: String },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("no tables found on the selected pages")]
    NoTablesFound,
}
