use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    ExtractionFailed,
    NotATable,
    NoTableFound,
    PageOutOfRange,
}

impl IssueCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExtractionFailed => "extraction_failed",
            Self::NotATable => "not_a_table",
            Self::NoTableFound => "no_table_found",
            Self::PageOutOfRange => "page_out_of_range",
        }
    }

    /// Whether the page was lost to an error rather than skipped on purpose.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::ExtractionFailed)
    }
}

impl Display for IssueCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the skip/error log of an extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIssue {
    pub code: IssueCode,
    pub page: u32,
    pub message: String,
}

impl PageIssue {
    #[must_use]
    pub fn new(code: IssueCode, page: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            page,
            message: message.into(),
        }
    }
}

impl Display for PageIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {}: {} ({})", self.page, self.message, self.code)
    }
}
