use crate::warning::{IssueCode, PageIssue};

/// Unvalidated cell grid as returned by the PDF collaborator.
///
/// Rows may differ in length; `None` marks a cell the extractor saw a
/// boundary for but no text in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    #[must_use]
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Builds a table where every cell is present.
    #[must_use]
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Table with a clean header row: unique, non-empty names, every data row
/// as wide as the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    #[must_use]
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub page: u32,
    pub table: NormalizedTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub table_count: usize,
    pub total_rows: usize,
    pub max_columns: usize,
}

/// Everything one extraction pass produced, in page order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractionRun {
    pub page_count: u32,
    pub tables: Vec<PageResult>,
    pub issues: Vec<PageIssue>,
}

impl ExtractionRun {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            table_count: self.tables.len(),
            total_rows: self.tables.iter().map(|result| result.table.row_count()).sum(),
            max_columns: self
                .tables
                .iter()
                .map(|result| result.table.width())
                .max()
                .unwrap_or(0),
        }
    }

    pub fn issues_with_code(&self, code: IssueCode) -> impl Iterator<Item = &PageIssue> {
        self.issues.iter().filter(move |issue| issue.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
