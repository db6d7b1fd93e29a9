use tracing::{debug, warn};

use crate::columns::normalize_headers;
use crate::error::ExtractError;
use crate::model::{ExtractionRun, NormalizedTable, PageResult, RawTable};
use crate::options::PageSelection;
use crate::table_detect::{TableSettings, largest_table};
use crate::table_parse::pad_rows;
use crate::validate::{ValidationRules, validate_table};
use crate::warning::{IssueCode, PageIssue};

/// Per-page table extraction backend.
pub trait TableSource {
    fn page_count(&self) -> u32;

    /// Every table found on a 1-based page under `settings`, top to bottom.
    ///
    /// # Errors
    ///
    /// Fails when the page's content cannot be read.
    fn extract_tables(
        &self,
        page: u32,
        settings: &TableSettings,
    ) -> Result<Vec<RawTable>, ExtractError>;

    /// The page's largest table under the default settings.
    ///
    /// # Errors
    ///
    /// Fails when the page's content cannot be read.
    fn extract_table(&self, page: u32) -> Result<Option<RawTable>, ExtractError> {
        Ok(largest_table(
            self.extract_tables(page, &TableSettings::default())?,
        ))
    }
}

/// Primary strategy first, then the first table under ruled columns with
/// text-inferred rows.
fn find_table(source: &dyn TableSource, page: u32) -> Result<Option<RawTable>, ExtractError> {
    if let Some(table) = source.extract_table(page)?.filter(|table| !table.is_empty()) {
        return Ok(Some(table));
    }

    debug!(page, "no table under default settings, retrying with text rows");
    Ok(source
        .extract_tables(page, &TableSettings::lines_text())?
        .into_iter()
        .find(|table| !table.is_empty()))
}

/// Splits off the header row, normalizes it and pads data rows to match.
///
/// Data rows wider than the header widen it with unnamed columns.
pub(crate) fn normalize_table(table: RawTable) -> NormalizedTable {
    let mut rows = table.rows.into_iter();
    let mut header_cells = rows.next().unwrap_or_default();
    let data = rows
        .map(|row| {
            row.into_iter()
                .map(Option::unwrap_or_default)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let width = data
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(header_cells.len());
    header_cells.resize(width, None);

    NormalizedTable {
        headers: normalize_headers(&header_cells),
        rows: pad_rows(data, width),
    }
}

/// Runs extraction over the selected pages of `source`, in page order.
///
/// Page-level failures never abort the run; they end up in
/// [`ExtractionRun::issues`].
pub fn extract_tables(
    source: &dyn TableSource,
    selection: Option<&PageSelection>,
    rules: &ValidationRules,
) -> ExtractionRun {
    let page_count = source.page_count();
    let mut run = ExtractionRun {
        page_count,
        ..ExtractionRun::default()
    };

    for page in 1..=page_count {
        if selection.is_some_and(|selection| !selection.contains(page)) {
            continue;
        }

        let table = match find_table(source, page) {
            Ok(Some(table)) => table,
            Ok(None) => {
                debug!(page, "no table found");
                run.issues.push(PageIssue::new(
                    IssueCode::NoTableFound,
                    page,
                    "no table found",
                ));
                continue;
            }
            Err(error) => {
                warn!(page, %error, "could not extract table");
                run.issues.push(PageIssue::new(
                    IssueCode::ExtractionFailed,
                    page,
                    format!("could not extract table: {error}"),
                ));
                continue;
            }
        };

        match validate_table(&table, rules) {
            Ok(shape) => {
                debug!(
                    page,
                    rows = shape.rows,
                    columns = shape.modal_width,
                    "accepted table"
                );
                run.tables.push(PageResult {
                    page,
                    table: normalize_table(table),
                });
            }
            Err(rejection) => {
                debug!(page, %rejection, "rejected table candidate");
                run.issues.push(PageIssue::new(
                    IssueCode::NotATable,
                    page,
                    format!("not a table: {rejection}"),
                ));
            }
        }
    }

    if let Some(selection) = selection {
        for (start, end) in selection.beyond(page_count) {
            let message = if start == end {
                format!("page {start} exceeds document ({page_count} page(s))")
            } else {
                format!("pages {start}-{end} exceed document ({page_count} page(s))")
            };
            run.issues.push(PageIssue::new(IssueCode::PageOutOfRange, start, message));
        }
    }

    run
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{TableSource, extract_tables, normalize_table};
    use crate::error::ExtractError;
    use crate::model::RawTable;
    use crate::options::PageSelection;
    use crate::table_detect::{EdgeStrategy, TableSettings};
    use crate::validate::ValidationRules;
    use crate::warning::IssueCode;

    enum FakePage {
        Table(RawTable),
        FallbackOnly(Vec<RawTable>),
        Nothing,
        Broken,
    }

    struct FakeSource {
        pages: BTreeMap<u32, FakePage>,
    }

    impl TableSource for FakeSource {
        fn page_count(&self) -> u32 {
            u32::try_from(self.pages.len()).expect("page count fits")
        }

        fn extract_tables(
            &self,
            page: u32,
            settings: &TableSettings,
        ) -> Result<Vec<RawTable>, ExtractError> {
            let fallback = settings.horizontal == EdgeStrategy::Text;
            match self.pages.get(&page) {
                Some(FakePage::Table(table)) => Ok(vec![table.clone()]),
                Some(FakePage::FallbackOnly(tables)) if fallback => Ok(tables.clone()),
                Some(FakePage::Broken) => Err(ExtractError::PageContent {
                    page,
                    reason: "bad content stream".to_string(),
                }),
                Some(FakePage::FallbackOnly(_) | FakePage::Nothing) => Ok(Vec::new()),
                None => Err(ExtractError::PageNotFound {
                    page,
                    page_count: self.page_count(),
                }),
            }
        }
    }

    fn source(pages: Vec<FakePage>) -> FakeSource {
        FakeSource {
            pages: (1..).zip(pages).collect(),
        }
    }

    fn people() -> RawTable {
        RawTable::from_strings([["Name", "Age"], ["Alice", "30"], ["Bob", "22"]])
    }

    #[test]
    fn failing_page_is_logged_and_skipped() {
        let source = source(vec![
            FakePage::Table(people()),
            FakePage::Broken,
            FakePage::Table(people()),
        ]);

        let run = extract_tables(&source, None, &ValidationRules::default());

        let pages = run.tables.iter().map(|result| result.page).collect::<Vec<_>>();
        assert_eq!(pages, vec![1, 3]);
        assert_eq!(run.issues.len(), 1);
        assert_eq!(run.issues[0].page, 2);
        assert_eq!(run.issues[0].code, IssueCode::ExtractionFailed);
        assert!(run.issues[0].message.contains("bad content stream"));
    }

    #[test]
    fn fallback_uses_first_table_only() {
        let first = RawTable::from_strings([["Item", "Qty"], ["Pen", "3"]]);
        let second = RawTable::from_strings([["x", "y", "z"], ["1", "2", "3"], ["4", "5", "6"]]);
        let source = source(vec![FakePage::FallbackOnly(vec![first, second])]);

        let run = extract_tables(&source, None, &ValidationRules::default());

        assert_eq!(run.tables.len(), 1);
        assert_eq!(run.tables[0].table.headers, vec!["Item", "Qty"]);
    }

    #[test]
    fn non_table_content_is_an_informational_skip() {
        let prose = RawTable::from_strings(vec![
            vec!["Annual  report"],
            vec!["This paragraph is prose."],
            vec!["So is this one."],
        ]);
        let source = source(vec![FakePage::FallbackOnly(vec![prose]), FakePage::Nothing]);

        let run = extract_tables(&source, None, &ValidationRules::default());

        assert!(run.is_empty());
        let codes = run.issues.iter().map(|issue| issue.code).collect::<Vec<_>>();
        assert_eq!(codes, vec![IssueCode::NotATable, IssueCode::NoTableFound]);
        assert!(run.issues[0].message.starts_with("not a table"));
    }

    #[test]
    fn only_selected_pages_are_processed() {
        let source = source(vec![
            FakePage::Table(people()),
            FakePage::Broken,
            FakePage::Table(people()),
        ]);
        let selection = "3,5".parse::<PageSelection>().expect("selection should parse");

        let run = extract_tables(&source, Some(&selection), &ValidationRules::default());

        assert_eq!(run.tables.len(), 1);
        assert_eq!(run.tables[0].page, 3);
        assert_eq!(run.issues.len(), 1);
        assert_eq!(run.issues[0].code, IssueCode::PageOutOfRange);
        assert_eq!(run.issues[0].page, 5);
    }

    #[test]
    fn huge_selection_reports_one_issue_per_span() {
        let source = source(vec![FakePage::Table(people())]);
        let selection = "1-4294967295"
            .parse::<PageSelection>()
            .expect("selection should parse");

        let run = extract_tables(&source, Some(&selection), &ValidationRules::default());

        assert_eq!(run.tables.len(), 1);
        assert_eq!(run.issues.len(), 1);
        assert_eq!(run.issues[0].code, IssueCode::PageOutOfRange);
        assert_eq!(run.issues[0].page, 2);
        assert!(run.issues[0].message.contains("pages 2-4294967295"));
    }

    #[test]
    fn normalizes_headers_and_pads_rows() {
        let table = RawTable::new(vec![
            vec![Some("Name".into()), None, Some("Name".into())],
            vec![Some("Alice".into()), Some("30".into()), None],
            vec![Some("Bob".into())],
            vec![
                Some("Carol".into()),
                Some("41".into()),
                Some("x".into()),
                Some("extra".into()),
            ],
        ]);

        let normalized = normalize_table(table);

        assert_eq!(
            normalized.headers,
            vec!["Name", "Unnamed", "Name_1", "Unnamed_1"]
        );
        assert_eq!(normalized.rows[0], vec!["Alice", "30", "", ""]);
        assert_eq!(normalized.rows[1], vec!["Bob", "", "", ""]);
        assert_eq!(normalized.rows[2], vec!["Carol", "41", "x", "extra"]);
    }
}
