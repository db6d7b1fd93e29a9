use crate::model::RawTable;
use crate::table_parse::{is_rule_line, soft_split_line_into_cells, split_line_into_cells};

/// How cell boundaries along one axis are located in page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStrategy {
    /// Only explicit separators count: tabs, wide gaps, `|` and rule lines.
    Lines,
    /// Boundaries are inferred from the text itself.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSettings {
    /// Column boundaries.
    pub vertical: EdgeStrategy,
    /// Row and table boundaries.
    pub horizontal: EdgeStrategy,
}

impl TableSettings {
    /// Ruled columns with text-inferred rows, for tables that have no
    /// horizontal rules.
    #[must_use]
    pub const fn lines_text() -> Self {
        Self {
            vertical: EdgeStrategy::Lines,
            horizontal: EdgeStrategy::Text,
        }
    }
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            vertical: EdgeStrategy::Lines,
            horizontal: EdgeStrategy::Lines,
        }
    }
}

fn looks_like_sentence(line: &str) -> bool {
    ['.', '!', '?']
        .iter()
        .any(|punctuation| line.trim_end().ends_with(*punctuation))
}

fn split_cells(line: &str, vertical: EdgeStrategy) -> Vec<Option<String>> {
    let cells = split_line_into_cells(line);
    if vertical == EdgeStrategy::Lines || cells.len() >= 2 {
        return cells;
    }

    let soft_cells = soft_split_line_into_cells(line);
    let has_numeric = soft_cells
        .iter()
        .flatten()
        .any(|cell| cell.chars().any(|ch| ch.is_ascii_digit()));
    if soft_cells.len() >= 2 && !looks_like_sentence(line) && (has_numeric || soft_cells.len() <= 6)
    {
        soft_cells
    } else {
        cells
    }
}

/// Runs of consecutive multi-cell lines; a run needs two rows to bound it.
fn detect_ruled_tables(text: &str, vertical: EdgeStrategy) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<Option<String>>> = Vec::new();

    let flush = |rows: &mut Vec<Vec<Option<String>>>, tables: &mut Vec<RawTable>| {
        if rows.len() >= 2 {
            tables.push(RawTable::new(std::mem::take(rows)));
        } else {
            rows.clear();
        }
    };

    for line in text.lines() {
        if is_rule_line(line) {
            continue;
        }

        let cells = split_cells(line, vertical);
        if cells.len() >= 2 {
            current.push(cells);
        } else {
            flush(&mut current, &mut tables);
        }
    }

    flush(&mut current, &mut tables);
    tables
}

/// Blank-line separated blocks where every text line is a row.
fn detect_text_row_tables(text: &str, vertical: EdgeStrategy) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<Option<String>>> = Vec::new();

    let flush = |rows: &mut Vec<Vec<Option<String>>>, tables: &mut Vec<RawTable>| {
        if rows.iter().any(|row| row.len() >= 2) {
            tables.push(RawTable::new(std::mem::take(rows)));
        } else {
            rows.clear();
        }
    };

    for line in text.lines() {
        if line.trim().is_empty() {
            flush(&mut current, &mut tables);
            continue;
        }
        if is_rule_line(line) {
            continue;
        }

        current.push(split_cells(line, vertical));
    }

    flush(&mut current, &mut tables);
    tables
}

/// All candidate tables in page text, top to bottom.
pub(crate) fn detect_tables(text: &str, settings: &TableSettings) -> Vec<RawTable> {
    match settings.horizontal {
        EdgeStrategy::Lines => detect_ruled_tables(text, settings.vertical),
        EdgeStrategy::Text => detect_text_row_tables(text, settings.vertical),
    }
}

/// The table with the most cells; the topmost one wins a tie.
pub(crate) fn largest_table(tables: Vec<RawTable>) -> Option<RawTable> {
    let mut best: Option<RawTable> = None;
    for table in tables {
        if best
            .as_ref()
            .is_none_or(|current| table.cell_count() > current.cell_count())
        {
            best = Some(table);
        }
    }
    best
}
