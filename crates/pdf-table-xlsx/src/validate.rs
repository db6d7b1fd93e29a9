use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::model::RawTable;

pub const DEFAULT_MIN_ROWS: usize = 2;
pub const DEFAULT_MIN_COLS: usize = 2;
pub const MIN_CONFORMITY: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRules {
    pub min_rows: usize,
    pub min_cols: usize,
    /// Share of rows that must have the modal width.
    pub min_conformity: f32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_rows: DEFAULT_MIN_ROWS,
            min_cols: DEFAULT_MIN_COLS,
            min_conformity: MIN_CONFORMITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableShape {
    pub rows: usize,
    pub modal_width: usize,
    pub conformity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    TooFewRows { rows: usize, min_rows: usize },
    IrregularRows { modal_width: usize, conformity: f32 },
    TooFewColumns { modal_width: usize, min_cols: usize },
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewRows { rows, min_rows } => {
                write!(f, "{rows} row(s), at least {min_rows} required")
            }
            Self::IrregularRows {
                modal_width,
                conformity,
            } => write!(
                f,
                "only {:.0}% of rows have the dominant width of {modal_width} cell(s)",
                conformity * 100.0
            ),
            Self::TooFewColumns {
                modal_width,
                min_cols,
            } => write!(
                f,
                "dominant width is {modal_width} cell(s), at least {min_cols} required"
            ),
        }
    }
}

/// Most frequent row length; on a tie the smallest length wins.
pub(crate) fn modal_width<T>(rows: &[Vec<T>]) -> usize {
    let mut freq = HashMap::new();
    for width in rows.iter().map(Vec::len) {
        *freq.entry(width).or_insert(0_usize) += 1;
    }

    freq.into_iter()
        .max_by_key(|(width, count)| (*count, Reverse(*width)))
        .map_or(0, |(width, _)| width)
}

/// Decides whether a candidate grid is regular enough to be a table.
///
/// Prose that a line-based extractor returns as a "table" tends to have
/// wildly varying row widths, which the conformity check catches. Merged or
/// split cells in a handful of rows are tolerated.
///
/// # Errors
///
/// Returns the first rule the grid fails.
#[allow(clippy::cast_precision_loss)]
pub fn validate_table(table: &RawTable, rules: &ValidationRules) -> Result<TableShape, Rejection> {
    let rows = table.row_count();
    if rows == 0 || rows < rules.min_rows {
        return Err(Rejection::TooFewRows {
            rows,
            min_rows: rules.min_rows,
        });
    }

    let modal_width = modal_width(&table.rows);
    let conforming = table
        .rows
        .iter()
        .filter(|row| row.len() == modal_width)
        .count();
    let conformity = conforming as f32 / rows as f32;

    if conformity < rules.min_conformity {
        return Err(Rejection::IrregularRows {
            modal_width,
            conformity,
        });
    }

    if modal_width < rules.min_cols {
        return Err(Rejection::TooFewColumns {
            modal_width,
            min_cols: rules.min_cols,
        });
    }

    Ok(TableShape {
        rows,
        modal_width,
        conformity,
    })
}

#[must_use]
pub fn is_table(table: &RawTable, min_rows: usize, min_cols: usize) -> bool {
    let rules = ValidationRules {
        min_rows,
        min_cols,
        ..ValidationRules::default()
    };
    validate_table(table, &rules).is_ok()
}
