use std::collections::HashMap;

use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::error::ExtractError;
use crate::model::{PageResult, Sheet};

pub const COMBINED_SHEET_NAME: &str = "Combined";
pub const MAX_SHEET_NAME_CHARS: usize = 31;
pub const XLSX_FILE_NAME: &str = "extracted_tables.xlsx";
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[must_use]
pub fn page_sheet_name(page: u32) -> String {
    format!("Page_{page}")
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect()
}

/// Stacks every table under the union of their headers.
///
/// Columns appear in first-seen order; each row lands under its own
/// column names and cells its page lacks stay empty.
fn combined_sheet(results: &[PageResult]) -> Sheet {
    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for name in results.iter().flat_map(|result| &result.table.headers) {
        if !positions.contains_key(name.as_str()) {
            positions.insert(name.as_str(), headers.len());
            headers.push(name.clone());
        }
    }

    let mut rows = Vec::with_capacity(results.iter().map(|r| r.table.row_count()).sum());
    for result in results {
        let columns = result
            .table
            .headers
            .iter()
            .map(|name| positions[name.as_str()])
            .collect::<Vec<_>>();
        for data_row in &result.table.rows {
            let mut row = vec![String::new(); headers.len()];
            for (cell, &column) in data_row.iter().zip(&columns) {
                row[column].clone_from(cell);
            }
            rows.push(row);
        }
    }

    Sheet {
        name: COMBINED_SHEET_NAME.to_string(),
        headers,
        rows,
    }
}

/// Lays results out as sheets: one `Combined` sheet, or `Page_<n>` per table.
#[must_use]
pub fn assemble_sheets(results: &[PageResult], combine: bool) -> Vec<Sheet> {
    if combine {
        return vec![combined_sheet(results)];
    }

    results
        .iter()
        .map(|result| Sheet {
            name: page_sheet_name(result.page),
            headers: result.table.headers.clone(),
            rows: result.table.rows.clone(),
        })
        .collect()
}

fn write_row(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    sheet: &str,
    row: usize,
    cells: &[String],
) -> Result<(), ExtractError> {
    let too_large = || ExtractError::SheetTooLarge {
        sheet: sheet.to_string(),
    };
    let row = u32::try_from(row).map_err(|_| too_large())?;
    for (column, cell) in cells.iter().enumerate() {
        if cell.is_empty() {
            continue;
        }
        let column = u16::try_from(column).map_err(|_| too_large())?;
        worksheet.write_string(row, column, cell)?;
    }
    Ok(())
}

/// Serializes sheets into XLSX bytes: header row first, no index column.
///
/// # Errors
///
/// Fails when a sheet name is rejected or a sheet exceeds worksheet limits.
pub fn write_workbook(sheets: &[Sheet]) -> Result<Vec<u8>, ExtractError> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_row(worksheet, &sheet.name, 0, &sheet.headers)?;
        for (index, row) in sheet.rows.iter().enumerate() {
            write_row(worksheet, &sheet.name, index + 1, row)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    debug!(sheets = sheets.len(), bytes = bytes.len(), "wrote workbook");
    Ok(bytes)
}

/// Builds the export workbook for a finished run.
///
/// # Errors
///
/// [`ExtractError::NoTablesFound`] when `results` is empty; callers are
/// expected to check for that before offering an export.
pub fn build_workbook(results: &[PageResult], combine: bool) -> Result<Vec<u8>, ExtractError> {
    if results.is_empty() {
        return Err(ExtractError::NoTablesFound);
    }
    write_workbook(&assemble_sheets(results, combine))
}
