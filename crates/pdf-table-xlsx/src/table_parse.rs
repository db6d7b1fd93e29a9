/// Splits a text line on explicit column separators: tabs, runs of two or
/// more spaces, and `|` rules.
///
/// A line drawn with `|` rules keeps empty cells as `None`, since the rule
/// marks a boundary even when nothing is printed between two of them.
pub(crate) fn split_line_into_cells(line: &str) -> Vec<Option<String>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.contains('|') {
        return split_ruled_line(trimmed);
    }

    split_spaced_line(trimmed)
        .into_iter()
        .map(Some)
        .collect()
}

fn split_ruled_line(line: &str) -> Vec<Option<String>> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    inner
        .split('|')
        .map(|cell| {
            let cell = cell.trim();
            if cell.is_empty() {
                None
            } else {
                Some(cell.to_string())
            }
        })
        .collect()
}

fn split_spaced_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut whitespace_run = 0_usize;

    for ch in line.chars() {
        if ch == '\t' {
            if !current.trim().is_empty() {
                cells.push(current.trim().to_string());
                current.clear();
            }
            whitespace_run = 0;
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            if whitespace_run >= 2 {
                if !current.trim().is_empty() {
                    cells.push(current.trim().to_string());
                    current.clear();
                }
                continue;
            }
            current.push(' ');
            continue;
        }

        whitespace_run = 0;
        current.push(ch);
    }

    if !current.trim().is_empty() {
        cells.push(current.trim().to_string());
    }

    cells
}

pub(crate) fn soft_split_line_into_cells(line: &str) -> Vec<Option<String>> {
    line.split_whitespace()
        .map(|cell| Some(cell.to_string()))
        .collect()
}

/// Lines such as `-----`, `=====` or `+----+----+` that only draw a
/// horizontal rule.
pub(crate) fn is_rule_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() >= 3
        && trimmed
            .chars()
            .all(|ch| matches!(ch, '-' | '=' | '_' | '+' | '|' | '─' | '━' | '┼' | ' '))
}

/// Pads every row to `width` cells.
pub(crate) fn pad_rows(rows: Vec<Vec<String>>, width: usize) -> Vec<Vec<String>> {
    rows.into_iter()
        .map(|mut row| {
            row.resize(width, String::new());
            row
        })
        .collect()
}
