use std::str::FromStr;

use crate::validate::{DEFAULT_MIN_COLS, DEFAULT_MIN_ROWS, ValidationRules};

/// Set of 1-based page numbers, e.g. parsed from `1-3,5`.
///
/// Stored as sorted, merged inclusive ranges, so `1-4294967295` stays two
/// integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    ranges: Vec<(u32, u32)>,
}

impl PageSelection {
    fn from_ranges(mut ranges: Vec<(u32, u32)>) -> Self {
        ranges.sort_unstable();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            if let Some(last) = merged.last_mut()
                && start <= last.1.saturating_add(1)
            {
                last.1 = last.1.max(end);
                continue;
            }
            merged.push((start, end));
        }
        Self { ranges: merged }
    }

    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.ranges
            .iter()
            .any(|&(start, end)| (start..=end).contains(&page))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Merged inclusive ranges in ascending order.
    #[must_use]
    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    /// Selected pages in ascending order.
    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges.iter().flat_map(|&(start, end)| start..=end)
    }

    /// Selected spans lying past the last page of a `page_count`-page document.
    pub fn beyond(&self, page_count: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.ranges
            .iter()
            .filter(move |&&(_, end)| end > page_count)
            .map(move |&(start, end)| (start.max(page_count.saturating_add(1)), end))
    }
}

impl FromIterator<u32> for PageSelection {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self::from_ranges(
            iter.into_iter()
                .filter(|page| *page > 0)
                .map(|page| (page, page))
                .collect(),
        )
    }
}

fn parse_page(value: &str, what: &str) -> Result<u32, String> {
    let page: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {what}: '{}'", value.trim()))?;
    if page == 0 {
        return Err("pages are 1-based".to_string());
    }
    Ok(page)
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some((start, end)) = token.split_once('-') {
                let start = parse_page(start, "page range start")?;
                let end = parse_page(end, "page range end")?;
                if end < start {
                    return Err(format!(
                        "invalid range '{token}': end is smaller than start"
                    ));
                }
                ranges.push((start, end));
            } else {
                let page = parse_page(token, "page number")?;
                ranges.push((page, page));
            }
        }

        if ranges.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self::from_ranges(ranges))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// `None` processes every page.
    pub pages: Option<PageSelection>,
    pub min_rows: usize,
    pub min_cols: usize,
    /// Write all tables into one `Combined` sheet instead of one sheet per page.
    pub combine: bool,
}

impl ExtractOptions {
    #[must_use]
    pub fn validation_rules(&self) -> ValidationRules {
        ValidationRules {
            min_rows: self.min_rows,
            min_cols: self.min_cols,
            ..ValidationRules::default()
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            min_rows: DEFAULT_MIN_ROWS,
            min_cols: DEFAULT_MIN_COLS,
            combine: true,
        }
    }
}
