use std::collections::BTreeMap;
use std::path::Path;

use encoding_rs::{BIG5, UTF_16BE};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::ExtractError;
use crate::extract::TableSource;
use crate::model::RawTable;
use crate::table_detect::{TableSettings, detect_tables};
use crate::table_parse::split_line_into_cells;

/// An opened PDF, read-only, with per-page text resolved on demand.
pub struct PdfDocument {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
    /// `pdf-extract` output split on form feeds, kept only when it lines up
    /// with the page tree.
    layout_pages: Option<Vec<String>>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("pages", &self.pages.len())
            .field("layout_pages", &self.layout_pages.is_some())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Parses the document up front; malformed input fails here rather than
    /// page by page.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::PdfLoad`] when the bytes are not a readable PDF.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExtractError> {
        let document = Document::load_mem(bytes)?;
        let pages = document.get_pages();

        let layout_pages = pdf_extract::extract_text_from_mem(bytes)
            .ok()
            .map(|text| split_text_into_pages(&text))
            .filter(|split| split.len() == pages.len());

        debug!(
            pages = pages.len(),
            layout_text = layout_pages.is_some(),
            "opened PDF document"
        );

        Ok(Self {
            document,
            pages,
            layout_pages,
        })
    }

    /// # Errors
    ///
    /// Fails when the file cannot be read or is not a readable PDF.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    #[must_use]
    pub fn page_count(&self) -> u32 {
        u32::try_from(self.pages.len()).unwrap_or(u32::MAX)
    }

    /// Text of one 1-based page, picked from whichever extraction path
    /// produced the most table-like output.
    ///
    /// # Errors
    ///
    /// [`ExtractError::PageNotFound`] for pages outside the document, and
    /// [`ExtractError::PageContent`] when the content stream is unreadable
    /// and no other path yielded text.
    pub fn page_text(&self, page: u32) -> Result<String, ExtractError> {
        let page_id = *self
            .pages
            .get(&page)
            .ok_or(ExtractError::PageNotFound {
                page,
                page_count: self.page_count(),
            })?;

        let mut candidates = Vec::new();
        if let Some(text) = self
            .layout_pages
            .as_ref()
            .and_then(|split| split.get(page as usize - 1))
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text.clone());
        }

        let content_error = match text_from_content_stream(&self.document, page_id) {
            Ok(Some(text)) => {
                candidates.push(text);
                None
            }
            Ok(None) => None,
            Err(error) => Some(error),
        };

        if let Some(text) = self
            .document
            .extract_text(&[page])
            .ok()
            .filter(|text| !text.trim().is_empty())
        {
            candidates.push(text);
        }

        if candidates.is_empty()
            && let Some(error) = content_error
        {
            return Err(ExtractError::PageContent {
                page,
                reason: error.to_string(),
            });
        }

        debug!(page, candidates = candidates.len(), "resolved page text");
        Ok(choose_best_text(&candidates))
    }
}

impl TableSource for PdfDocument {
    fn page_count(&self) -> u32 {
        PdfDocument::page_count(self)
    }

    fn extract_tables(
        &self,
        page: u32,
        settings: &TableSettings,
    ) -> Result<Vec<RawTable>, ExtractError> {
        let text = self.page_text(page)?;
        Ok(detect_tables(&text, settings))
    }
}

fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let mut pages = raw_text
        .split('\u{000C}')
        .map(str::to_string)
        .collect::<Vec<_>>();
    if pages.last().is_some_and(String::is_empty) {
        pages.pop();
    }
    pages
}

fn looks_decoding_broken(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let bytes = bytes
        .strip_prefix(&[0xFE, 0xFF])
        .or_else(|| bytes.strip_prefix(&[0xFF, 0xFE]))
        .unwrap_or(bytes);
    let (text, had_errors) = UTF_16BE.decode_without_bom_handling(bytes);
    (!had_errors && !text.is_empty()).then(|| text.into_owned())
}

fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&decoded) {
        return decoded;
    }

    let hint = encoding.map(str::to_ascii_lowercase).unwrap_or_default();
    let has_bom = bytes.starts_with(&[0xFE, 0xFF]) || bytes.starts_with(&[0xFF, 0xFE]);
    let wide_hint = ["utf16", "ucs2", "identity-h", "unicode"]
        .iter()
        .any(|marker| hint.contains(marker));
    if (has_bom || wide_hint)
        && let Some(text) = decode_utf16(bytes)
    {
        return text;
    }

    if ["big5", "b5", "eten", "cns"]
        .iter()
        .any(|marker| hint.contains(marker))
    {
        let (text, _, had_errors) = BIG5.decode(bytes);
        if !had_errors && !text.is_empty() {
            return text.into_owned();
        }
    }

    String::from_utf8_lossy(bytes).into_owned()
}

/// Favors text whose lines split into several cells.
fn tabular_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let (lines, multi_cell) = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .fold((0_i64, 0_i64), |(lines, multi_cell), line| {
            let columns = i64::from(split_line_into_cells(line).len() >= 2);
            (lines + 1, multi_cell + columns)
        });

    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    multi_cell * 50 + lines - broken_penalty
}

fn choose_best_text(candidates: &[String]) -> String {
    candidates
        .iter()
        .max_by_key(|text| tabular_score(text))
        .cloned()
        .unwrap_or_default()
}

/// Walks the page's text operators, breaking lines on positioning operators.
fn text_from_content_stream(
    document: &Document,
    page_id: ObjectId,
) -> Result<Option<String>, lopdf::Error> {
    fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => text.push_str(&decode_pdf_bytes(encoding, bytes)),
                Object::Array(items) => {
                    collect_text(text, encoding, items);
                    text.push(' ');
                }
                // Large negative kerning inside TJ is a visual gap.
                Object::Integer(value) if *value < -100 => text.push(' '),
                _ => {}
            }
        }
    }

    let raw_content = document.get_page_content(page_id)?;
    let content = Content::decode(&raw_content)?;
    let encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                current_encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|font_name| encodings.get(font_name).copied());
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current, current_encoding, &operation.operands);
            }
            "T*" | "Td" | "TD" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    Ok((!lines.is_empty()).then(|| lines.join("\n")))
}
