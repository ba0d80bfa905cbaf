//! Page estimate from the amount of body text in a DOCX.
//!
//! When a DOCX carries no cached page count, the next best signal is how much
//! text it holds. The text of every body paragraph and of every paragraph in
//! a body-level table cell is summed, then mapped to pages at roughly 1500
//! characters per page. That density was calibrated on short resume-style
//! documents; long reports with big fonts or many figures will be
//! under-estimated.
//!
//! ## What counts as text
//!
//! A paragraph's text is the `w:t` content of its runs (`w:r`), including
//! runs nested in `w:hyperlink`. `w:tab`, `w:ptab`, `w:cr`,
//! `w:noBreakHyphen` and text-wrapping `w:br` count as one character each.
//! Text in nested tables, text boxes, drawings, tracked insertions and
//! deleted text is ignored. Length is measured in Unicode scalar values.
//!
//! Table text is read per grid column, the way a row-of-cells view of the
//! table sees it. A horizontally merged cell (`w:gridSpan`) counts once per
//! column it covers, and a vertically merged continuation cell (`w:vMerge`)
//! repeats the text of the cell it continues.

use super::docx::{open_archive, read_part};
use super::{PageCountStrategy, StrategyKind, StrategyOutcome};
use crate::document::DocumentRef;
use crate::error::StrategyError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Archive path of the main document body.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Assumed text density.
pub const CHARS_PER_PAGE: usize = 1500;

/// Map a total text length to a page estimate.
///
/// `< 1500 → 1`, `< 3000 → 2`, otherwise `max(2, len / 1500)`.
pub fn content_estimate(total_content_length: usize) -> u32 {
    let pages = if total_content_length < CHARS_PER_PAGE {
        1
    } else if total_content_length < 2 * CHARS_PER_PAGE {
        2
    } else {
        (total_content_length / CHARS_PER_PAGE).max(2)
    };
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Estimates DOCX pages from body text volume.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentStructuralEstimator;

impl ContentStructuralEstimator {
    /// Total text length of body and body-table paragraphs.
    pub fn total_content_length<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<usize, StrategyError> {
        let xml = read_part(archive, DOCUMENT_PART)?.ok_or_else(|| StrategyError::MissingEntry {
            name: DOCUMENT_PART.to_string(),
        })?;
        body_text_length(&xml)
    }

    pub fn estimate<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> StrategyOutcome {
        self.total_content_length(archive).map(content_estimate)
    }
}

impl PageCountStrategy for ContentStructuralEstimator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ContentEstimate
    }

    fn attempt(&self, doc: &DocumentRef) -> StrategyOutcome {
        let mut archive = open_archive(doc.path())?;
        self.estimate(&mut archive)
    }
}

/// Sum the paragraph text length of a `word/document.xml` part.
pub fn body_text_length(xml: &str) -> Result<usize, StrategyError> {
    let mut reader = Reader::from_str(xml);
    // xml:space="preserve" runs carry meaningful whitespace
    reader.trim_text(false);

    // Local names of the currently open elements, outermost first.
    let mut open: Vec<Vec<u8>> = Vec::new();
    let mut in_counted_text = false;
    let mut grid = TableGrid::default();
    let mut total = 0usize;

    loop {
        match reader.read_event().map_err(|e| xml_error(&e))? {
            Event::Start(e) => {
                grid.on_open(&open, &e);
                let name = e.local_name().as_ref().to_vec();
                in_counted_text = name.as_slice() == b"t" && is_counted_run(&open);
                open.push(name);
            }
            Event::Empty(e) => {
                grid.on_open(&open, &e);
                if is_counted_run(&open) && is_single_char_element(&e) {
                    grid.add_text(&mut total, 1);
                }
                total += grid.on_close(&open, e.local_name().as_ref());
            }
            Event::Text(t) if in_counted_text => {
                let n = t.unescape().map_err(|e| xml_error(&e))?.chars().count();
                grid.add_text(&mut total, n);
            }
            Event::CData(c) if in_counted_text => {
                grid.add_text(&mut total, String::from_utf8_lossy(&c).chars().count());
            }
            Event::End(_) => {
                if let Some(name) = open.pop() {
                    total += grid.on_close(&open, &name);
                }
                in_counted_text = false;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(total)
}

const BODY: &[&[u8]] = &[b"document", b"body"];
const TABLE: &[&[u8]] = &[b"document", b"body", b"tbl"];
const ROW: &[&[u8]] = &[b"document", b"body", b"tbl", b"tr"];
const ROW_PROPERTIES: &[&[u8]] = &[b"document", b"body", b"tbl", b"tr", b"trPr"];
const CELL: &[&[u8]] = &[b"document", b"body", b"tbl", b"tr", b"tc"];
const CELL_PROPERTIES: &[&[u8]] = &[b"document", b"body", b"tbl", b"tr", b"tc", b"tcPr"];

/// Word tables never have more grid columns than this.
const MAX_GRID_COLUMNS: usize = 63;

/// Grid position inside the body-level table being read.
///
/// Cells are counted once per grid column they cover: a `w:gridSpan` of N
/// counts the cell's text N times, and a `w:vMerge` continuation counts the
/// text of the cell above it instead of its own.
#[derive(Debug, Default)]
struct TableGrid {
    /// Text length of the cell covering each grid column in the previous row.
    above: Vec<usize>,
    column: usize,
    cell: Option<Cell>,
}

#[derive(Debug)]
struct Cell {
    text: usize,
    span: usize,
    continues_merge: bool,
}

impl TableGrid {
    fn on_open(&mut self, open: &[Vec<u8>], e: &BytesStart<'_>) {
        let name = e.local_name();
        let name = name.as_ref();
        if path_is(open, BODY) && name == b"tbl" {
            *self = Self::default();
        } else if path_is(open, TABLE) && name == b"tr" {
            self.column = 0;
            self.cell = None;
        } else if path_is(open, ROW) && name == b"tc" {
            self.cell = Some(Cell {
                text: 0,
                span: 1,
                continues_merge: false,
            });
        } else if path_is(open, ROW_PROPERTIES) && name == b"gridBefore" {
            let skipped = grid_count(e).unwrap_or(0);
            self.column = (self.column + skipped).min(MAX_GRID_COLUMNS);
        } else if path_is(open, CELL_PROPERTIES) {
            if let Some(cell) = self.cell.as_mut() {
                match name {
                    b"gridSpan" => cell.span = grid_count(e).unwrap_or(1).max(1),
                    b"vMerge" => {
                        cell.continues_merge = attribute(e, b"val")
                            .map_or(true, |v| v.as_slice() == b"continue");
                    }
                    _ => {}
                }
            }
        }
    }

    /// Text length contributed by closing `name`, once `open` no longer
    /// holds it.
    fn on_close(&mut self, open: &[Vec<u8>], name: &[u8]) -> usize {
        if name != b"tc" || !path_is(open, ROW) {
            return 0;
        }
        let Some(cell) = self.cell.take() else {
            return 0;
        };

        let text = if cell.continues_merge {
            self.above.get(self.column).copied().unwrap_or(0)
        } else {
            cell.text
        };
        let end = self.column + cell.span;
        if self.above.len() < end {
            self.above.resize(end, 0);
        }
        self.above[self.column..end].fill(text);
        self.column = end;
        text.saturating_mul(cell.span)
    }

    fn add_text(&mut self, total: &mut usize, n: usize) {
        match self.cell.as_mut() {
            Some(cell) => cell.text += n,
            None => *total += n,
        }
    }
}

/// `w:val` of a grid-count property, clamped to the widest Word table.
fn grid_count(e: &BytesStart<'_>) -> Option<usize> {
    let value = attribute(e, b"val")?;
    let n: usize = std::str::from_utf8(&value).ok()?.trim().parse().ok()?;
    Some(n.min(MAX_GRID_COLUMNS))
}

fn attribute(e: &BytesStart<'_>, local: &[u8]) -> Option<Vec<u8>> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| a.value.into_owned())
}

/// Run children that stand for exactly one character.
fn is_single_char_element(e: &BytesStart<'_>) -> bool {
    match e.local_name().as_ref() {
        b"tab" | b"ptab" | b"cr" | b"noBreakHyphen" => true,
        b"br" => is_text_wrapping_break(e),
        _ => false,
    }
}

/// `w:br` without a type, or with `w:type="textWrapping"`. Page and column
/// breaks carry no text.
fn is_text_wrapping_break(e: &BytesStart<'_>) -> bool {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"type")
        .map_or(true, |a| a.value.as_ref() == b"textWrapping")
}

/// True when `open` ends in a run whose paragraph is counted:
/// `… p [hyperlink …] r`.
fn is_counted_run(open: &[Vec<u8>]) -> bool {
    let Some((run, rest)) = open.split_last() else {
        return false;
    };
    if run.as_slice() != b"r" {
        return false;
    }

    let mut depth = rest.len();
    while depth > 0 && rest[depth - 1].as_slice() == b"hyperlink" {
        depth -= 1;
    }

    match rest[..depth].split_last() {
        Some((p, ancestors)) => p.as_slice() == b"p" && is_counted_paragraph_parent(ancestors),
        None => false,
    }
}

/// Paragraphs directly in the body, or directly in a cell of a body-level
/// table.
fn is_counted_paragraph_parent(ancestors: &[Vec<u8>]) -> bool {
    path_is(ancestors, BODY) || path_is(ancestors, CELL)
}

fn path_is(ancestors: &[Vec<u8>], expected: &[&[u8]]) -> bool {
    ancestors.len() == expected.len()
        && ancestors
            .iter()
            .zip(expected)
            .all(|(name, want)| name.as_slice() == *want)
}

fn xml_error(e: &quick_xml::Error) -> StrategyError {
    StrategyError::Xml {
        part: DOCUMENT_PART.to_string(),
        detail: e.to_string(),
    }
}
