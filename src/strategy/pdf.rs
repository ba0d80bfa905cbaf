//! Exact page count for PDF documents.
//!
//! The count is the number of leaf nodes reachable from the catalog's page
//! tree (`trailer /Root → /Pages → /Kids …`). The tree is walked explicitly
//! rather than trusting `/Count`, which writers are known to get wrong, and
//! every structural problem is reported instead of skipped: the PDF path has
//! no fallback, so a silent miscount would be the worst outcome.

use super::{PageCountStrategy, StrategyKind, StrategyOutcome};
use crate::document::DocumentRef;
use crate::error::StrategyError;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Deepest page tree accepted. Real documents stay in the single digits.
pub const MAX_TREE_DEPTH: usize = 256;

/// Counts PDF pages by walking the page tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageCounter;

impl PdfPageCounter {
    pub fn count(&self, path: &Path) -> StrategyOutcome {
        let document = Document::load(path).map_err(|e| pdf_error(format!("cannot load: {e}")))?;
        count_leaf_pages(&document)
    }
}

impl PageCountStrategy for PdfPageCounter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PdfExact
    }

    fn attempt(&self, doc: &DocumentRef) -> StrategyOutcome {
        self.count(doc.path())
    }

    fn is_authoritative(&self) -> bool {
        true
    }
}

/// Count the leaf pages of an already loaded document.
///
/// An empty page tree is an error, never `Ok(0)`.
pub fn count_leaf_pages(document: &Document) -> StrategyOutcome {
    let root = document
        .trailer
        .get(b"Root")
        .map_err(|_| pdf_error("trailer has no /Root"))?;
    let catalog = resolve(document, root)?
        .as_dict()
        .map_err(|_| pdf_error("/Root is not a dictionary"))?;

    let pages_ref = catalog
        .get(b"Pages")
        .map_err(|_| pdf_error("catalog has no /Pages"))?
        .as_reference()
        .map_err(|_| pdf_error("catalog /Pages is not an indirect reference"))?;

    let mut visited = HashSet::new();
    let total = count_node(document, pages_ref, 0, &mut visited)?;
    if total == 0 {
        return Err(pdf_error("page tree has no pages"));
    }

    debug!(
        "PDF page tree: {} leaves across {} nodes",
        total,
        visited.len()
    );
    Ok(total)
}

fn count_node(
    document: &Document,
    id: ObjectId,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
) -> Result<u32, StrategyError> {
    if depth > MAX_TREE_DEPTH {
        return Err(pdf_error(format!(
            "page tree deeper than {MAX_TREE_DEPTH} levels"
        )));
    }
    if !visited.insert(id) {
        return Err(pdf_error(format!(
            "page tree cycle at object {} {}",
            id.0, id.1
        )));
    }

    let node = document
        .get_object(id)
        .map_err(|e| pdf_error(format!("page tree object {} {}: {e}", id.0, id.1)))?
        .as_dict()
        .map_err(|_| pdf_error(format!("page tree object {} {} is not a dictionary", id.0, id.1)))?;

    match node_type(node) {
        Some(b"Pages") | None if node.get(b"Kids").is_ok() => {
            let kids = resolve(document, kids_entry(node)?)?
                .as_array()
                .map_err(|_| pdf_error(format!("/Kids of {} {} is not an array", id.0, id.1)))?;

            let mut total = 0u32;
            for kid in kids {
                let kid_id = kid.as_reference().map_err(|_| {
                    pdf_error(format!("/Kids of {} {} holds a direct object", id.0, id.1))
                })?;
                let pages = count_node(document, kid_id, depth + 1, visited)?;
                total = total
                    .checked_add(pages)
                    .ok_or_else(|| pdf_error("page count overflows"))?;
            }
            Ok(total)
        }
        Some(b"Page") | None => Ok(1),
        Some(other) => Err(pdf_error(format!(
            "unexpected /Type /{} in page tree at {} {}",
            String::from_utf8_lossy(other),
            id.0,
            id.1
        ))),
    }
}

fn node_type(node: &Dictionary) -> Option<&[u8]> {
    match node.get(b"Type") {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

fn kids_entry(node: &Dictionary) -> Result<&Object, StrategyError> {
    node.get(b"Kids")
        .map_err(|_| pdf_error("page tree node has no /Kids"))
}

/// Follow one level of indirection.
fn resolve<'a>(document: &'a Document, object: &'a Object) -> Result<&'a Object, StrategyError> {
    match object {
        Object::Reference(id) => document
            .get_object(*id)
            .map_err(|e| pdf_error(format!("object {} {}: {e}", id.0, id.1))),
        other => Ok(other),
    }
}

fn pdf_error(detail: impl Into<String>) -> StrategyError {
    StrategyError::Pdf {
        detail: detail.into(),
    }
}
