//! Last-resort page estimate from the file size.
//!
//! Always produces a number, so it closes every DOC and DOCX chain.

use super::{PageCountStrategy, StrategyKind, StrategyOutcome};
use crate::document::{DocumentFormat, DocumentRef};
use tracing::debug;

/// Average bytes per page for DOCX (compressed XML plus media).
pub const DOCX_BYTES_PER_PAGE: u64 = 45_000;
/// Average bytes per page for legacy binary DOC.
pub const DOC_BYTES_PER_PAGE: u64 = 35_000;
/// Average bytes per page for PDF. Only used when the size heuristic is run
/// directly; PDF chains never fall through to it.
pub const PDF_BYTES_PER_PAGE: u64 = 75_000;

pub fn bytes_per_page(format: DocumentFormat) -> u64 {
    match format {
        DocumentFormat::Docx => DOCX_BYTES_PER_PAGE,
        DocumentFormat::Doc => DOC_BYTES_PER_PAGE,
        DocumentFormat::Pdf => PDF_BYTES_PER_PAGE,
    }
}

/// `max(1, round(size / bytes_per_page))`, rounding halves to even.
pub fn estimate_pages(size_bytes: u64, format: DocumentFormat) -> u32 {
    let k = bytes_per_page(format);
    let q = size_bytes / k;
    let r = size_bytes % k;

    // r < k, so 2r cannot overflow for any realistic divisor
    let rounded = match (2 * r).cmp(&k) {
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal => q + (q & 1),
        std::cmp::Ordering::Less => q,
    };

    u32::try_from(rounded.max(1)).unwrap_or(u32::MAX)
}

/// Estimates pages from the size captured in the [`DocumentRef`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeHeuristicEstimator;

impl SizeHeuristicEstimator {
    pub fn estimate(&self, doc: &DocumentRef) -> u32 {
        let pages = estimate_pages(doc.size_bytes(), doc.format());
        debug!(
            "{} bytes at {} bytes/page → {} pages",
            doc.size_bytes(),
            bytes_per_page(doc.format()),
            pages
        );
        pages
    }
}

impl PageCountStrategy for SizeHeuristicEstimator {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SizeHeuristic
    }

    fn attempt(&self, doc: &DocumentRef) -> StrategyOutcome {
        Ok(self.estimate(doc))
    }
}
