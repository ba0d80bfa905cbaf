//! Page-counting strategies.
//!
//! Each submodule implements exactly one way of arriving at a page count.
//! They share the [`PageCountStrategy`] interface so that
//! [`crate::pipeline::StrategyPipeline`] can hold an ordered list of them and
//! fall through on failure without knowing what any of them does.
//!
//! ## Fidelity ladder
//!
//! ```text
//! native   Word lays the document out itself            exact, slow, Win/macOS only
//! pdf      leaf nodes of the PDF page tree              exact, PDF only
//! archive  <Pages> cached in docProps/app.xml           exact as of last save, DOCX only
//! content  body text length / 1500 chars per page       estimate, DOCX only
//! size     file bytes / per-format bytes per page       estimate, never fails
//! ```

pub mod archive;
pub mod content;
pub mod docx;
pub mod native;
pub mod pdf;
pub mod size;

use crate::document::DocumentRef;
use crate::error::StrategyError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use archive::ArchiveMetadataExtractor;
pub use content::ContentStructuralEstimator;
pub use docx::DocxStructuralStrategy;
pub use native::PlatformNativeCounter;
pub use pdf::PdfPageCounter;
pub use size::SizeHeuristicEstimator;

/// Result of one strategy attempt.
///
/// `Ok(0)` is legal for a strategy to return, but the pipeline treats it
/// exactly like an `Err`: it is not a usable page count.
pub type StrategyOutcome = Result<u32, StrategyError>;

/// Identifies a strategy in plans and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    PlatformNative,
    ArchiveMetadata,
    ContentEstimate,
    SizeHeuristic,
    PdfExact,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::PlatformNative => "platform_native",
            StrategyKind::ArchiveMetadata => "archive_metadata",
            StrategyKind::ContentEstimate => "content_estimate",
            StrategyKind::SizeHeuristic => "size_heuristic",
            StrategyKind::PdfExact => "pdf_exact",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One self-contained algorithm attempting to produce a page count.
///
/// Implementations must not panic on malformed input; every failure is a
/// [`StrategyError`]. They hold no mutable state, so one instance may serve
/// concurrent invocations.
pub trait PageCountStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn attempt(&self, doc: &DocumentRef) -> StrategyOutcome;

    /// An authoritative strategy's failure is the pipeline's failure: there
    /// is nothing meaningful to fall back to.
    fn is_authoritative(&self) -> bool {
        false
    }
}
