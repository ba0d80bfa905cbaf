//! DOCX container access and the combined structural strategy.
//!
//! A DOCX file is a ZIP archive of XML parts. Two strategies read it: the
//! cached `<Pages>` property and the body-text estimate. They run as one
//! unit over a single opened archive: metadata first, content second. Any
//! archive-level failure fails the unit as a whole and the pipeline moves on
//! to the size heuristic.

use super::{
    ArchiveMetadataExtractor, ContentStructuralEstimator, PageCountStrategy, StrategyKind,
    StrategyOutcome,
};
use crate::document::DocumentRef;
use crate::error::StrategyError;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// Open `path` as a ZIP archive.
pub(crate) fn open_archive(path: &Path) -> Result<ZipArchive<File>, StrategyError> {
    let file = File::open(path)?;
    ZipArchive::new(file).map_err(|e| StrategyError::Archive {
        detail: e.to_string(),
    })
}

/// Read a UTF-8 part from the archive. `Ok(None)` when the part is absent.
pub(crate) fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, StrategyError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(StrategyError::Archive {
                detail: format!("{name}: {e}"),
            })
        }
    };

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| StrategyError::Archive {
            detail: format!("{name}: {e}"),
        })?;
    Ok(Some(content))
}

/// Cached `<Pages>` metadata, falling back to the content estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxStructuralStrategy {
    metadata: ArchiveMetadataExtractor,
    content: ContentStructuralEstimator,
}

impl DocxStructuralStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run metadata then content estimation over an already opened archive.
    ///
    /// A cached count of zero fails the whole unit, so the content estimate
    /// is skipped and the pipeline goes straight to the size heuristic.
    pub fn count_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> StrategyOutcome {
        match self.metadata.read_pages(archive) {
            Some(0) => return Err(StrategyError::NonPositive { count: 0 }),
            Some(pages) => {
                debug!("{}: cached page count {}", StrategyKind::ArchiveMetadata, pages);
                return Ok(pages);
            }
            None => {}
        }

        let pages = self.content.estimate(archive)?;
        debug!("{}: estimated {} pages", StrategyKind::ContentEstimate, pages);
        Ok(pages)
    }
}

impl PageCountStrategy for DocxStructuralStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ArchiveMetadata
    }

    fn attempt(&self, doc: &DocumentRef) -> StrategyOutcome {
        let mut archive = open_archive(doc.path())?;
        self.count_archive(&mut archive)
    }
}
