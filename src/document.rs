//! Input validation: turn a user-supplied path into a [`DocumentRef`].
//!
//! Everything that can be rejected without running a strategy is rejected
//! here: a missing file, an unreadable one, a directory, an extension that is
//! not PDF/DOCX/DOC. Once a `DocumentRef` exists, its format and size are
//! fixed for the rest of the invocation, so the size heuristic at the end of
//! the chain never has to touch the file system again and cannot fail.

use crate::error::PageCountError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Document formats the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    /// Office Open XML word-processing document (ZIP container).
    Docx,
    /// Legacy binary Word document.
    Doc,
}

impl DocumentFormat {
    /// Infer the format from a path's extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Map a bare extension (without the dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "doc" => Some(DocumentFormat::Doc),
            _ => None,
        }
    }

    /// Canonical lowercase extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Doc => "doc",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A validated document: an existing regular file with a supported format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    path: PathBuf,
    format: DocumentFormat,
    size_bytes: u64,
}

impl DocumentRef {
    /// Validate `path` and capture its format and size.
    ///
    /// Existence is checked before the extension, so a missing `cv.txt`
    /// reports `FileNotFound` rather than `UnsupportedFormat`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PageCountError> {
        let path = path.as_ref().to_path_buf();

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(PageCountError::PermissionDenied { path });
            }
            Err(_) => return Err(PageCountError::FileNotFound { path }),
        };

        if !metadata.is_file() {
            return Err(PageCountError::NotAFile { path });
        }

        let Some(format) = DocumentFormat::from_path(&path) else {
            let extension = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Err(PageCountError::UnsupportedFormat { path, extension });
        };

        // Check read permission by attempting to open
        if let Err(e) = std::fs::File::open(&path) {
            return Err(if e.kind() == std::io::ErrorKind::PermissionDenied {
                PageCountError::PermissionDenied { path }
            } else {
                PageCountError::FileNotFound { path }
            });
        }

        debug!(
            "Resolved {} document: {} ({} bytes)",
            format,
            path.display(),
            metadata.len()
        );

        Ok(Self {
            path,
            format,
            size_bytes: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// File size captured when the document was opened.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Final path component, for reports and logs.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
