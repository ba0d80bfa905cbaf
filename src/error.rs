//! Error types for the doc-pagecount library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PageCountError`] is **fatal**: no page count can be produced at all
//!   (missing file, unsupported extension, unparsable PDF). Returned as
//!   `Err(PageCountError)` from the top-level `count_*` functions.
//!
//! * [`StrategyError`] is **non-fatal**: one counting strategy could not
//!   produce a usable number (Word not installed, corrupt `app.xml`, …).
//!   The pipeline logs it and falls through to the next strategy. The only
//!   time one escapes is as the detail of [`PageCountError::Parse`], when the
//!   authoritative PDF counter fails.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the doc-pagecount library.
#[derive(Debug, Error)]
pub enum PageCountError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path exists but is a directory or other non-regular file.
    #[error("'{path}' is not a regular file")]
    NotAFile { path: PathBuf },

    /// The extension is not one of `.pdf`, `.docx`, `.doc`.
    #[error("Unsupported format for '{path}' (extension {extension:?})\nPlease provide a .doc, .docx, or .pdf file.")]
    UnsupportedFormat { path: PathBuf, extension: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF's cross-reference table or page tree cannot be read.
    #[error("PDF '{path}' could not be parsed: {detail}")]
    Parse { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure of a single counting strategy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StrategyError {
    /// Native automation could not run or did not answer.
    #[error("platform automation unavailable: {reason}")]
    PlatformUnavailable { reason: String },

    /// The container is not a readable ZIP archive.
    #[error("archive unreadable: {detail}")]
    Archive { detail: String },

    /// A required archive entry is missing.
    #[error("archive entry '{name}' missing")]
    MissingEntry { name: String },

    /// An XML part could not be parsed.
    #[error("malformed XML in '{part}': {detail}")]
    Xml { part: String, detail: String },

    /// The PDF structure is invalid.
    #[error("{detail}")]
    Pdf { detail: String },

    /// File-system error while reading the document.
    #[error("I/O error: {detail}")]
    Io { detail: String },

    /// A strategy produced zero, a negative count, or one past `u32::MAX`.
    #[error("unusable page count {count}")]
    NonPositive { count: i64 },
}

impl From<std::io::Error> for StrategyError {
    fn from(e: std::io::Error) -> Self {
        StrategyError::Io {
            detail: e.to_string(),
        }
    }
}
