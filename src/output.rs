//! Output types returned by the report entry points.

use crate::document::DocumentFormat;
use serde::{Deserialize, Serialize};

/// Page count of one document, ready to serialise.
///
/// ```json
/// { "filename": "resume.docx", "file_type": "docx", "page_count": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCountReport {
    /// Final path component of the input.
    pub filename: String,
    pub file_type: DocumentFormat,
    /// Always ≥ 1.
    pub page_count: u32,
}
