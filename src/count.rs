//! Top-level counting entry points.
//!
//! Every entry point funnels into [`count_blocking`]: validate the path,
//! build the plan, run it. The async variants move that work onto tokio's
//! blocking pool, since ZIP inflation, PDF parsing and Word automation are
//! all synchronous and Word in particular can take seconds.

use crate::config::CountConfig;
use crate::document::{DocumentFormat, DocumentRef};
use crate::error::PageCountError;
use crate::output::PageCountReport;
use crate::pipeline::resolve_page_count;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Count the pages of the document at `path`.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Returns `Err(PageCountError)` only when no count can be produced:
/// - the file is missing, unreadable, or not a regular file
/// - the extension is not `.pdf`, `.docx` or `.doc`
/// - a PDF's page tree cannot be read
///
/// DOC and DOCX always produce a count once the file is validated.
///
/// # Example
/// ```rust,no_run
/// use doc_pagecount::{count_pages, CountConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pages = count_pages("resume.docx", &CountConfig::default()).await?;
/// println!("{pages} page(s)");
/// # Ok(())
/// # }
/// ```
pub async fn count_pages(
    path: impl AsRef<Path>,
    config: &CountConfig,
) -> Result<u32, PageCountError> {
    Ok(count_report(path, config).await?.page_count)
}

/// Like [`count_pages`], but also returns the file name and format.
pub async fn count_report(
    path: impl AsRef<Path>,
    config: &CountConfig,
) -> Result<PageCountReport, PageCountError> {
    let path = path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || count_blocking(&path, &config))
        .await
        .map_err(|e| PageCountError::Internal(format!("Counting task panicked: {}", e)))?
}

/// Synchronous counterpart of [`count_pages`].
///
/// Runs on the calling thread; no tokio runtime is created or required.
pub fn count_pages_sync(
    path: impl AsRef<Path>,
    config: &CountConfig,
) -> Result<u32, PageCountError> {
    Ok(count_blocking(path.as_ref(), config)?.page_count)
}

/// Count the pages of an in-memory document.
///
/// `file_name` only supplies the format through its extension; the bytes are
/// written to a managed [`tempfile`] carrying that extension and removed on
/// return. Use this when uploads arrive as buffers rather than files.
///
/// If Word automation times out on Windows, Word may still hold the
/// temporary file open and its removal then fails silently.
///
/// # Example
/// ```rust,no_run
/// use doc_pagecount::{count_pages_from_bytes, CountConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("upload.bin")?;
/// let pages = count_pages_from_bytes(&bytes, "resume.pdf", &CountConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn count_pages_from_bytes(
    bytes: &[u8],
    file_name: &str,
    config: &CountConfig,
) -> Result<u32, PageCountError> {
    let name = Path::new(file_name);
    let Some(format) = DocumentFormat::from_path(name) else {
        return Err(PageCountError::UnsupportedFormat {
            path: PathBuf::from(file_name),
            extension: name
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_default(),
        });
    };

    let mut tmp = tempfile::Builder::new()
        .prefix("pagecount-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile()
        .map_err(|e| PageCountError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| PageCountError::Internal(format!("tempfile write: {e}")))?;
    tmp.flush()
        .map_err(|e| PageCountError::Internal(format!("tempfile write: {e}")))?;
    debug!(
        "Buffered {} bytes of '{}' at {}",
        bytes.len(),
        file_name,
        tmp.path().display()
    );

    // `tmp` is dropped (and the file deleted) when counting returns
    count_pages(tmp.path(), config).await
}

fn count_blocking(path: &Path, config: &CountConfig) -> Result<PageCountReport, PageCountError> {
    let doc = DocumentRef::open(path)?;
    let ctx = config.execution_context();
    let page_count = resolve_page_count(&doc, &ctx, config)?;

    info!("{}: {} page(s)", doc.file_name(), page_count);
    Ok(PageCountReport {
        filename: doc.file_name(),
        file_type: doc.format(),
        page_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Platform;

    fn linux() -> CountConfig {
        CountConfig::builder().platform(Platform::Linux).build().unwrap()
    }

    #[test]
    fn sync_counts_doc_by_size() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("legacy.doc");
        std::fs::write(&path, vec![0u8; 70_000]).unwrap();

        assert_eq!(count_pages_sync(&path, &linux()).unwrap(), 2);
    }

    #[tokio::test]
    async fn report_carries_name_and_format() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("Legacy.DOC");
        std::fs::write(&path, vec![0u8; 10]).unwrap();

        let report = count_report(&path, &linux()).await.unwrap();
        assert_eq!(report.filename, "Legacy.DOC");
        assert_eq!(report.file_type, DocumentFormat::Doc);
        assert_eq!(report.page_count, 1);
    }

    #[tokio::test]
    async fn bytes_with_unsupported_name_are_rejected() {
        let err = count_pages_from_bytes(b"hello", "notes.txt", &linux())
            .await
            .unwrap_err();
        assert!(matches!(err, PageCountError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn bytes_are_counted_through_a_tempfile() {
        let pages = count_pages_from_bytes(&vec![1u8; 105_000], "old.doc", &linux())
            .await
            .unwrap();
        assert_eq!(pages, 3);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = count_pages_sync("/no/such/dir/cv.pdf", &linux()).unwrap_err();
        assert!(matches!(err, PageCountError::FileNotFound { .. }));
    }
}
