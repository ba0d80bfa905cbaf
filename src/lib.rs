//! # doc-pagecount
//!
//! Determine how many pages a PDF, DOCX or legacy DOC document has.
//!
//! ## Why this crate?
//!
//! A PDF states its page count exactly in its page tree. A Word document does
//! not: pages only exist after a layout engine has flowed the text, and the
//! only engine that agrees with what users see is Word itself. This crate
//! therefore tries a ladder of strategies, from "ask Word" down to "guess from
//! the file size", and returns the first usable answer. Every DOC and DOCX
//! gets a count; only a broken PDF is an error.
//!
//! ## Pipeline Overview
//!
//! ```text
//! path
//!  │
//!  ├─ 1. Validate  exists, regular file, .pdf/.docx/.doc (DocumentRef)
//!  ├─ 2. Plan      format × platform × config → ordered strategies
//!  ├─ 3. Run       first positive count wins; errors fall through
//!  │      ├─ PDF   page-tree leaves (authoritative, no fallback)
//!  │      ├─ DOCX  [Word] → <Pages> in app.xml / text length → file size
//!  │      └─ DOC   [Word] → file size
//!  └─ 4. Report    page_count ≥ 1
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doc_pagecount::{count_pages, CountConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CountConfig::default();
//!     let pages = count_pages("resume.docx", &config).await?;
//!     println!("{pages} page(s)");
//!     Ok(())
//! }
//! ```
//!
//! Without an async runtime:
//!
//! ```rust,no_run
//! use doc_pagecount::{count_pages_sync, CountConfig, Platform};
//!
//! let config = CountConfig::builder()
//!     .platform(Platform::Linux) // skip Word automation
//!     .build()?;
//! let pages = count_pages_sync("report.pdf", &config)?;
//! # Ok::<(), doc_pagecount::PageCountError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pagecount` binary (clap, anyhow, tracing-subscriber, indicatif, futures, serde_json) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! doc-pagecount = { version = "0.1", default-features = false }
//! ```
//!
//! ## Accuracy
//!
//! | Source | Formats | Exact? |
//! |--------|---------|--------|
//! | Word automation | DOC, DOCX (Windows, macOS) | yes |
//! | PDF page tree | PDF | yes |
//! | `<Pages>` in `docProps/app.xml` | DOCX | as of last save |
//! | body text ÷ 1500 chars | DOCX | estimate |
//! | file size ÷ bytes per page | DOC, DOCX | rough estimate |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod context;
pub mod count;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod strategy;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{CountConfig, CountConfigBuilder, MAX_NATIVE_TIMEOUT_SECS};
pub use context::{ExecutionContext, Platform};
pub use count::{count_pages, count_pages_from_bytes, count_pages_sync, count_report};
pub use document::{DocumentFormat, DocumentRef};
pub use error::{PageCountError, StrategyError};
pub use output::PageCountReport;
pub use pipeline::{resolve_page_count, StrategyPipeline};
pub use strategy::{PageCountStrategy, StrategyKind, StrategyOutcome};
