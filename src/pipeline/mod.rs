//! Strategy pipeline: the ordered fall-through that produces one page count.
//!
//! ## Plans
//!
//! The plan depends only on the document format, the execution context and
//! the config. It is built fresh for every invocation and never cached.
//!
//! ```text
//! PDF    pdf_exact                                        (authoritative)
//! DOCX   [platform_native] ──▶ archive_metadata/content ──▶ size_heuristic
//! DOC    [platform_native] ──────────────────────────────▶ size_heuristic
//! ```
//!
//! `platform_native` is only planned on Windows and macOS, and only while
//! `CountConfig::native_automation` is on.
//!
//! ## Fall-through rules
//!
//! Strategies run strictly in order and the first positive count wins; nothing
//! after it runs. An `Err`, or an `Ok(0)`, moves on to the next one. An
//! authoritative strategy is the exception: its failure ends the run with
//! [`PageCountError::Parse`]. DOC and DOCX plans end in the size heuristic,
//! which cannot fail, so running out of strategies is an internal error.

use crate::config::CountConfig;
use crate::context::ExecutionContext;
use crate::document::{DocumentFormat, DocumentRef};
use crate::error::PageCountError;
use crate::strategy::{
    DocxStructuralStrategy, PageCountStrategy, PdfPageCounter, PlatformNativeCounter,
    SizeHeuristicEstimator, StrategyKind,
};
use tracing::{debug, info, warn};

/// An ordered list of strategies for one document.
pub struct StrategyPipeline {
    strategies: Vec<Box<dyn PageCountStrategy>>,
}

impl StrategyPipeline {
    /// A pipeline running exactly `strategies`, in order.
    pub fn with_strategies(strategies: Vec<Box<dyn PageCountStrategy>>) -> Self {
        Self { strategies }
    }

    /// The plan for `doc` under `ctx` and `config`.
    pub fn for_document(doc: &DocumentRef, ctx: &ExecutionContext, config: &CountConfig) -> Self {
        let mut strategies: Vec<Box<dyn PageCountStrategy>> = Vec::new();

        match doc.format() {
            DocumentFormat::Pdf => strategies.push(Box::new(PdfPageCounter)),
            format @ (DocumentFormat::Docx | DocumentFormat::Doc) => {
                if config.native_automation {
                    if let Some(native) =
                        PlatformNativeCounter::for_platform(ctx.platform, config.native_timeout())
                    {
                        strategies.push(Box::new(native));
                    }
                }
                if format == DocumentFormat::Docx {
                    strategies.push(Box::new(DocxStructuralStrategy::new()));
                }
                strategies.push(Box::new(SizeHeuristicEstimator));
            }
        }

        Self { strategies }
    }

    /// Kinds of the planned strategies, in execution order.
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Run the plan against `doc` and return the first usable count.
    pub fn run(&self, doc: &DocumentRef) -> Result<u32, PageCountError> {
        for strategy in &self.strategies {
            let kind = strategy.kind();
            match strategy.attempt(doc) {
                Ok(pages) if pages > 0 => {
                    info!("{}: {} page(s) via {}", doc.file_name(), pages, kind);
                    return Ok(pages);
                }
                Ok(_) => {
                    debug!("{}: {} returned 0 pages", doc.file_name(), kind);
                    if strategy.is_authoritative() {
                        return Err(PageCountError::Parse {
                            path: doc.path().to_path_buf(),
                            detail: "page tree has no pages".into(),
                        });
                    }
                }
                Err(e) if strategy.is_authoritative() => {
                    warn!("{}: {} failed: {}", doc.file_name(), kind, e);
                    return Err(PageCountError::Parse {
                        path: doc.path().to_path_buf(),
                        detail: e.to_string(),
                    });
                }
                Err(e) => {
                    debug!("{}: {} failed, falling through: {}", doc.file_name(), kind, e);
                }
            }
        }

        Err(PageCountError::Internal(format!(
            "no strategy produced a page count for '{}'",
            doc.path().display()
        )))
    }
}

/// Resolve the page count of a validated document.
///
/// Pure with respect to its inputs apart from reading the file and, on
/// Windows and macOS, asking Word.
pub fn resolve_page_count(
    doc: &DocumentRef,
    ctx: &ExecutionContext,
    config: &CountConfig,
) -> Result<u32, PageCountError> {
    let pipeline = StrategyPipeline::for_document(doc, ctx, config);
    debug!(
        "{}: {} on {} → plan {:?}",
        doc.file_name(),
        doc.format(),
        ctx.platform,
        pipeline.kinds()
    );
    pipeline.run(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Platform;
    use crate::error::StrategyError;
    use crate::strategy::StrategyOutcome;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Scripted {
        kind: StrategyKind,
        outcome: StrategyOutcome,
        authoritative: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn boxed(
            kind: StrategyKind,
            outcome: StrategyOutcome,
        ) -> (Box<dyn PageCountStrategy>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = Scripted {
                kind,
                outcome,
                authoritative: false,
                calls: Arc::clone(&calls),
            };
            (Box::new(strategy), calls)
        }
    }

    impl PageCountStrategy for Scripted {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        fn attempt(&self, _doc: &DocumentRef) -> StrategyOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }

        fn is_authoritative(&self) -> bool {
            self.authoritative
        }
    }

    fn unavailable() -> StrategyOutcome {
        Err(StrategyError::PlatformUnavailable {
            reason: "no Word".into(),
        })
    }

    fn doc_in(dir: &TempDir, name: &str, bytes: &[u8]) -> DocumentRef {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        DocumentRef::open(&path).unwrap()
    }

    fn config() -> CountConfig {
        CountConfig::default()
    }

    #[test]
    fn first_success_wins_and_later_strategies_never_run() {
        let dir = TempDir::new().unwrap();
        let doc = doc_in(&dir, "a.docx", b"x");

        let (native, native_calls) = Scripted::boxed(StrategyKind::PlatformNative, unavailable());
        let (meta, meta_calls) = Scripted::boxed(StrategyKind::ArchiveMetadata, Ok(4));
        let (size, size_calls) = Scripted::boxed(StrategyKind::SizeHeuristic, Ok(9));

        let pipeline = StrategyPipeline::with_strategies(vec![native, meta, size]);
        assert_eq!(pipeline.run(&doc).unwrap(), 4);
        assert_eq!(native_calls.load(Ordering::SeqCst), 1);
        assert_eq!(meta_calls.load(Ordering::SeqCst), 1);
        assert_eq!(size_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn zero_falls_through_like_an_error() {
        let dir = TempDir::new().unwrap();
        let doc = doc_in(&dir, "a.doc", b"x");

        let (native, _) = Scripted::boxed(StrategyKind::PlatformNative, Ok(0));
        let (size, size_calls) = Scripted::boxed(StrategyKind::SizeHeuristic, Ok(2));

        let pipeline = StrategyPipeline::with_strategies(vec![native, size]);
        assert_eq!(pipeline.run(&doc).unwrap(), 2);
        assert_eq!(size_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn authoritative_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let doc = doc_in(&dir, "a.pdf", b"x");

        let calls = Arc::new(AtomicUsize::new(0));
        let pdf: Box<dyn PageCountStrategy> = Box::new(Scripted {
            kind: StrategyKind::PdfExact,
            outcome: Err(StrategyError::Pdf {
                detail: "trailer has no /Root".into(),
            }),
            authoritative: true,
            calls: Arc::clone(&calls),
        });
        let (size, size_calls) = Scripted::boxed(StrategyKind::SizeHeuristic, Ok(1));

        let pipeline = StrategyPipeline::with_strategies(vec![pdf, size]);
        match pipeline.run(&doc).unwrap_err() {
            PageCountError::Parse { detail, .. } => assert!(detail.contains("/Root")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(size_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn exhausted_plan_is_internal_error() {
        let dir = TempDir::new().unwrap();
        let doc = doc_in(&dir, "a.doc", b"x");

        let (native, _) = Scripted::boxed(StrategyKind::PlatformNative, unavailable());
        let pipeline = StrategyPipeline::with_strategies(vec![native]);
        assert!(matches!(
            pipeline.run(&doc).unwrap_err(),
            PageCountError::Internal(_)
        ));
    }

    #[test]
    fn plans_per_format_and_platform() {
        let dir = TempDir::new().unwrap();
        let pdf = doc_in(&dir, "a.pdf", b"x");
        let docx = doc_in(&dir, "a.docx", b"x");
        let doc = doc_in(&dir, "a.doc", b"x");

        let windows = ExecutionContext::new(Platform::Windows);
        let macos = ExecutionContext::new(Platform::MacOs);
        let linux = ExecutionContext::new(Platform::Linux);
        let plan = |d: &DocumentRef, ctx: &ExecutionContext, c: &CountConfig| {
            StrategyPipeline::for_document(d, ctx, c).kinds()
        };

        for ctx in [&windows, &macos, &linux] {
            assert_eq!(plan(&pdf, ctx, &config()), vec![StrategyKind::PdfExact]);
        }

        assert_eq!(
            plan(&docx, &windows, &config()),
            vec![
                StrategyKind::PlatformNative,
                StrategyKind::ArchiveMetadata,
                StrategyKind::SizeHeuristic
            ]
        );
        assert_eq!(
            plan(&doc, &macos, &config()),
            vec![StrategyKind::PlatformNative, StrategyKind::SizeHeuristic]
        );
        assert_eq!(
            plan(&docx, &linux, &config()),
            vec![StrategyKind::ArchiveMetadata, StrategyKind::SizeHeuristic]
        );
        assert_eq!(
            plan(&doc, &ExecutionContext::new(Platform::Unknown), &config()),
            vec![StrategyKind::SizeHeuristic]
        );
    }

    #[test]
    fn native_automation_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let docx = doc_in(&dir, "a.docx", b"x");
        let config = CountConfig::builder()
            .native_automation(false)
            .build()
            .unwrap();

        let kinds = StrategyPipeline::for_document(
            &docx,
            &ExecutionContext::new(Platform::Windows),
            &config,
        )
        .kinds();
        assert_eq!(
            kinds,
            vec![StrategyKind::ArchiveMetadata, StrategyKind::SizeHeuristic]
        );
    }

    #[test]
    fn broken_docx_falls_back_to_size() {
        let dir = TempDir::new().unwrap();
        let doc = doc_in(&dir, "cv.docx", &vec![b'z'; 100_000]);
        let ctx = ExecutionContext::new(Platform::Linux);

        assert_eq!(resolve_page_count(&doc, &ctx, &config()).unwrap(), 2);
    }

    #[test]
    fn broken_pdf_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let doc = doc_in(&dir, "cv.pdf", b"not a pdf at all");
        let ctx = ExecutionContext::new(Platform::Linux);

        assert!(matches!(
            resolve_page_count(&doc, &ctx, &config()).unwrap_err(),
            PageCountError::Parse { .. }
        ));
    }
}
