//! Page count computed by Microsoft Word itself.
//!
//! Word is the layout engine DOC and DOCX files were written for, so its
//! answer is the reference every other strategy approximates. It is also the
//! slowest one by far and exists only on Windows and macOS, which is why the
//! pipeline puts it first but treats every failure as a reason to move on.

use super::{PageCountStrategy, StrategyKind, StrategyOutcome};
use crate::context::Platform;
use crate::document::DocumentRef;
use crate::error::StrategyError;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use word_automation::Backend;

/// Asks the platform's Word installation for the page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformNativeCounter {
    backend: Backend,
    timeout: Duration,
}

impl PlatformNativeCounter {
    /// The counter for `platform`, or `None` when the platform has no
    /// automation channel.
    pub fn for_platform(platform: Platform, timeout: Duration) -> Option<Self> {
        let backend = match platform {
            Platform::Windows => Backend::WordCom,
            Platform::MacOs => Backend::WordAppleScript,
            Platform::Linux | Platform::Unknown => return None,
        };
        Some(Self { backend, timeout })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask Word for the page count of the document at `path`.
    pub fn count(&self, path: &Path) -> StrategyOutcome {
        // Word resolves relative paths against its own working directory
        let path = path.canonicalize()?;

        let count = word_automation::count_pages(self.backend, &path, self.timeout).map_err(
            |e| {
                warn!("{} unavailable: {}", self.backend.name(), e);
                StrategyError::PlatformUnavailable {
                    reason: e.to_string(),
                }
            },
        )?;
        debug!("{} reported {} pages", self.backend.name(), count);

        positive_count(count)
    }
}

/// Accept Word's answer only when it is a positive `u32`.
///
/// Counts beyond `u32::MAX` cannot come from a real document and are
/// rejected along with zero and negative ones.
fn positive_count(count: i64) -> StrategyOutcome {
    match u32::try_from(count) {
        Ok(pages) if pages > 0 => Ok(pages),
        _ => Err(StrategyError::NonPositive { count }),
    }
}

impl PageCountStrategy for PlatformNativeCounter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::PlatformNative
    }

    fn attempt(&self, doc: &DocumentRef) -> StrategyOutcome {
        self.count(doc.path())
    }
}
