//! Configuration for page-count resolution.
//!
//! All tunable behaviour lives in [`CountConfig`], built via its
//! [`CountConfigBuilder`]. The counting constants themselves (characters per
//! page, bytes per page) are deliberately not here: they are calibrated
//! together with their strategies and live beside them.

use crate::context::{ExecutionContext, Platform};
use crate::error::PageCountError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted Word automation timeout, in seconds.
pub const MAX_NATIVE_TIMEOUT_SECS: u64 = 3600;

/// Configuration for resolving a document's page count.
///
/// # Example
/// ```rust
/// use doc_pagecount::{CountConfig, Platform};
///
/// let config = CountConfig::builder()
///     .platform(Platform::Linux)
///     .native_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert!(config.native_automation);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountConfig {
    /// Platform whose native strategy is tried first. `None` (default) uses
    /// the host this process runs on.
    pub platform: Option<Platform>,

    /// Try Word automation before the structural strategies. Default: true.
    ///
    /// Word is the only source of a layout-exact count for DOC/DOCX, but it
    /// costs an application start per document. Batch jobs that only need an
    /// estimate can switch it off.
    pub native_automation: bool,

    /// Upper bound for one Word automation round trip, in seconds. Default: 60.
    /// Valid range: 1 ..= [`MAX_NATIVE_TIMEOUT_SECS`].
    pub native_timeout_secs: u64,
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            platform: None,
            native_automation: true,
            native_timeout_secs: word_automation::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl CountConfig {
    /// Create a new builder for `CountConfig`.
    pub fn builder() -> CountConfigBuilder {
        CountConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build the per-invocation [`ExecutionContext`] this config describes.
    pub fn execution_context(&self) -> ExecutionContext {
        ExecutionContext::new(self.platform.unwrap_or_else(Platform::host))
    }

    pub fn native_timeout(&self) -> Duration {
        Duration::from_secs(self.native_timeout_secs)
    }
}

/// Builder for [`CountConfig`].
#[derive(Debug)]
pub struct CountConfigBuilder {
    config: CountConfig,
}

impl CountConfigBuilder {
    pub fn platform(mut self, platform: Platform) -> Self {
        self.config.platform = Some(platform);
        self
    }

    pub fn native_automation(mut self, enabled: bool) -> Self {
        self.config.native_automation = enabled;
        self
    }

    pub fn native_timeout_secs(mut self, secs: u64) -> Self {
        self.config.native_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CountConfig, PageCountError> {
        if self.config.native_timeout_secs == 0 {
            return Err(PageCountError::InvalidConfig(
                "Native automation timeout must be ≥ 1 second".into(),
            ));
        }
        if self.config.native_timeout_secs > MAX_NATIVE_TIMEOUT_SECS {
            return Err(PageCountError::InvalidConfig(format!(
                "Native automation timeout must be ≤ {MAX_NATIVE_TIMEOUT_SECS} seconds, got {}",
                self.config.native_timeout_secs
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = CountConfig::default();
        assert_eq!(c.platform, None);
        assert!(c.native_automation);
        assert_eq!(c.native_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn builder_sets_fields() {
        let c = CountConfig::builder()
            .platform(Platform::MacOs)
            .native_automation(false)
            .native_timeout_secs(5)
            .build()
            .unwrap();
        assert_eq!(c.platform, Some(Platform::MacOs));
        assert!(!c.native_automation);
        assert_eq!(c.native_timeout_secs, 5);
        assert_eq!(c.execution_context().platform, Platform::MacOs);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = CountConfig::builder()
            .native_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, PageCountError::InvalidConfig(_)));
    }

    #[test]
    fn oversized_timeout_rejected() {
        let max = CountConfig::builder()
            .native_timeout_secs(MAX_NATIVE_TIMEOUT_SECS)
            .build()
            .unwrap();
        assert_eq!(max.native_timeout_secs, MAX_NATIVE_TIMEOUT_SECS);

        for secs in [MAX_NATIVE_TIMEOUT_SECS + 1, u64::MAX] {
            let err = CountConfig::builder()
                .native_timeout_secs(secs)
                .build()
                .unwrap_err();
            assert!(matches!(err, PageCountError::InvalidConfig(_)), "{secs}: {err}");
        }
    }

    #[test]
    fn unset_platform_falls_back_to_host() {
        let ctx = CountConfig::default().execution_context();
        assert_eq!(ctx.platform, Platform::host());
    }
}
