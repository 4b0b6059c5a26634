//! Configuration types for batch office-to-PDF conversion.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. The input and output directories are *not* part of
//! the config: they are arguments to [`crate::convert::convert_dir`], so one
//! config can drive many batches.

use crate::backend::BackendSet;
use crate::error::Office2PdfError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Scratch directory name used when none is configured.
///
/// Relative, so it resolves against the process's working directory.
pub const DEFAULT_SCRATCH_DIR: &str = "office2pdf_staging";

/// Upper bound for the presentation settling delay.
pub const MAX_SETTLE_DELAY_MS: u64 = 60_000;

/// Configuration for a batch conversion.
///
/// # Example
/// ```rust
/// use edgequake_office2pdf::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .scratch_dir("/tmp/office2pdf_staging")
///     .settle_delay_ms(2000)
///     .backend_timeout_secs(120)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Where sanitised copies are staged. Default: `office2pdf_staging`.
    ///
    /// Created if absent, reused if present, removed after dispatch.
    pub scratch_dir: PathBuf,

    /// Pause between opening a presentation and saving it. Default: 1500 ms.
    ///
    /// Slide decks with embedded media are not always fully loaded when the
    /// application reports the document as open; saving too early produces
    /// rejected or truncated exports. Other families are saved immediately.
    pub settle_delay_ms: u64,

    /// Per-document backend timeout in seconds. Default: 300.
    pub backend_timeout_secs: u64,

    /// Explicit `soffice` executable. If None, `OFFICE2PDF_SOFFICE` or
    /// `soffice` on `PATH` is used.
    pub soffice_path: Option<PathBuf>,

    /// Pre-constructed backends. Takes precedence over `soffice_path`.
    pub backends: Option<BackendSet>,

    /// Optional per-file progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            settle_delay_ms: 1500,
            backend_timeout_secs: 300,
            soffice_path: None,
            backends: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("scratch_dir", &self.scratch_dir)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("backend_timeout_secs", &self.backend_timeout_secs)
            .field("soffice_path", &self.soffice_path)
            .field("backends", &self.backends)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = dir.into();
        self
    }

    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    pub fn backend_timeout_secs(mut self, secs: u64) -> Self {
        self.config.backend_timeout_secs = secs;
        self
    }

    pub fn soffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.soffice_path = Some(path.into());
        self
    }

    pub fn backends(mut self, backends: BackendSet) -> Self {
        self.config.backends = Some(backends);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, Office2PdfError> {
        let c = &self.config;
        if c.scratch_dir.as_os_str().is_empty() {
            return Err(Office2PdfError::InvalidConfig(
                "Scratch directory must not be empty".into(),
            ));
        }
        if c.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            return Err(Office2PdfError::InvalidConfig(format!(
                "Settle delay must be ≤ {MAX_SETTLE_DELAY_MS} ms, got {}",
                c.settle_delay_ms
            )));
        }
        if c.backend_timeout_secs == 0 {
            return Err(Office2PdfError::InvalidConfig(
                "Backend timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = BatchConfig::default();
        assert_eq!(c.scratch_dir, PathBuf::from(DEFAULT_SCRATCH_DIR));
        assert_eq!(c.settle_delay(), Duration::from_millis(1500));
        assert_eq!(c.backend_timeout(), Duration::from_secs(300));
        assert!(c.backends.is_none());
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = BatchConfig::builder().backend_timeout_secs(0).build().unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn builder_rejects_long_settle() {
        assert!(BatchConfig::builder()
            .settle_delay_ms(MAX_SETTLE_DELAY_MS + 1)
            .build()
            .is_err());
        assert!(BatchConfig::builder()
            .settle_delay_ms(MAX_SETTLE_DELAY_MS)
            .build()
            .is_ok());
    }

    #[test]
    fn builder_rejects_empty_scratch() {
        assert!(BatchConfig::builder().scratch_dir("").build().is_err());
    }

    #[test]
    fn debug_hides_callback() {
        use crate::progress::NoopProgressCallback;
        use std::sync::Arc;
        let c = BatchConfig::builder()
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn BatchProgressCallback>"));
    }
}
