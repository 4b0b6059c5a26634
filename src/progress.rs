//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the dispatcher works through the scratch area. Logging already records
//! every decision; the callback exists for hosts that want to drive their own
//! UI (progress bars, job dashboards) without parsing log lines.
//!
//! # Example
//!
//! ```rust
//! use edgequake_office2pdf::{BatchConfig, BatchProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     converted: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_file_converted(&self, index: usize, total: usize, name: &str) {
//!         self.converted.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{} {}", index + 1, total, name);
//!     }
//! }
//!
//! let config = BatchConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { converted: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::BatchStats;
use std::sync::Arc;

/// Called by the dispatcher as it processes each staged file.
///
/// Files are processed one at a time, so calls never overlap; the trait is
/// still `Send + Sync` because the config travels across tokio tasks. All
/// methods default to no-ops. `index` is 0-based.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once, after staging, with the number of staged files.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before the idempotency check for a file.
    fn on_file_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    fn on_file_converted(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// The target PDF already existed.
    fn on_file_skipped(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// The conversion failed; `error` is human-readable.
    fn on_file_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every file has been attempted and the scratch area
    /// cleanup has been tried.
    fn on_batch_complete(&self, stats: &BatchStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        converted: AtomicUsize,
        skipped: AtomicUsize,
        errors: AtomicUsize,
        total: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_batch_start(&self, total: usize) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn on_file_start(&self, _index: usize, _total: usize, _name: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_converted(&self, _index: usize, _total: usize, _name: &str) {
            self.converted.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_skipped(&self, _index: usize, _total: usize, _name: &str) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }

        fn on_file_error(&self, _index: usize, _total: usize, _name: &str, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_file_start(0, 2, "a.docx");
        cb.on_file_converted(0, 2, "a.docx");
        cb.on_file_error(1, 2, "b.xlsx", "boom");
        cb.on_batch_complete(&BatchStats::default());
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_batch_start(3);
        tracker.on_file_start(0, 3, "a.docx");
        tracker.on_file_converted(0, 3, "a.docx");
        tracker.on_file_start(1, 3, "b.xlsx");
        tracker.on_file_skipped(1, 3, "b.xlsx");
        tracker.on_file_start(2, 3, "c.pptx");
        tracker.on_file_error(2, 3, "c.pptx", "rejected");

        assert_eq!(tracker.total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.converted.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skipped.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_batch_start(1);
        cb.on_file_skipped(0, 1, "a.docx");
    }
}
