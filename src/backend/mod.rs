//! Conversion backends: the narrow capability the dispatcher drives.
//!
//! An office application is modelled as four calls: `open` a document,
//! `save_as_pdf` to a target path, `close` the document, `quit` the
//! application. Anything that can honour that contract can be plugged in:
//! a headless LibreOffice process ([`LibreOfficeBackend`]), a conversion
//! micro-service, or a scripted fake in tests.
//!
//! Backends are keyed by [`DocumentFamily`] through a [`BackendSet`], so a
//! deployment can route spreadsheets to one engine and slides to another.

pub mod libreoffice;

use crate::error::JobError;
use crate::pipeline::classify::DocumentFamily;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use libreoffice::LibreOfficeBackend;

/// An open document inside a backend.
///
/// Produced by [`DocumentBackend::open`] and handed back to
/// [`DocumentBackend::save_as_pdf`] / [`DocumentBackend::close`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    pub path: PathBuf,
    pub family: DocumentFamily,
}

/// One office application, seen through the calls the pipeline needs.
///
/// Calls for a given document always arrive in the order
/// `open → save_as_pdf → close → quit`; `close` and `quit` are also called
/// after a failed `save_as_pdf`. The dispatcher never overlaps two documents
/// on the same backend.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Backend identifier used in logs and errors (e.g. `"libreoffice"`).
    fn name(&self) -> &str;

    /// Open `path` as a document of `family`.
    async fn open(&self, path: &Path, family: DocumentFamily) -> Result<DocumentHandle, JobError>;

    /// Write the open document to `target` as PDF.
    ///
    /// Must leave `target` either complete or absent.
    async fn save_as_pdf(&self, handle: &DocumentHandle, target: &Path) -> Result<(), JobError>;

    /// Close the document. Failures are logged by the caller, not fatal.
    async fn close(&self, handle: DocumentHandle) -> Result<(), JobError> {
        let _ = handle;
        Ok(())
    }

    /// Shut down the application instance started for the last job.
    async fn quit(&self) {}
}

/// Which backend handles which document family.
#[derive(Clone)]
pub struct BackendSet {
    word_processing: Arc<dyn DocumentBackend>,
    spreadsheet: Arc<dyn DocumentBackend>,
    presentation: Arc<dyn DocumentBackend>,
}

impl BackendSet {
    /// Route each family to its own backend.
    pub fn new(
        word_processing: Arc<dyn DocumentBackend>,
        spreadsheet: Arc<dyn DocumentBackend>,
        presentation: Arc<dyn DocumentBackend>,
    ) -> Self {
        Self {
            word_processing,
            spreadsheet,
            presentation,
        }
    }

    /// Route every family to the same backend.
    pub fn uniform(backend: Arc<dyn DocumentBackend>) -> Self {
        Self::new(Arc::clone(&backend), Arc::clone(&backend), backend)
    }

    pub fn for_family(&self, family: DocumentFamily) -> &Arc<dyn DocumentBackend> {
        match family {
            DocumentFamily::WordProcessing => &self.word_processing,
            DocumentFamily::Spreadsheet => &self.spreadsheet,
            DocumentFamily::Presentation => &self.presentation,
        }
    }
}

impl fmt::Debug for BackendSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSet")
            .field("word_processing", &self.word_processing.name())
            .field("spreadsheet", &self.spreadsheet.name())
            .field("presentation", &self.presentation.name())
            .finish()
    }
}
