//! Error types for the edgequake-office2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Office2PdfError`] — **Fatal**: the batch cannot proceed at all
//!   (missing input or output directory, a source that cannot be staged,
//!   a scratch area that cannot be created). Returned as
//!   `Err(Office2PdfError)` from the top-level `convert_dir*` functions.
//!
//! * [`JobError`] — **Non-fatal**: a single document failed (backend not
//!   installed, corrupt file, unwritable target) but every other document in
//!   the batch is unaffected. Stored inside [`crate::output::JobOutcome`] so
//!   callers can inspect partial success rather than losing the whole batch
//!   to one bad file.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-office2pdf library.
///
/// Per-file failures use [`JobError`] and are stored in
/// [`crate::output::JobReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Office2PdfError {
    // ── Input/output directories ──────────────────────────────────────────
    /// Input directory does not exist or is not a directory.
    #[error("Input directory not found: '{path}'\nCheck the path exists and is a directory.")]
    InputDirNotFound { path: PathBuf },

    /// Output directory does not exist. It is never created implicitly.
    #[error("Output directory not found: '{path}'\nCreate it first: mkdir -p {path:?}")]
    OutputDirNotFound { path: PathBuf },

    // ── Staging ───────────────────────────────────────────────────────────
    /// A source document could not be copied into the scratch area.
    #[error("Failed to stage '{path}': {source}")]
    StagingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scratch area could not be created or listed.
    #[error("Scratch area '{path}' is unavailable: {source}")]
    ScratchUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scratch area could not be removed after dispatch.
    ///
    /// Logged and recorded in [`crate::output::BatchReport::scratch_removed`];
    /// never returned from `convert_dir`.
    #[error("Failed to remove scratch area '{path}': {source}\nDelete it manually before the next run if needed.")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single conversion job.
///
/// Stored in [`crate::output::JobOutcome::Failed`]. The batch always moves
/// on to the next staged file.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum JobError {
    /// The office application could not be started or connected to.
    #[error("{backend} backend unavailable: {detail}")]
    BackendUnavailable { backend: String, detail: String },

    /// The backend reported a failure while opening, saving or closing.
    #[error("{backend} rejected '{file}': {detail}")]
    ConversionRejected {
        backend: String,
        file: String,
        detail: String,
    },

    /// The PDF could not be written to its target path.
    #[error("Failed to write '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },
}

impl JobError {
    /// Short machine-friendly label used in structured log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::BackendUnavailable { .. } => "backend_unavailable",
            JobError::ConversionRejected { .. } => "conversion_rejected",
            JobError::OutputWriteFailed { .. } => "output_write_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_not_found_display() {
        let e = Office2PdfError::OutputDirNotFound {
            path: PathBuf::from("/tmp/pdfs"),
        };
        let msg = e.to_string();
        assert!(msg.contains("/tmp/pdfs"), "got: {msg}");
    }

    #[test]
    fn staging_failed_keeps_source() {
        use std::error::Error as _;
        let e = Office2PdfError::StagingFailed {
            path: PathBuf::from("in/Report.docx"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("Report.docx"));
        assert!(e.source().is_some());
    }

    #[test]
    fn backend_unavailable_display() {
        let e = JobError::BackendUnavailable {
            backend: "libreoffice".into(),
            detail: "soffice: not found".into(),
        };
        assert!(e.to_string().contains("libreoffice"));
        assert!(e.to_string().contains("not found"));
        assert_eq!(e.kind(), "backend_unavailable");
    }

    #[test]
    fn conversion_rejected_display() {
        let e = JobError::ConversionRejected {
            backend: "libreoffice".into(),
            file: "Deck.pptx".into(),
            detail: "exit status 1".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Deck.pptx"));
        assert!(msg.contains("exit status 1"));
    }

    #[test]
    fn job_error_serialises() {
        let e = JobError::OutputWriteFailed {
            path: PathBuf::from("out/A.pdf"),
            detail: "read-only file system".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("OutputWriteFailed"));
        let back: JobError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
