//! # edgequake-office2pdf
//!
//! Batch-convert Word, Excel and PowerPoint documents to PDF by driving an
//! office application (headless LibreOffice by default).
//!
//! ## Why a pipeline around the office suite?
//!
//! Office applications are stateful, slow to start and picky about file
//! names. Pointing one at a directory of user files and hoping for the best
//! fails on the first `Report (Final) [v2].docx` and redoes hours of work
//! every time the batch is restarted. This crate wraps the application in a
//! small pipeline that sanitises names, skips documents whose PDF already
//! exists, isolates per-file failures and cleans up after itself.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input dir
//!  │
//!  ├─ 1. Check    input and output directories exist
//!  ├─ 2. Scratch  create (or reuse) the staging directory
//!  ├─ 3. Stage    copy .doc/.docx/.xls/.xlsx/.ppt/.pptx under sanitised names
//!  ├─ 4. Dispatch per file: skip if PDF exists, else open → save-as-PDF → close
//!  └─ 5. Cleanup  remove the staging directory
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_office2pdf::{convert_dir, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::default();
//!     let report = convert_dir("./documents", "./pdfs", &config).await?;
//!     eprintln!(
//!         "{} converted, {} skipped, {} failed",
//!         report.stats.converted, report.stats.skipped, report.stats.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `office2pdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Custom backends
//!
//! Implement [`DocumentBackend`] and pass a [`BackendSet`] through
//! [`BatchConfigBuilder::backends`] to route documents to anything other than
//! a local `soffice`.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{BackendSet, DocumentBackend, DocumentHandle, LibreOfficeBackend};
pub use config::{BatchConfig, BatchConfigBuilder};
pub use convert::{convert_dir, convert_dir_sync, plan_dir};
pub use error::{JobError, Office2PdfError};
pub use output::{BatchPlan, BatchReport, BatchStats, JobOutcome, JobReport, PlannedJob};
pub use pipeline::classify::{ConversionJob, DocumentFamily};
pub use pipeline::sanitize::{sanitize_stem, sanitized_file_name};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
