//! Batch conversion entry points.
//!
//! [`convert_dir`] runs the whole pipeline: check directories, prepare the
//! scratch area, stage, dispatch, tear the scratch area down. [`plan_dir`]
//! answers "what would happen" without a backend and without writing
//! anything.

use crate::backend::{BackendSet, LibreOfficeBackend};
use crate::config::BatchConfig;
use crate::error::Office2PdfError;
use crate::output::{BatchPlan, BatchReport, BatchStats, JobOutcome, PlannedJob};
use crate::pipeline::classify::ConversionJob;
use crate::pipeline::dispatch::dispatch;
use crate::pipeline::scratch::ScratchArea;
use crate::pipeline::stage::{resolve_collisions, scan_sources, stage_directory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Convert every office document in `input_dir` to PDF in `output_dir`.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(BatchReport)` once every staged file has been attempted, even if some
/// conversions failed (check `report.stats.failed`). A scratch area that
/// could not be removed is reported through `report.scratch_removed`.
///
/// # Errors
/// Returns `Err(Office2PdfError)` only for fatal errors:
/// - Input or output directory missing
/// - Scratch area cannot be created
/// - A source cannot be staged (the scratch area is then left in place so
///   the next run resumes)
pub async fn convert_dir(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<BatchReport, Office2PdfError> {
    let total_start = Instant::now();
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    info!(
        input = %input_dir.display(),
        output = %output_dir.display(),
        "Starting batch conversion"
    );

    // ── Step 1: Check directories ────────────────────────────────────────
    check_dirs(input_dir, output_dir).await?;

    // ── Step 2: Resolve backends ─────────────────────────────────────────
    let backends = resolve_backends(config);

    // ── Step 3: Prepare scratch area ─────────────────────────────────────
    let scratch = ScratchArea::prepare(&config.scratch_dir).await?;

    // ── Step 4: Stage ────────────────────────────────────────────────────
    let summary = match stage_directory(input_dir, &scratch).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(
                scratch = %scratch.path().display(),
                "Staging aborted; scratch area kept for the next run"
            );
            return Err(e);
        }
    };

    // ── Step 5: Dispatch ─────────────────────────────────────────────────
    let staged = scratch.staged_files().await?;
    let jobs = dispatch(&staged, output_dir, &backends, config).await;

    // ── Step 6: Tear down scratch area ───────────────────────────────────
    let scratch_removed = match scratch.remove().await {
        Ok(()) => true,
        Err(e) => {
            warn!("{e}");
            false
        }
    };

    // ── Step 7: Stats ────────────────────────────────────────────────────
    let mut stats = BatchStats {
        staged: summary.copied.len(),
        reused: summary.reused.len(),
        collisions: summary.collisions.len(),
        ..Default::default()
    };
    for job in &jobs {
        match job.outcome {
            JobOutcome::Converted => stats.converted += 1,
            JobOutcome::Skipped => stats.skipped += 1,
            JobOutcome::Failed { .. } => stats.failed += 1,
        }
    }
    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

    info!(
        converted = stats.converted,
        skipped = stats.skipped,
        failed = stats.failed,
        duration_ms = stats.total_duration_ms,
        "Batch complete"
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(&stats);
    }

    Ok(BatchReport {
        jobs,
        collisions: summary.collisions,
        stats,
        scratch_removed,
    })
}

/// Synchronous wrapper around [`convert_dir`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_dir_sync(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<BatchReport, Office2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Office2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_dir(input_dir, output_dir, config))
}

/// Describe what [`convert_dir`] would do, without staging or converting.
///
/// Does not require a backend.
pub async fn plan_dir(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
) -> Result<BatchPlan, Office2PdfError> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    check_dirs(input_dir, output_dir).await?;

    let (winners, collisions) = resolve_collisions(scan_sources(input_dir).await?);

    let mut jobs = Vec::with_capacity(winners.len());
    for source in winners {
        let Some(job) = ConversionJob::for_staged(Path::new(&source.staged_name), output_dir)
        else {
            continue;
        };
        let would_skip = tokio::fs::try_exists(&job.output_path).await.unwrap_or(false);
        jobs.push(PlannedJob {
            source: source.path,
            staged_name: source.staged_name,
            family: job.family,
            output_path: job.output_path,
            would_skip,
        });
    }

    Ok(BatchPlan { jobs, collisions })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// The input directory must exist; the output directory must already exist
/// and is never created here.
async fn check_dirs(input_dir: &Path, output_dir: &Path) -> Result<(), Office2PdfError> {
    if !is_dir(input_dir).await {
        return Err(Office2PdfError::InputDirNotFound {
            path: input_dir.to_path_buf(),
        });
    }
    if !is_dir(output_dir).await {
        return Err(Office2PdfError::OutputDirNotFound {
            path: output_dir.to_path_buf(),
        });
    }
    Ok(())
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Resolve the backends, from most-specific to least-specific.
///
/// 1. **Pre-built set** (`config.backends`), used as-is; how tests and
///    embedders plug in their own engines.
/// 2. **Explicit executable** (`config.soffice_path`).
/// 3. **Environment** (`OFFICE2PDF_SOFFICE`), else `soffice` on `PATH`.
fn resolve_backends(config: &BatchConfig) -> BackendSet {
    if let Some(ref set) = config.backends {
        return set.clone();
    }

    let backend = match config.soffice_path {
        Some(ref path) => LibreOfficeBackend::new(path, config.backend_timeout()),
        None => LibreOfficeBackend::from_env(config.backend_timeout()),
    };
    info!(program = %backend.program().display(), "Using LibreOffice backend");
    BackendSet::uniform(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_libreoffice_backend() {
        let config = BatchConfig::builder()
            .soffice_path("/opt/lo/program/soffice")
            .build()
            .unwrap();
        let set = resolve_backends(&config);
        assert!(format!("{set:?}").contains("libreoffice"));
    }

    #[tokio::test]
    async fn missing_output_dir_is_fatal() {
        let input = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let err = check_dirs(input.path(), &root.path().join("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, Office2PdfError::OutputDirNotFound { .. }));
    }

    #[tokio::test]
    async fn missing_input_dir_is_fatal() {
        let out = tempfile::tempdir().unwrap();
        let err = check_dirs(Path::new("/definitely/not/here"), out.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Office2PdfError::InputDirNotFound { .. }));
    }
}
