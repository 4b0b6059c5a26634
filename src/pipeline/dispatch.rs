//! Dispatch: turn every staged file into one conversion job and run it.
//!
//! Jobs run strictly one after another. The backend is a stateful office
//! application and is never driven for two documents at once.
//!
//! ## Idempotency
//!
//! The only freshness signal is the existence of the target PDF. If
//! `output_dir/<stem>.pdf` exists the job is reported as skipped without
//! looking at its content or timestamps, so re-running a batch over an
//! unchanged output directory does no conversion work at all.

use crate::backend::{BackendSet, DocumentBackend};
use crate::config::BatchConfig;
use crate::error::JobError;
use crate::output::{JobOutcome, JobReport};
use crate::pipeline::classify::ConversionJob;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Convert every staged file in `staged` (already sorted) into `output_dir`.
///
/// Never fails as a whole: each job ends in exactly one [`JobOutcome`].
/// Files with an unrecognized extension produce no report.
pub async fn dispatch(
    staged: &[PathBuf],
    output_dir: &Path,
    backends: &BackendSet,
    config: &BatchConfig,
) -> Vec<JobReport> {
    let jobs: Vec<ConversionJob> = staged
        .iter()
        .filter_map(|p| {
            let job = ConversionJob::for_staged(p, output_dir);
            if job.is_none() {
                debug!(path = %p.display(), "Not a convertible staged file");
            }
            job
        })
        .collect();
    let total = jobs.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut reports = Vec::with_capacity(total);
    for (index, job) in jobs.into_iter().enumerate() {
        let name = job.staged_name();
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(index, total, &name);
        }

        let start = Instant::now();
        let outcome = run_job(&job, backends.for_family(job.family).as_ref(), config).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            JobOutcome::Converted => {
                info!(
                    file = %name,
                    family = %job.family,
                    output = %job.output_path.display(),
                    outcome = "converted",
                    duration_ms,
                    "Converted"
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_converted(index, total, &name);
                }
            }
            JobOutcome::Skipped => {
                info!(
                    file = %name,
                    family = %job.family,
                    output = %job.output_path.display(),
                    outcome = "skipped",
                    "Output already exists"
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_skipped(index, total, &name);
                }
            }
            JobOutcome::Failed { error: e } => {
                error!(
                    file = %name,
                    family = %job.family,
                    outcome = "error",
                    kind = e.kind(),
                    "Conversion failed: {e}"
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(index, total, &name, &e.to_string());
                }
            }
        }

        reports.push(JobReport {
            staged_name: name,
            family: job.family,
            output_path: job.output_path,
            outcome,
            duration_ms,
        });
    }

    reports
}

/// Idempotency check, then open → (settle) → save-as → close → quit.
async fn run_job(
    job: &ConversionJob,
    backend: &dyn DocumentBackend,
    config: &BatchConfig,
) -> JobOutcome {
    if tokio::fs::try_exists(&job.output_path).await.unwrap_or(false) {
        return JobOutcome::Skipped;
    }

    let result = convert_one(job, backend, config).await;
    backend.quit().await;

    match result {
        Ok(()) => JobOutcome::Converted,
        Err(error) => JobOutcome::Failed { error },
    }
}

async fn convert_one(
    job: &ConversionJob,
    backend: &dyn DocumentBackend,
    config: &BatchConfig,
) -> Result<(), JobError> {
    let handle = backend.open(&job.staged_path, job.family).await?;

    if job.family.needs_settle_delay() && config.settle_delay_ms > 0 {
        debug!(file = %job.staged_name(), ms = config.settle_delay_ms, "Waiting for document to settle");
        tokio::time::sleep(config.settle_delay()).await;
    }

    let saved = backend.save_as_pdf(&handle, &job.output_path).await;

    if let Err(e) = backend.close(handle).await {
        match saved {
            // The PDF is on disk; a failed close does not undo that.
            Ok(()) => warn!(file = %job.staged_name(), "Close failed after save: {e}"),
            Err(_) => debug!(file = %job.staged_name(), "Close failed after failed save: {e}"),
        }
    }

    saved
}
