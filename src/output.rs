//! Result types returned by a batch run.

use crate::error::JobError;
use crate::pipeline::classify::DocumentFamily;
use crate::pipeline::stage::Collision;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What happened to one staged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    /// The backend wrote the PDF.
    Converted,
    /// The PDF already existed; nothing was done.
    Skipped,
    /// The conversion failed; the batch went on.
    Failed { error: JobError },
}

impl JobOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::Converted => "converted",
            JobOutcome::Skipped => "skipped",
            JobOutcome::Failed { .. } => "error",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failed { .. })
    }
}

/// Per-file report: one per staged file with a recognized extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub staged_name: String,
    pub family: DocumentFamily,
    pub output_path: PathBuf,
    pub outcome: JobOutcome,
    pub duration_ms: u64,
}

/// Aggregate counters for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Sources copied into the scratch area by this run.
    pub staged: usize,
    /// Staged files reused from an earlier, interrupted run.
    pub reused: usize,
    /// Sources dropped because their sanitised name was already taken.
    pub collisions: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
}

impl BatchStats {
    /// Number of jobs that produced an outcome.
    pub fn jobs(&self) -> usize {
        self.converted + self.skipped + self.failed
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
    pub collisions: Vec<Collision>,
    pub stats: BatchStats,
    /// False when the scratch area could not be removed after dispatch.
    pub scratch_removed: bool,
}

impl BatchReport {
    /// Reports whose outcome is [`JobOutcome::Failed`].
    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.jobs.iter().filter(|j| j.outcome.is_failure())
    }
}

/// A dry-run entry from [`crate::convert::plan_dir`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedJob {
    pub source: PathBuf,
    pub staged_name: String,
    pub family: DocumentFamily,
    pub output_path: PathBuf,
    /// True when the PDF already exists and the job would be skipped.
    pub would_skip: bool,
}

/// Dry-run result: what a batch would do, without touching any file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchPlan {
    pub jobs: Vec<PlannedJob>,
    pub collisions: Vec<Collision>,
}
