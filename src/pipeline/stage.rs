//! Staging: copy every recognized source document into the scratch area under
//! its sanitised name.
//!
//! Sources are visited in byte-wise file-name order so the outcome of a
//! sanitisation collision does not depend on directory iteration order: the
//! first source in that order is staged, later sources mapping to the same
//! name are reported and left alone. A staged name that was already present
//! when the scratch area was prepared is reused without copying, which lets
//! an interrupted run resume.

use crate::error::Office2PdfError;
use crate::pipeline::sanitize::sanitized_file_name;
use crate::pipeline::scratch::ScratchArea;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A recognized document found in the input directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Original file name, possibly containing unsafe characters.
    pub raw_name: String,
    /// Name the file gets in the scratch area.
    pub staged_name: String,
}

/// Two or more sources that sanitise to the same staged name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub staged_name: String,
    /// The source that won (first in name order).
    pub kept: PathBuf,
    /// The source that was not staged.
    pub dropped: PathBuf,
}

/// Result of [`stage_directory`].
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StageSummary {
    /// Sources copied into the scratch area by this run.
    pub copied: Vec<SourceFile>,
    /// Sources whose staged name was already present from a previous run.
    pub reused: Vec<SourceFile>,
    pub collisions: Vec<Collision>,
}

impl StageSummary {
    /// Number of distinct staged names this run accounts for.
    pub fn staged_count(&self) -> usize {
        self.copied.len() + self.reused.len()
    }
}

/// List recognized documents in `input_dir`, sorted by file name.
///
/// Subdirectories and files with other extensions are skipped. The listing
/// is not recursive.
pub async fn scan_sources(input_dir: &Path) -> Result<Vec<SourceFile>, Office2PdfError> {
    if !tokio::fs::metadata(input_dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        return Err(Office2PdfError::InputDirNotFound {
            path: input_dir.to_path_buf(),
        });
    }

    let unreadable = |source: std::io::Error| Office2PdfError::StagingFailed {
        path: input_dir.to_path_buf(),
        source,
    };

    let mut sources = Vec::new();
    let mut entries = tokio::fs::read_dir(input_dir).await.map_err(unreadable)?;
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            debug!(path = %path.display(), "Ignoring non-file entry");
            continue;
        }
        let Some(staged_name) = sanitized_file_name(&path) else {
            debug!(path = %path.display(), "Ignoring unrecognized file type");
            continue;
        };
        sources.push(SourceFile {
            raw_name: entry.file_name().to_string_lossy().into_owned(),
            path,
            staged_name,
        });
    }

    sources.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(sources)
}

/// Split sources into winners and same-run collisions.
///
/// Pure: no filesystem access. `sources` must already be in name order.
pub fn resolve_collisions(sources: Vec<SourceFile>) -> (Vec<SourceFile>, Vec<Collision>) {
    let mut winners: Vec<SourceFile> = Vec::with_capacity(sources.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut collisions = Vec::new();

    for source in sources {
        if let Some(&i) = index.get(&source.staged_name) {
            collisions.push(Collision {
                staged_name: source.staged_name.clone(),
                kept: winners[i].path.clone(),
                dropped: source.path,
            });
            continue;
        }
        index.insert(source.staged_name.clone(), winners.len());
        winners.push(source);
    }

    (winners, collisions)
}

/// Populate `scratch` from `input_dir`.
///
/// # Errors
/// Any copy failure is fatal: no job can run against a half-populated
/// scratch area.
pub async fn stage_directory(
    input_dir: &Path,
    scratch: &ScratchArea,
) -> Result<StageSummary, Office2PdfError> {
    let sources = scan_sources(input_dir).await?;
    let (winners, collisions) = resolve_collisions(sources);

    for c in &collisions {
        warn!(
            staged = %c.staged_name,
            kept = %c.kept.display(),
            dropped = %c.dropped.display(),
            "Filename collision after sanitisation; dropped source will not be converted"
        );
    }

    let mut summary = StageSummary {
        collisions,
        ..Default::default()
    };

    for source in winners {
        let target = scratch.path().join(&source.staged_name);
        let present = tokio::fs::try_exists(&target).await.unwrap_or(false);

        if present {
            if !scratch.was_preexisting(&source.staged_name) {
                warn!(staged = %source.staged_name, "Staged file appeared during this run; reusing it");
            }
            debug!(file = %source.raw_name, staged = %source.staged_name, "Already staged");
            summary.reused.push(source);
            continue;
        }

        tokio::fs::copy(&source.path, &target)
            .await
            .map_err(|e| Office2PdfError::StagingFailed {
                path: source.path.clone(),
                source: e,
            })?;
        debug!(file = %source.raw_name, staged = %source.staged_name, "Staged");
        summary.copied.push(source);
    }

    info!(
        copied = summary.copied.len(),
        reused = summary.reused.len(),
        collisions = summary.collisions.len(),
        "Staging complete"
    );
    Ok(summary)
}
