//! Scratch-area lifecycle: create (or reuse) before staging, remove after
//! dispatch.
//!
//! The scratch area is a plain directory, not a [`tempfile::TempDir`]: it must
//! survive a crashed or aborted run so the next run can pick up the files
//! already staged. Removal is explicit and only happens once dispatch has
//! finished, whatever the per-file outcomes were.

use crate::error::Office2PdfError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A scratch directory owned by one pipeline run.
#[derive(Debug)]
pub struct ScratchArea {
    path: PathBuf,
    /// Names present before this run touched the directory.
    preexisting: HashSet<String>,
}

impl ScratchArea {
    /// Ensure the scratch directory exists, creating it if absent.
    ///
    /// An existing directory is reused as-is; its file names are recorded so
    /// the stager can tell resumed files from same-run collisions.
    pub async fn prepare(path: impl Into<PathBuf>) -> Result<Self, Office2PdfError> {
        let path = path.into();
        let unavailable = |source: std::io::Error| Office2PdfError::ScratchUnavailable {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&path).await.map_err(unavailable)?;

        let mut preexisting = HashSet::new();
        let mut entries = tokio::fs::read_dir(&path).await.map_err(unavailable)?;
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            if let Ok(name) = entry.file_name().into_string() {
                preexisting.insert(name);
            }
        }

        if preexisting.is_empty() {
            debug!(scratch = %path.display(), "Scratch area ready");
        } else {
            info!(
                scratch = %path.display(),
                files = preexisting.len(),
                "Reusing scratch area from a previous run"
            );
        }

        Ok(Self { path, preexisting })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `name` was already in the scratch area when it was prepared.
    pub fn was_preexisting(&self, name: &str) -> bool {
        self.preexisting.contains(name)
    }

    /// Staged files currently in the scratch area, sorted by name.
    pub async fn staged_files(&self) -> Result<Vec<PathBuf>, Office2PdfError> {
        let unavailable = |source: std::io::Error| Office2PdfError::ScratchUnavailable {
            path: self.path.clone(),
            source,
        };
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.path).await.map_err(unavailable)?;
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if is_file {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Recursively delete the scratch area and everything staged in it.
    pub async fn remove(self) -> Result<(), Office2PdfError> {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                debug!(scratch = %self.path.display(), "Scratch area removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Office2PdfError::CleanupFailed {
                path: self.path,
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepare_creates_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("staging");
        let scratch = ScratchArea::prepare(&path).await.unwrap();
        assert!(path.is_dir());
        assert!(scratch.staged_files().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn prepare_reuses_existing_files() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("staging");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("Old.docx"), b"x").unwrap();

        let scratch = ScratchArea::prepare(&path).await.unwrap();
        assert!(scratch.was_preexisting("Old.docx"));
        assert!(!scratch.was_preexisting("New.docx"));
        assert_eq!(scratch.staged_files().await.unwrap(), vec![path.join("Old.docx")]);
    }

    #[tokio::test]
    async fn staged_files_sorted_and_skip_dirs() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchArea::prepare(root.path().join("s")).await.unwrap();
        std::fs::write(scratch.path().join("b.xlsx"), b"x").unwrap();
        std::fs::write(scratch.path().join("a.docx"), b"x").unwrap();
        std::fs::create_dir(scratch.path().join("nested")).unwrap();

        let names: Vec<_> = scratch
            .staged_files()
            .await
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.docx", "b.xlsx"]);
    }

    #[tokio::test]
    async fn remove_deletes_recursively() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("staging");
        let scratch = ScratchArea::prepare(&path).await.unwrap();
        std::fs::write(path.join("a.docx"), b"x").unwrap();
        std::fs::create_dir(path.join("nested")).unwrap();
        std::fs::write(path.join("nested/b.bin"), b"x").unwrap();

        scratch.remove().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn remove_tolerates_already_gone() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("staging");
        let scratch = ScratchArea::prepare(&path).await.unwrap();
        std::fs::remove_dir(&path).unwrap();
        assert!(scratch.remove().await.is_ok());
    }
}
