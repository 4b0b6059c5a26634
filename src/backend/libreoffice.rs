//! Headless LibreOffice backend.
//!
//! Each `save_as_pdf` starts one `soffice --headless --convert-to` process and
//! waits for it to exit, so "open application → save as PDF → quit" maps onto
//! a single short-lived process per document.
//!
//! ## Why a private output directory?
//!
//! `soffice` names its output after the input file and writes it straight into
//! `--outdir`. Writing into a temporary directory created *inside* the
//! real output directory and renaming the result into place keeps the
//! target path either complete or absent (rename within one filesystem is
//! atomic), and keeps half-written PDFs out of the idempotency check.
//! The same temporary directory also hosts a throwaway user profile so a
//! desktop LibreOffice session holding the default profile lock does not
//! block the conversion.
//!
//! ## Timeouts
//!
//! `soffice` is a launcher that forks the real `soffice.bin`. On Unix the
//! launcher is started in its own process group, and a timeout kills the
//! whole group so no headless office process outlives its job. Elsewhere
//! only the launcher is killed.

use crate::backend::{DocumentBackend, DocumentHandle};
use crate::error::JobError;
use crate::pipeline::classify::DocumentFamily;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Program name looked up on `PATH` when nothing else is configured.
pub const DEFAULT_SOFFICE: &str = "soffice";

/// Environment variable overriding the `soffice` executable.
pub const SOFFICE_ENV: &str = "OFFICE2PDF_SOFFICE";

const BACKEND_NAME: &str = "libreoffice";

/// Drives a headless `soffice` binary.
#[derive(Debug, Clone)]
pub struct LibreOfficeBackend {
    program: PathBuf,
    timeout: Duration,
}

impl LibreOfficeBackend {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Use `OFFICE2PDF_SOFFICE` if set and non-empty, else `soffice` on `PATH`.
    pub fn from_env(timeout: Duration) -> Self {
        let program = std::env::var(SOFFICE_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_SOFFICE.to_string());
        Self::new(program, timeout)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn rejected(&self, handle: &DocumentHandle, detail: impl Into<String>) -> JobError {
        JobError::ConversionRejected {
            backend: BACKEND_NAME.to_string(),
            file: handle
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            detail: detail.into(),
        }
    }
}

#[async_trait]
impl DocumentBackend for LibreOfficeBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn open(&self, path: &Path, family: DocumentFamily) -> Result<DocumentHandle, JobError> {
        let handle = DocumentHandle {
            path: path.to_path_buf(),
            family,
        };
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(handle),
            Ok(_) => Err(self.rejected(&handle, "not a regular file")),
            Err(e) => Err(self.rejected(&handle, format!("cannot open: {e}"))),
        }
    }

    async fn save_as_pdf(&self, handle: &DocumentHandle, target: &Path) -> Result<(), JobError> {
        let write_failed = |detail: String| JobError::OutputWriteFailed {
            path: target.to_path_buf(),
            detail,
        };

        let out_dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let work = tempfile::Builder::new()
            .prefix(".office2pdf-")
            .tempdir_in(out_dir)
            .map_err(|e| write_failed(format!("cannot create temporary directory: {e}")))?;
        let work_dir = std::path::absolute(work.path())
            .map_err(|e| write_failed(format!("cannot resolve temporary directory: {e}")))?;
        let source = std::path::absolute(&handle.path)
            .map_err(|e| self.rejected(handle, format!("cannot resolve path: {e}")))?;

        let mut cmd = Command::new(&self.program);
        cmd.arg(format!(
            "-env:UserInstallation={}",
            file_url(&work_dir.join("profile"))
        ))
        .args(["--headless", "--norestore", "--nolockcheck", "--convert-to"])
        .arg(format!("pdf:{}", handle.family.pdf_filter()))
        .arg("--outdir")
        .arg(&work_dir)
        .arg(&source)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        debug!(
            program = %self.program.display(),
            file = %source.display(),
            filter = handle.family.pdf_filter(),
            "Running soffice"
        );

        let child = cmd.spawn().map_err(|e| JobError::BackendUnavailable {
            backend: BACKEND_NAME.to_string(),
            detail: format!("cannot start '{}': {e}", self.program.display()),
        })?;
        let pid = child.id();

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Err(_) => {
                if let Some(pid) = pid {
                    kill_process_group(pid).await;
                }
                return Err(self.rejected(
                    handle,
                    format!("timed out after {}s", self.timeout.as_secs()),
                ));
            }
            Ok(Err(e)) => return Err(self.rejected(handle, format!("soffice did not finish: {e}"))),
            Ok(Ok(output)) => output,
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(self.rejected(handle, format!("{}: {stderr}", output.status)));
        }

        let mut pdf_name = source.file_stem().unwrap_or_default().to_os_string();
        pdf_name.push(".pdf");
        let produced = work_dir.join(pdf_name);
        if !tokio::fs::try_exists(&produced).await.unwrap_or(false) {
            let detail = if stderr.is_empty() {
                "no PDF produced".to_string()
            } else {
                format!("no PDF produced: {stderr}")
            };
            return Err(self.rejected(handle, detail));
        }

        tokio::fs::rename(&produced, target)
            .await
            .map_err(|e| write_failed(e.to_string()))?;
        Ok(())
    }
}

/// SIGKILL every process in group `pgid` (the launcher's pid).
#[cfg(unix)]
async fn kill_process_group(pgid: u32) {
    let status = Command::new("kill")
        .args(["-KILL", "--", &format!("-{pgid}")])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match status {
        Ok(s) if s.success() => debug!(pgid, "Killed soffice process group"),
        Ok(s) => debug!(pgid, "kill exited with {s}; group already gone"),
        Err(e) => warn!(pgid, "Cannot kill soffice process group: {e}"),
    }
}

#[cfg(not(unix))]
async fn kill_process_group(_pgid: u32) {}

/// Render an absolute path as a `file://` URL the way `soffice` expects it.
fn file_url(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    if s.starts_with('/') {
        format!("file://{s}")
    } else {
        format!("file:///{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url() {
        assert_eq!(file_url(Path::new("/tmp/p")), "file:///tmp/p");
        assert_eq!(file_url(Path::new("C:\\work\\p")), "file:///C:/work/p");
    }

    #[tokio::test]
    async fn open_missing_file_is_rejected() {
        let backend = LibreOfficeBackend::new("soffice", Duration::from_secs(5));
        let err = backend
            .open(Path::new("/definitely/not/here.docx"), DocumentFamily::WordProcessing)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "conversion_rejected");
    }

    #[tokio::test]
    async fn missing_program_is_backend_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("a.docx");
        std::fs::write(&doc, b"not really a docx").unwrap();
        let target = dir.path().join("a.pdf");

        let backend = LibreOfficeBackend::new(
            dir.path().join("no-such-soffice-binary"),
            Duration::from_secs(5),
        );
        let handle = backend.open(&doc, DocumentFamily::WordProcessing).await.unwrap();
        let err = backend.save_as_pdf(&handle, &target).await.unwrap_err();
        assert!(matches!(err, JobError::BackendUnavailable { .. }), "got {err:?}");
        assert!(!target.exists());

        // The private work directory is cleaned up with the TempDir.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".office2pdf-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn unwritable_output_dir_is_output_write_failed() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("a.xlsx");
        std::fs::write(&doc, b"x").unwrap();
        let target = dir.path().join("missing-dir").join("a.pdf");

        let backend = LibreOfficeBackend::new("soffice", Duration::from_secs(5));
        let handle = backend.open(&doc, DocumentFamily::Spreadsheet).await.unwrap();
        let err = backend.save_as_pdf(&handle, &target).await.unwrap_err();
        assert_eq!(err.kind(), "output_write_failed");
    }

    /// True while `pid` exists and is not a zombie.
    #[cfg(target_os = "linux")]
    fn is_running(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit_once(") ")
                .map(|(_, rest)| !rest.starts_with('Z'))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timeout_kills_forked_office_process() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("slow.pptx");
        std::fs::write(&doc, b"x").unwrap();
        let pid_file = dir.path().join("child.pid");

        // Stands in for the soffice launcher: forks a long-lived worker.
        let script = dir.path().join("fake-soffice");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nsleep 30 &\necho $! > '{}'\nwait\n",
                pid_file.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let backend = LibreOfficeBackend::new(&script, Duration::from_millis(500));
        let handle = backend.open(&doc, DocumentFamily::Presentation).await.unwrap();
        let err = backend
            .save_as_pdf(&handle, &dir.path().join("slow.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "conversion_rejected");
        assert!(err.to_string().contains("timed out"), "got {err}");

        let worker: u32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let mut alive = true;
        for _ in 0..40 {
            if !is_running(worker) {
                alive = false;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!alive, "forked worker {worker} survived the timeout");
    }
}
