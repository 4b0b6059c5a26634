//! Document-family classification and conversion-job construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The office application family that handles a given document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFamily {
    /// `.doc`, `.docx`
    WordProcessing,
    /// `.xls`, `.xlsx`
    Spreadsheet,
    /// `.ppt`, `.pptx`
    Presentation,
}

impl DocumentFamily {
    /// All families, in dispatch-table order.
    pub const ALL: [DocumentFamily; 3] = [
        DocumentFamily::WordProcessing,
        DocumentFamily::Spreadsheet,
        DocumentFamily::Presentation,
    ];

    /// Classify a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "doc" | "docx" => Some(DocumentFamily::WordProcessing),
            "xls" | "xlsx" => Some(DocumentFamily::Spreadsheet),
            "ppt" | "pptx" => Some(DocumentFamily::Presentation),
            _ => None,
        }
    }

    /// Classify a path by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// The backend's PDF export selector for this family.
    ///
    /// Opaque to the pipeline; each family's application has its own.
    pub fn pdf_filter(self) -> &'static str {
        match self {
            DocumentFamily::WordProcessing => "writer_pdf_Export",
            DocumentFamily::Spreadsheet => "calc_pdf_Export",
            DocumentFamily::Presentation => "impress_pdf_Export",
        }
    }

    /// Presentations need a settling pause between open and save-as.
    pub fn needs_settle_delay(self) -> bool {
        matches!(self, DocumentFamily::Presentation)
    }
}

impl fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentFamily::WordProcessing => "word-processing",
            DocumentFamily::Spreadsheet => "spreadsheet",
            DocumentFamily::Presentation => "presentation",
        })
    }
}

/// One staged file's conversion, built at dispatch time and consumed at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub family: DocumentFamily,
    /// The sanitised copy inside the scratch area.
    pub staged_path: PathBuf,
    /// `output_dir/<staged stem>.pdf`
    pub output_path: PathBuf,
}

impl ConversionJob {
    /// Build the job for a staged file, or `None` if its extension is not
    /// one of the recognized office formats.
    pub fn for_staged(staged_path: &Path, output_dir: &Path) -> Option<Self> {
        let family = DocumentFamily::from_path(staged_path)?;
        let mut pdf_name = staged_path.file_stem()?.to_os_string();
        pdf_name.push(".pdf");
        let output_path = output_dir.join(pdf_name);
        Some(Self {
            family,
            staged_path: staged_path.to_path_buf(),
            output_path,
        })
    }

    /// File name of the staged copy, for logs and reports.
    pub fn staged_name(&self) -> String {
        self.staged_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_recognized_extension_has_one_family() {
        use crate::pipeline::sanitize::RECOGNIZED_EXTENSIONS;
        for ext in RECOGNIZED_EXTENSIONS {
            assert!(DocumentFamily::from_extension(ext).is_some(), "{ext}");
            assert_eq!(
                DocumentFamily::from_extension(&ext.to_uppercase()),
                DocumentFamily::from_extension(ext)
            );
        }
        assert_eq!(DocumentFamily::from_extension("pdf"), None);
        assert_eq!(DocumentFamily::from_extension("odp"), None);
    }

    #[test]
    fn test_family_mapping() {
        assert_eq!(
            DocumentFamily::from_extension("docx"),
            Some(DocumentFamily::WordProcessing)
        );
        assert_eq!(
            DocumentFamily::from_extension("XLS"),
            Some(DocumentFamily::Spreadsheet)
        );
        assert_eq!(
            DocumentFamily::from_extension("pptx"),
            Some(DocumentFamily::Presentation)
        );
    }

    #[test]
    fn test_only_presentations_settle() {
        assert!(DocumentFamily::Presentation.needs_settle_delay());
        assert!(!DocumentFamily::WordProcessing.needs_settle_delay());
        assert!(!DocumentFamily::Spreadsheet.needs_settle_delay());
    }

    #[test]
    fn test_job_output_path() {
        let job = ConversionJob::for_staged(
            Path::new("staging/Report_Final_.docx"),
            Path::new("/out"),
        )
        .unwrap();
        assert_eq!(job.family, DocumentFamily::WordProcessing);
        assert_eq!(job.output_path, PathBuf::from("/out/Report_Final_.pdf"));
        assert_eq!(job.staged_name(), "Report_Final_.docx");
    }

    #[test]
    fn test_job_for_unrecognized_is_none() {
        assert!(ConversionJob::for_staged(Path::new("staging/x.txt"), Path::new("/out")).is_none());
    }

    #[test]
    fn test_display_and_serde_agree() {
        for family in DocumentFamily::ALL {
            let json = serde_json::to_string(&family).unwrap();
            assert_eq!(json, format!("\"{family}\""));
        }
    }
}
