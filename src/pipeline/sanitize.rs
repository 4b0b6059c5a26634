//! Filename sanitisation: map an arbitrary office file name to a name the
//! conversion backend can always open.
//!
//! ## Why sanitise at all?
//!
//! Office automation backends choke on names containing brackets, quotes,
//! ampersands, non-ASCII letters or leading/trailing spaces; some of those
//! are also illegal on one filesystem or another. Rather than escaping for
//! each backend, every maximal run of characters outside `[A-Za-z0-9]` is
//! collapsed to a single `_`. The extension is kept but lower-cased.
//!
//! The rule is lossy by nature: `A&B.xlsx` and `A_B.xlsx` both become
//! `A_B.xlsx`. Callers detect that collision, they do not resolve it.

use crate::pipeline::classify::DocumentFamily;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Extensions (lower-case, no dot) the pipeline knows how to convert.
///
/// Listing only; recognition goes through [`DocumentFamily::from_extension`].
pub const RECOGNIZED_EXTENSIONS: &[&str] = &["doc", "docx", "xls", "xlsx", "ppt", "pptx"];

/// Character substituted for every run of unsafe characters.
pub const SEPARATOR: char = '_';

static RE_UNSAFE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Check if a file extension is recognized (case-insensitive, no dot).
pub fn is_recognized_extension(ext: &str) -> bool {
    DocumentFamily::from_extension(ext).is_some()
}

/// Collapse every maximal run of non-alphanumeric characters into [`SEPARATOR`].
///
/// Idempotent: `sanitize_stem(&sanitize_stem(s)) == sanitize_stem(s)`.
pub fn sanitize_stem(stem: &str) -> String {
    RE_UNSAFE_RUN
        .replace_all(stem, SEPARATOR.to_string().as_str())
        .into_owned()
}

/// Compute the staged file name for `path`.
///
/// Returns `None` when the extension is not one of
/// [`RECOGNIZED_EXTENSIONS`]. A stem that is not valid UTF-8 is read lossily;
/// the replacement characters are unsafe and collapse like any other run.
pub fn sanitized_file_name(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !is_recognized_extension(ext) {
        return None;
    }
    let stem = path.file_stem()?.to_string_lossy();
    Some(format!("{}.{}", sanitize_stem(&stem), ext.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_final() {
        assert_eq!(sanitize_stem("Report (Final)"), "Report_Final_");
        assert_eq!(
            sanitized_file_name(Path::new("in/Report (Final).docx")).as_deref(),
            Some("Report_Final_.docx")
        );
    }

    #[test]
    fn test_runs_collapse_to_one_separator() {
        assert_eq!(sanitize_stem("a -- b"), "a_b");
        assert_eq!(sanitize_stem("  lead"), "_lead");
        assert_eq!(sanitize_stem("A&B"), "A_B");
        assert_eq!(sanitize_stem("A_B"), "A_B");
        assert_eq!(sanitize_stem("A__B"), "A_B");
    }

    #[test]
    fn test_non_ascii_is_unsafe() {
        assert_eq!(sanitize_stem("Résumé 2024"), "R_sum_2024");
        assert_eq!(sanitize_stem("报告"), "_");
    }

    #[test]
    fn test_idempotent() {
        for raw in [
            "Report (Final)",
            "A&B",
            "__x__",
            "plain",
            "Q3 — budget [draft] v2",
            "",
            "日本語 file",
        ] {
            let once = sanitize_stem(raw);
            assert_eq!(sanitize_stem(&once), once, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_extension_lowercased() {
        assert_eq!(
            sanitized_file_name(Path::new("Budget.XLSX")).as_deref(),
            Some("Budget.xlsx")
        );
        assert_eq!(
            sanitized_file_name(Path::new("Slides.PpT")).as_deref(),
            Some("Slides.ppt")
        );
    }

    #[test]
    fn test_unrecognized_extensions() {
        assert_eq!(sanitized_file_name(Path::new("notes.txt")), None);
        assert_eq!(sanitized_file_name(Path::new("archive.docx.zip")), None);
        assert_eq!(sanitized_file_name(Path::new("README")), None);
        assert_eq!(sanitized_file_name(Path::new(".docx")), None);
    }

    #[test]
    fn test_is_recognized_extension() {
        for ext in ["doc", "DOCX", "Xls", "xlsx", "PPT", "pptx"] {
            assert!(is_recognized_extension(ext), "{ext}");
        }
        for ext in ["pdf", "odt", "", "docm"] {
            assert!(!is_recognized_extension(ext), "{ext}");
        }
    }

    #[test]
    fn test_extension_list_matches_classification() {
        for ext in RECOGNIZED_EXTENSIONS {
            assert!(DocumentFamily::from_extension(ext).is_some(), "{ext}");
        }
        let per_family: usize = DocumentFamily::ALL
            .iter()
            .map(|f| {
                RECOGNIZED_EXTENSIONS
                    .iter()
                    .filter(|e| DocumentFamily::from_extension(e) == Some(*f))
                    .count()
            })
            .sum();
        assert_eq!(per_family, RECOGNIZED_EXTENSIONS.len());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_stem_is_sanitised() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"in/caf\xe9 menu.docx"));
        let name = sanitized_file_name(path).unwrap();
        assert_eq!(name, "caf_menu.docx");
        assert!(name.is_ascii());
        assert_eq!(sanitize_stem("caf_menu"), "caf_menu");
    }
}
