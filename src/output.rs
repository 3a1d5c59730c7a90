//! The text file listing generated spreadsheet URLs.

use crate::error::Result;
use crate::upload::UploadedSheet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// File stem of the source CSV, used for titles and the output file name.
pub fn base_filename(csv_path: &Path) -> String {
    csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

pub fn default_output_path(base: &str) -> PathBuf {
    PathBuf::from(format!("{base}_sheet_urls.txt"))
}

/// One `Part N: URL` line per spreadsheet, in creation order.
pub fn format_url_list(sheets: &[UploadedSheet]) -> String {
    let mut out = String::new();
    for (i, sheet) in sheets.iter().enumerate() {
        let _ = writeln!(out, "Part {}: {}", i + 1, sheet.url);
    }
    out
}

pub fn write_url_list(path: &Path, sheets: &[UploadedSheet]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format_url_list(sheets))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::SpreadsheetId;

    fn sheet(id: &str) -> UploadedSheet {
        let id = SpreadsheetId(id.to_string());
        UploadedSheet {
            url: id.url(),
            title: String::new(),
            id,
            rows: 1,
        }
    }

    #[test]
    fn test_base_filename() {
        assert_eq!(
            base_filename(Path::new("/data/2026.01.27-report.csv")),
            "2026.01.27-report"
        );
        assert_eq!(base_filename(Path::new("plain")), "plain");
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path("report"),
            PathBuf::from("report_sheet_urls.txt")
        );
    }

    #[test]
    fn test_format_url_list() {
        let text = format_url_list(&[sheet("a"), sheet("b")]);
        assert_eq!(
            text,
            "Part 1: https://docs.google.com/spreadsheets/d/a\n\
             Part 2: https://docs.google.com/spreadsheets/d/b\n"
        );
    }

    #[test]
    fn test_empty_list_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("urls.txt");
        write_url_list(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
