//! Saving rendered reports to disk.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ReportError;
use crate::record::{fields, RawRecord};

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Filename slug: runs of non-alphanumerics become `_`.
fn slug(text: &str) -> String {
    NON_SLUG.replace_all(text.trim(), "_").trim_matches('_').to_string()
}

/// `client_report_<name>_<YYYYMMDD>.pdf`. Falls back to the client id, then
/// to `unknown`, when the name yields an empty slug.
pub fn report_filename(record: &RawRecord, date: NaiveDate) -> String {
    let name = [fields::CLIENT_NAME, fields::CLIENT_ID]
        .iter()
        .map(|f| record.get(f))
        .filter(|v| !v.is_missing())
        .map(|v| slug(&crate::normalize::safe_string(v)))
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    format!("client_report_{}_{}.pdf", name, date.format("%Y%m%d"))
}

/// Writes PDF bytes into `dir`, creating it if needed.
pub fn export_pdf_to_file(pdf_bytes: &[u8], filename: &str, dir: &Path) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, pdf_bytes)?;
    tracing::info!(path = %path.display(), size_bytes = pdf_bytes.len(), "Report exported");
    Ok(path)
}
