//! JSON export of coverage runs

use crate::output::{OutputFormat, render_report};
use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

/// Write the report as pretty JSON to `dir`, under a timestamped filename
/// (`typecov-YYYYMMDD-HHMMSS.json`). Creates the directory if needed and
/// returns the written path.
pub fn export_report(
    report: &typecov_core::CoverageReport,
    failures: &[typecov_core::ScanFailure],
    dir: &Path,
) -> Result<PathBuf> {
    let stamp_format = format_description!("[year][month][day]-[hour][minute][second]");
    let stamp = OffsetDateTime::now_utc()
        .format(&stamp_format)
        .wrap_err("Failed to format export timestamp")?;

    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create export directory {}", dir.display()))?;

    let path = dir.join(format!("typecov-{stamp}.json"));
    let json = render_report(report, failures, OutputFormat::Json);
    std::fs::write(&path, json)
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
