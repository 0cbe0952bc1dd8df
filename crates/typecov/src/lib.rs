//! typecov library - doc and type coverage for PHP codebases
//!
//! Exposes the run pipeline for testing and embedding; the binary in
//! `main.rs` is a thin argument-parsing wrapper around [`run`].

pub mod config;
pub mod export;
pub mod output;

use config::Config;
use eyre::{Result, eyre};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use typecov_core::{CoverageReport, ScanFailure, Sources, Strictness, WalkSources};

/// Everything a finished coverage run produces.
pub struct RunOutcome {
    pub report: CoverageReport,
    pub failures: Vec<ScanFailure>,
    pub level: Strictness,
    /// Number of files that were tokenized and analyzed.
    pub analyzed_files: usize,
    /// Where the JSON export landed, when enabled.
    pub export_file: Option<PathBuf>,
}

/// Run one coverage pass over `project_root` with the given config.
///
/// Paths in the report are relative to the project root, matching how
/// they appear in the rendered output and the JSON export.
pub fn run(project_root: &Path, config: &Config) -> Result<RunOutcome> {
    let level = Strictness::parse(&config.level).ok_or_else(|| {
        eyre!(
            "Unknown strictness level `{}` (expected none, basic, or strict)",
            config.level
        )
    })?;
    let excluded: HashSet<String> = config.exclude_names.iter().cloned().collect();

    let mut roots = Vec::new();
    for path in &config.paths {
        let root = project_root.join(path);
        eyre::ensure!(root.exists(), "Scan path does not exist: {}", root.display());
        roots.push(root);
    }

    let outcome = WalkSources::new(roots)
        .ignore(config.ignore.iter().cloned())
        .scan(level, &excluded)?;

    let mut files = outcome.files;
    let mut failures = outcome.failures;
    for file in &mut files {
        if let Ok(relative) = file.path.strip_prefix(project_root) {
            file.path = relative.to_path_buf();
        }
    }
    for failure in &mut failures {
        if let Ok(relative) = failure.path.strip_prefix(project_root) {
            failure.path = relative.to_path_buf();
        }
    }

    let analyzed_files = files.len();
    let report = CoverageReport::compute(&files, level);

    let export_file = if config.export {
        let dir = project_root.join(&config.export_path);
        Some(export::export_report(&report, &failures, &dir)?)
    } else {
        None
    };

    Ok(RunOutcome {
        report,
        failures,
        level,
        analyzed_files,
        export_file,
    })
}
