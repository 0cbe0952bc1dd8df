//! Coverage aggregation over per-file declaration records

use crate::analyzer::{Declaration, Strictness};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Declarations extracted from a single source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub declarations: Vec<Declaration>,
}

/// One uncovered declaration, ready for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// 1-indexed source line, when the token stream carried line info.
    pub line: Option<usize>,
    pub name: String,
    pub missing_doc: bool,
    pub missing_type: bool,
}

/// Aggregated coverage for a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    /// Named declarations considered (closures never count).
    pub total: usize,
    /// Declarations meeting the configured strictness.
    pub covered: usize,
    /// Uncovered declarations grouped by file. The map is ordered, so
    /// iteration is already sorted by path.
    pub issues: BTreeMap<PathBuf, Vec<Issue>>,
}

impl CoverageReport {
    /// Compute coverage from per-file analyses at the given level.
    ///
    /// At [`Strictness::None`] nothing is counted and the report always
    /// passes. At [`Strictness::Basic`] only missing documentation is
    /// reported; return types only matter at [`Strictness::Strict`].
    pub fn compute(files: &[FileAnalysis], level: Strictness) -> Self {
        let mut report = CoverageReport::default();
        if level == Strictness::None {
            return report;
        }

        for file in files {
            for decl in &file.declarations {
                if decl.is_anonymous {
                    continue;
                }
                report.total += 1;
                if decl.is_covered(level) {
                    report.covered += 1;
                } else {
                    report
                        .issues
                        .entry(file.path.clone())
                        .or_default()
                        .push(Issue {
                            line: decl.line,
                            name: decl
                                .name
                                .clone()
                                .unwrap_or_else(|| "{unknown}".to_string()),
                            missing_doc: !decl.has_doc,
                            missing_type: level == Strictness::Strict && !decl.has_return_type,
                        });
                }
            }
        }

        report
    }

    /// Coverage percentage (0.0 - 100.0), rounded to two decimals.
    /// An empty run counts as fully covered.
    pub fn coverage_percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        let raw = (self.covered as f64 / self.total as f64) * 100.0;
        (raw * 100.0).round() / 100.0
    }

    /// Whether the run clears the configured minimum percentage.
    pub fn is_passing(&self, min_percent: f64) -> bool {
        self.coverage_percent() >= min_percent
    }

    /// Number of uncovered declarations across all files.
    pub fn issue_count(&self) -> usize {
        self.issues.values().map(|v| v.len()).sum()
    }
}
