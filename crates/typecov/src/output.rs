//! Output formatting for coverage reports

use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;
use typecov_core::{CoverageReport, Issue, ScanFailure};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a coverage report in the specified format.
pub fn render_report(
    report: &CoverageReport,
    failures: &[ScanFailure],
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => render_text(report, failures),
        OutputFormat::Json => render_json(report, failures),
    }
}

/// What an uncovered declaration is missing, in report wording.
fn issue_message(issue: &Issue) -> String {
    let mut parts = Vec::new();
    if issue.missing_doc {
        parts.push("missing doc comment");
    }
    if issue.missing_type {
        parts.push("missing return type");
    }
    format!("{} is {}", issue.name, parts.join(" and "))
}

fn render_text(report: &CoverageReport, failures: &[ScanFailure]) -> String {
    let mut output = String::new();
    output.push('\n');

    for (path, issues) in &report.issues {
        output.push_str(&format!("{}\n", path.display().to_string().cyan().bold()));
        for issue in issues {
            let line = issue
                .line
                .map(|l| format!(":{l}"))
                .unwrap_or_else(|| ":?".to_string());
            output.push_str(&format!(
                "  {:>5}  {}\n",
                line.dimmed(),
                issue_message(issue)
            ));
        }
        output.push('\n');
    }

    if !report.issues.is_empty() {
        output.push_str(&format!(
            "{}\n\n",
            "Add doc blocks and return types to improve coverage.".dimmed()
        ));
    }

    if !failures.is_empty() {
        output.push_str(&format!(
            "{} Skipped {} file(s) with tokenization failures:\n",
            "!".yellow().bold(),
            failures.len()
        ));
        for failure in failures {
            output.push_str(&format!(
                "  {} {}: {}\n",
                "-".yellow(),
                failure.path.display(),
                failure.error
            ));
        }
        output.push('\n');
    }

    let percent = report.coverage_percent();
    let percent_str = format!("{percent}%");
    let color_percent = if percent >= 80.0 {
        percent_str.green().to_string()
    } else if percent >= 50.0 {
        percent_str.yellow().to_string()
    } else {
        percent_str.red().to_string()
    };

    output.push_str(&format!(
        "{} / {} functions are documented and typed\n",
        report.covered, report.total
    ));
    output.push_str(&format!("Coverage: {color_percent}\n"));

    output
}

#[derive(Serialize)]
struct JsonReport {
    total: usize,
    covered: usize,
    coverage_percent: f64,
    issues: Vec<JsonIssue>,
    skipped: Vec<JsonSkipped>,
}

#[derive(Serialize)]
struct JsonIssue {
    file: String,
    line: Option<usize>,
    function: String,
    message: String,
}

#[derive(Serialize)]
struct JsonSkipped {
    file: String,
    error: String,
}

fn render_json(report: &CoverageReport, failures: &[ScanFailure]) -> String {
    let issues = report
        .issues
        .iter()
        .flat_map(|(path, issues)| {
            issues.iter().map(|issue| JsonIssue {
                file: display_path(path),
                line: issue.line,
                function: issue.name.clone(),
                message: issue_message(issue),
            })
        })
        .collect();

    let json_report = JsonReport {
        total: report.total,
        covered: report.covered,
        coverage_percent: report.coverage_percent(),
        issues,
        skipped: failures
            .iter()
            .map(|f| JsonSkipped {
                file: display_path(&f.path),
                error: f.error.to_string(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&json_report).expect("JSON serialization failed")
}

fn display_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use typecov_core::{CoverageReport, MemorySources, Sources, Strictness};

    fn sample_report() -> (CoverageReport, Vec<ScanFailure>) {
        let outcome = MemorySources::new()
            .add(
                "app/Sample.php",
                "<?php\n/** D */\nfunction a(): int {}\nfunction b() {}\n",
            )
            .scan(Strictness::Strict, &HashSet::new())
            .unwrap();
        let report = CoverageReport::compute(&outcome.files, Strictness::Strict);
        (report, outcome.failures)
    }

    #[test]
    fn text_report_groups_issues_under_the_file() {
        let (report, failures) = sample_report();
        let text = render_text(&report, &failures);
        assert!(text.contains("app/Sample.php"));
        assert!(text.contains("b is missing doc comment and missing return type"));
        assert!(text.contains("1 / 2 functions are documented and typed"));
        assert!(text.contains("Coverage:"));
    }

    #[test]
    fn json_report_round_trips() {
        let (report, failures) = sample_report();
        let json = render_json(&report, &failures);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["covered"], 1);
        assert_eq!(value["coverage_percent"], 50.0);
        assert_eq!(value["issues"][0]["function"], "b");
        assert_eq!(value["issues"][0]["line"], 4);
    }

    #[test]
    fn skipped_files_are_listed() {
        let failures = vec![ScanFailure {
            path: PathBuf::from("app/Broken.php"),
            error: typecov_core::TokenizationError::UnterminatedString { line: 3 },
        }];
        let text = render_text(&CoverageReport::default(), &failures);
        assert!(text.contains("app/Broken.php"));
        assert!(text.contains("unterminated string literal"));
    }

    #[test]
    fn format_parsing() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }
}
