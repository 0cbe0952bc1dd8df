//! End-to-end coverage runs over on-disk fixtures

use indoc::indoc;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use typecov::config::Config;

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A project with four declarations: two documented and typed, one
/// documented only, one bare.
fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "app/Sample.php",
        indoc! {r#"
            <?php

            /** Fully covered. */
            function a(): int { return 1; }

            /** Also covered. */
            function b(): string { return ''; }

            /** Documented but untyped. */
            function c() { return null; }

            function d() { return null; }
        "#},
    );
    dir
}

#[test]
fn strict_run_reports_half_coverage() {
    let dir = sample_project();
    let config = Config::default();
    let outcome = typecov::run(dir.path(), &config).unwrap();

    assert_eq!(outcome.analyzed_files, 1);
    assert_eq!(outcome.report.total, 4);
    assert_eq!(outcome.report.covered, 2);
    assert_eq!(outcome.report.coverage_percent(), 50.0);
    assert!(!outcome.report.is_passing(config.fail_under));

    // report paths are project-relative
    let paths: Vec<_> = outcome.report.issues.keys().cloned().collect();
    assert_eq!(paths, [PathBuf::from("app/Sample.php")]);
}

#[test]
fn basic_run_counts_doc_only_declarations() {
    let dir = sample_project();
    let config = Config {
        level: "basic".to_string(),
        ..Config::default()
    };
    let outcome = typecov::run(dir.path(), &config).unwrap();
    assert_eq!(outcome.report.covered, 3);
    assert!(!outcome.report.is_passing(80.0));
    assert!(outcome.report.is_passing(75.0));
}

#[test]
fn level_none_reports_nothing_and_passes() {
    let dir = sample_project();
    let config = Config {
        level: "none".to_string(),
        ..Config::default()
    };
    let outcome = typecov::run(dir.path(), &config).unwrap();
    assert_eq!(outcome.report.total, 0);
    assert!(outcome.report.issues.is_empty());
    assert!(outcome.report.is_passing(config.fail_under));
}

#[test]
fn constructors_are_excluded_by_default() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "app/User.php",
        indoc! {r#"
            <?php

            class User
            {
                public function __construct() {}

                /** The display name. */
                public function name(): string { return ''; }
            }
        "#},
    );
    let outcome = typecov::run(dir.path(), &Config::default()).unwrap();
    assert_eq!(outcome.report.total, 1);
    assert_eq!(outcome.report.covered, 1);
}

#[test]
fn ignore_patterns_skip_directories() {
    let dir = sample_project();
    write_file(
        dir.path(),
        "app/vendor/Generated.php",
        "<?php function gen() {}",
    );
    let config = Config {
        ignore: vec!["vendor".to_string()],
        ..Config::default()
    };
    let outcome = typecov::run(dir.path(), &config).unwrap();
    assert_eq!(outcome.analyzed_files, 1);
    assert_eq!(outcome.report.total, 4);
}

#[test]
fn malformed_file_is_reported_not_fatal() {
    let dir = sample_project();
    write_file(dir.path(), "app/Broken.php", "<?php $x = 'unterminated");
    let outcome = typecov::run(dir.path(), &Config::default()).unwrap();
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].path, PathBuf::from("app/Broken.php"));
    // the healthy file is still fully analyzed
    assert_eq!(outcome.report.total, 4);
}

#[test]
fn export_writes_timestamped_file() {
    let dir = sample_project();
    let config = Config {
        export: true,
        export_path: "reports".to_string(),
        ..Config::default()
    };
    let outcome = typecov::run(dir.path(), &config).unwrap();

    let exported = outcome.export_file.unwrap();
    assert!(exported.starts_with(dir.path().join("reports")));
    let name = exported.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("typecov-") && name.ends_with(".json"));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&exported).unwrap()).unwrap();
    assert_eq!(value["total"], 4);
    assert_eq!(value["covered"], 2);
    assert_eq!(value["issues"].as_array().unwrap().len(), 2);
}

#[test]
fn missing_scan_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(typecov::run(dir.path(), &Config::default()).is_err());
}

#[test]
fn unknown_level_is_rejected() {
    let dir = sample_project();
    let config = Config {
        level: "pedantic".to_string(),
        ..Config::default()
    };
    assert!(typecov::run(dir.path(), &config).is_err());
}
