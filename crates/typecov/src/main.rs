//! typecov - check doc and type coverage in PHP codebases
//!
//! Scans the configured paths for PHP files, records every
//! function/method declaration's doc comment and return-type annotation,
//! and fails the process when coverage drops below the configured
//! minimum.

use clap::Parser;
use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use typecov::config::{Config, DEFAULT_CONFIG_PATH};
use typecov::output::{OutputFormat, render_report};

/// CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "typecov",
    version,
    about = "Check doc and type coverage in your PHP codebase"
)]
struct Args {
    /// Comma-separated list of paths to scan (overrides config)
    #[arg(long, value_delimiter = ',')]
    path: Vec<String>,

    /// Comma-separated list of paths to ignore (overrides config)
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,

    /// Minimum coverage percentage to pass (overrides config)
    #[arg(long, value_name = "PERCENT")]
    fail_under: Option<f64>,

    /// Strictness level: none, basic, or strict (overrides config)
    #[arg(long)]
    level: Option<String>,

    /// Comma-separated declaration names to skip (overrides config)
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Export the issue list as JSON, optionally into DIR
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
    export: Option<String>,

    /// Output format: text or json
    #[arg(long, short = 'f', default_value = "text")]
    format: String,

    /// Path to config file (default: .config/typecov/config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let format = OutputFormat::from_str(&args.format).ok_or_else(|| {
        eyre::eyre!("Unknown output format `{}` (expected text or json)", args.format)
    })?;

    let project_root = find_project_root()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| project_root.join(DEFAULT_CONFIG_PATH));
    let mut config = Config::load(&config_path)?;
    apply_overrides(&mut config, &args);

    if format == OutputFormat::Text {
        eprintln!("{} Scanning for PHP files...", "->".blue().bold());
    }

    let outcome = typecov::run(&project_root, &config)?;

    if format == OutputFormat::Text {
        eprintln!(
            "   Analyzed {} files at level {}",
            outcome.analyzed_files.to_string().green(),
            outcome.level.as_str().cyan()
        );
    }

    print!("{}", render_report(&outcome.report, &outcome.failures, format));

    if let Some(path) = &outcome.export_file {
        eprintln!(
            "{} Coverage report exported to {}",
            "->".blue().bold(),
            path.display()
        );
    }

    if !outcome.report.is_passing(config.fail_under) {
        std::process::exit(1);
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if !args.path.is_empty() {
        config.paths = args.path.clone();
    }
    if !args.ignore.is_empty() {
        config.ignore = args.ignore.clone();
    }
    if let Some(fail_under) = args.fail_under {
        config.fail_under = fail_under;
    }
    if let Some(level) = &args.level {
        config.level = level.clone();
    }
    if !args.exclude.is_empty() {
        config.exclude_names = args.exclude.clone();
    }
    if let Some(dir) = &args.export {
        config.export = true;
        config.export_path = dir.clone();
    }
}

/// Walk up from the current directory to the nearest composer.json; fall
/// back to the current directory for projects without one.
fn find_project_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().wrap_err("Failed to get current directory")?;
    let mut current = cwd.clone();
    loop {
        if current.join("composer.json").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Ok(cwd);
        }
    }
}
