//! Configuration schema for typecov
//!
//! Config lives at `.config/typecov/config.json` relative to the project
//! root. Every field is optional; a missing file means all defaults.

use eyre::{Result, WrapErr};
use serde::Deserialize;
use std::path::Path;

/// Default location of the config file, relative to the project root.
pub const DEFAULT_CONFIG_PATH: &str = ".config/typecov/config.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directories to scan, relative to the project root.
    pub paths: Vec<String>,

    /// Path patterns to skip while scanning.
    pub ignore: Vec<String>,

    /// Minimum coverage percentage for the run to pass.
    pub fail_under: f64,

    /// Strictness level: "none", "basic", or "strict".
    pub level: String,

    /// Declaration names the analyzer skips entirely.
    pub exclude_names: Vec<String>,

    /// Whether to export the issue list as JSON after a run.
    pub export: bool,

    /// Directory the export file is written to, relative to the project
    /// root.
    pub export_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: vec!["app".to_string()],
            ignore: Vec::new(),
            fail_under: 80.0,
            level: "strict".to_string(),
            exclude_names: vec!["__construct".to_string()],
            export: false,
            export_path: ".".to_string(),
        }
    }
}

impl Config {
    /// Load config from `path`. A missing file yields the defaults; a
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
    }
}
