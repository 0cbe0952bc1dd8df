//! Source providers for coverage analysis
//!
//! Each provider hands files to the tokenizer/analyzer pipeline and
//! collects per-file results. A malformed file is reported as a failure,
//! never silently dropped, and never aborts the rest of the scan.

use crate::analyzer::{Strictness, analyze};
use crate::coverage::FileAnalysis;
use crate::lexer::tokenize;
use crate::token::TokenizationError;
use eyre::Result;
use std::collections::HashSet;
#[cfg(feature = "walk")]
use std::path::Path;
use std::path::PathBuf;

/// A file whose token stream was detectably malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: TokenizationError,
}

/// Result of scanning a set of sources. Files and failures are sorted by
/// path so the outcome is deterministic regardless of walk order.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<FileAnalysis>,
    pub failures: Vec<ScanFailure>,
}

impl ScanOutcome {
    /// Total number of declarations across all analyzed files.
    pub fn declaration_count(&self) -> usize {
        self.files.iter().map(|f| f.declarations.len()).sum()
    }

    fn push(&mut self, result: std::result::Result<FileAnalysis, ScanFailure>) {
        match result {
            Ok(analysis) => self.files.push(analysis),
            Err(failure) => self.failures.push(failure),
        }
    }

    fn finish(mut self) -> Self {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
        self
    }
}

/// Trait for providing source files to analyze.
pub trait Sources {
    /// Analyze all sources at the given strictness, skipping declarations
    /// named in `excluded`.
    fn scan(self, level: Strictness, excluded: &HashSet<String>) -> Result<ScanOutcome>;
}

fn analyze_content(
    path: PathBuf,
    content: &str,
    level: Strictness,
    excluded: &HashSet<String>,
) -> std::result::Result<FileAnalysis, ScanFailure> {
    let declarations = tokenize(content)
        .and_then(|tokens| analyze(&tokens, level, excluded))
        .map_err(|error| ScanFailure {
            path: path.clone(),
            error,
        })?;
    Ok(FileAnalysis { path, declarations })
}

/// Read and analyze a list of on-disk files, in parallel when the
/// `parallel` feature is enabled. I/O errors abort the scan; tokenization
/// errors become per-file failures.
fn analyze_files(
    paths: &[PathBuf],
    level: Strictness,
    excluded: &HashSet<String>,
) -> Result<ScanOutcome> {
    let process = |path: &PathBuf| -> Result<std::result::Result<FileAnalysis, ScanFailure>> {
        let content = std::fs::read_to_string(path)?;
        Ok(analyze_content(path.clone(), &content, level, excluded))
    };

    #[cfg(feature = "parallel")]
    let results: Vec<_> = {
        use rayon::prelude::*;
        paths.par_iter().map(process).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = paths.iter().map(process).collect();

    let mut outcome = ScanOutcome::default();
    for result in results {
        outcome.push(result?);
    }
    Ok(outcome.finish())
}

/// Sources from an explicit list of file paths.
pub struct PathSources(Vec<PathBuf>);

impl PathSources {
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self(paths.into_iter().map(Into::into).collect())
    }
}

impl Sources for PathSources {
    fn scan(self, level: Strictness, excluded: &HashSet<String>) -> Result<ScanOutcome> {
        analyze_files(&self.0, level, excluded)
    }
}

/// In-memory sources (useful for testing, embedding, etc.).
#[derive(Default)]
pub struct MemorySources(Vec<(PathBuf, String)>);

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with content.
    pub fn add(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.0.push((path.into(), content.into()));
        self
    }
}

impl Sources for MemorySources {
    fn scan(self, level: Strictness, excluded: &HashSet<String>) -> Result<ScanOutcome> {
        let mut outcome = ScanOutcome::default();
        for (path, content) in self.0 {
            outcome.push(analyze_content(path, &content, level, excluded));
        }
        Ok(outcome.finish())
    }
}

/// Gitignore-aware directory walker over one or more scan roots.
#[cfg(feature = "walk")]
pub struct WalkSources {
    roots: Vec<PathBuf>,
    ignore: Vec<String>,
}

#[cfg(feature = "walk")]
impl WalkSources {
    /// Create a walker over the given root directories.
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            ignore: Vec::new(),
        }
    }

    /// Add ignore patterns. A pattern with wildcards is matched as a glob
    /// against the root-relative path; a bare pattern matches as a path
    /// fragment (`vendor` skips anything under a `vendor` directory).
    pub fn ignore(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignore.extend(patterns.into_iter().map(Into::into));
        self
    }
}

#[cfg(feature = "walk")]
impl Sources for WalkSources {
    fn scan(self, level: Strictness, excluded: &HashSet<String>) -> Result<ScanOutcome> {
        use ignore::WalkBuilder;

        let mut php_files: Vec<PathBuf> = Vec::new();
        for root in &self.roots {
            let walker = WalkBuilder::new(root)
                .follow_links(true)
                .hidden(false)
                .git_ignore(true)
                .git_global(true)
                .git_exclude(true)
                .build();

            for entry in walker.filter_map(|entry| entry.ok()) {
                let path = entry.path();
                if path.extension().is_none_or(|ext| ext != "php") {
                    continue;
                }
                if is_ignored(path, root, &self.ignore) {
                    continue;
                }
                php_files.push(path.to_path_buf());
            }
        }

        // Overlapping roots must not analyze a file twice
        php_files.sort();
        php_files.dedup();

        analyze_files(&php_files, level, excluded)
    }
}

#[cfg(feature = "walk")]
fn is_ignored(path: &Path, root: &Path, patterns: &[String]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let relative_str = relative.to_string_lossy().replace('\\', "/");

    patterns.iter().any(|pattern| {
        let pattern = pattern.replace('\\', "/");
        if pattern.contains('*') {
            matches_glob(&relative_str, &pattern)
        } else {
            relative_str == pattern
                || relative_str.starts_with(&format!("{pattern}/"))
                || relative_str.contains(&format!("/{pattern}/"))
        }
    })
}

/// Simple glob matching (supports `*` and `**`).
#[cfg(feature = "walk")]
fn matches_glob(path: &str, pattern: &str) -> bool {
    // **/*.ext
    if let Some(ext) = pattern.strip_prefix("**/*.") {
        return path.ends_with(&format!(".{ext}"));
    }

    // **/rest
    if let Some(rest) = pattern.strip_prefix("**/") {
        return matches_glob(path, rest);
    }

    // prefix/**
    if let Some(prefix) = pattern.strip_suffix("/**") {
        return path == prefix || path.starts_with(&format!("{prefix}/"));
    }

    // prefix/**/suffix
    if let Some((prefix, suffix)) = pattern.split_once("/**/") {
        if path != prefix && !path.starts_with(&format!("{prefix}/")) {
            return false;
        }
        let after = path.strip_prefix(prefix).unwrap_or(path);
        let after = after.strip_prefix('/').unwrap_or(after);
        return matches_glob(after, suffix);
    }

    // *.ext
    if let Some(ext) = pattern.strip_prefix("*.") {
        return path.ends_with(&format!(".{ext}"));
    }

    if !pattern.contains('*') {
        return path == pattern;
    }

    // Fallback: the non-wildcard parts must appear in order
    let parts: Vec<&str> = pattern.split('*').filter(|s| !s.is_empty()).collect();
    let mut remaining = path;
    for part in parts {
        match remaining.find(part) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }
    true
}
