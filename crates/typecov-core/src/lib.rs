//! typecov-core - Core library for doc and type coverage analysis
//!
//! This crate provides the building blocks for:
//! - Tokenizing PHP source into a classified token stream
//! - Walking the token stream for function/method declarations, with
//!   documentation and return-type information per declaration
//! - Aggregating declarations into a coverage report for a CI gate
//!
//! # Features
//!
//! - `walk` - Enable [`WalkSources`] for gitignore-aware directory walking (brings in `ignore`)
//! - `parallel` - Enable parallel analysis (brings in `rayon`)
//!
//! # Analyzing sources
//!
//! Providers implement [`Sources`]; [`MemorySources`] works without
//! touching the filesystem:
//!
//! ```
//! use std::collections::HashSet;
//! use typecov_core::{CoverageReport, MemorySources, Sources, Strictness};
//!
//! # fn main() -> eyre::Result<()> {
//! let outcome = MemorySources::new()
//!     .add("app/User.php", "<?php\n/** Fetch the id. */\nfunction id(): int { return 1; }\n")
//!     .scan(Strictness::Strict, &HashSet::new())?;
//!
//! let report = CoverageReport::compute(&outcome.files, Strictness::Strict);
//! assert_eq!((report.total, report.covered), (1, 1));
//! assert_eq!(report.coverage_percent(), 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! On disk, [`WalkSources`] walks one or more scan roots, honoring
//! gitignore files and configured ignore patterns:
//!
//! ```ignore
//! let outcome = WalkSources::new(["app", "src"])
//!     .ignore(["vendor", "storage/**"])
//!     .scan(Strictness::Strict, &excluded)?;
//! ```
//!
//! # Working with raw token streams
//!
//! The analyzer is a pure function over the token contract, so an
//! externally produced stream works just as well as [`tokenize`] output:
//!
//! ```
//! use std::collections::HashSet;
//! use typecov_core::{Strictness, analyze, tokenize};
//!
//! let tokens = tokenize("<?php function render() {}").unwrap();
//! let records = analyze(&tokens, Strictness::Basic, &HashSet::new()).unwrap();
//! assert_eq!(records[0].name.as_deref(), Some("render"));
//! assert!(!records[0].has_doc);
//! ```

mod analyzer;
mod coverage;
mod lexer;
mod sources;
mod token;

pub use analyzer::{Declaration, Strictness, analyze};
pub use coverage::{CoverageReport, FileAnalysis, Issue};
pub use lexer::tokenize;
pub use sources::{MemorySources, PathSources, ScanFailure, ScanOutcome, Sources};
pub use token::{Token, TokenKind, TokenizationError};

#[cfg(feature = "walk")]
pub use sources::WalkSources;
