//! Builder API for a full stylesheet audit.
//!
//! ```rust,ignore
//! use cssmig_core::prelude::*;
//!
//! let report = CssAudit::new()
//!     .css_files(["styles"])
//!     .source_files(["src"])
//!     .exclude_dirs(["vendor"])
//!     .run()?;
//!
//! println!("{} classes, {} duplicate groups", report.model.len(), report.duplicates.len());
//! ```
//!
//! Stylesheets are processed first and fully; source files are then scanned
//! for references. Usage counts only ever apply to declared classes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::Heuristics;
use crate::css::extract_stylesheet;
use crate::duplicates::{find_duplicates, DuplicateGroup};
use crate::error::CssmigError;
use crate::model::DeclarationModel;
use crate::references::{advisory_literals, source_classes};
use crate::risk::RiskLevel;
use crate::scan::{display_path, gather_files, read_source, CSS_EXTENSIONS, SOURCE_EXTENSIONS};

/// Default number of source files echoed at debug level.
pub const DEFAULT_SAMPLE_SIZE: usize = 3;

/// Lines shown per inspected file.
pub const PREVIEW_LINES: usize = 5;

const PREVIEW_WIDTH: usize = 100;

/// Builder for configuring an audit run.
#[derive(Debug, Clone)]
pub struct CssAudit {
    css_paths: Vec<PathBuf>,
    source_paths: Vec<PathBuf>,
    excluded_dirs: Vec<String>,
    heuristics: Heuristics,
    sample_size: usize,
}

impl Default for CssAudit {
    fn default() -> Self {
        Self::new()
    }
}

impl CssAudit {
    pub fn new() -> Self {
        Self {
            css_paths: Vec::new(),
            source_paths: Vec::new(),
            excluded_dirs: Vec::new(),
            heuristics: Heuristics::default(),
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }

    /// Stylesheet files or directories.
    pub fn css_files(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.css_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Markup/script files or directories.
    pub fn source_files(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.source_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Add directories to exclude from scanning.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// Number of source files to log at debug level (0 disables).
    pub fn sample_size(mut self, n: usize) -> Self {
        self.sample_size = n;
        self
    }

    /// Discover, read and analyze every file.
    pub fn run(&self) -> Result<AuditReport> {
        let css_files = gather_files(&self.css_paths, CSS_EXTENSIONS, &self.excluded_dirs)
            .context("Failed to gather stylesheets")?;
        let source_files =
            gather_files(&self.source_paths, SOURCE_EXTENSIONS, &self.excluded_dirs)
                .context("Failed to gather source files")?;

        if source_files.is_empty() {
            tracing::warn!("No HTML/JS files found; usage counts will all be zero");
        }

        let mut session = AuditSession::new();
        for path in &css_files {
            match read_source(path) {
                Ok(text) => session.add_stylesheet(&display_path(path), &text),
                Err(e) => session.skip(path, e),
            }
        }
        for (i, path) in source_files.iter().enumerate() {
            match read_source(path) {
                Ok(text) => {
                    if i < self.sample_size {
                        log_sample(path, &text);
                    }
                    session.add_source(&display_path(path), &text);
                }
                Err(e) => session.skip(path, e),
            }
        }

        let report = session.finish(&self.heuristics);
        tracing::info!(
            classes = report.model.len(),
            duplicates = report.duplicates.len(),
            css_files = report.css_file_count,
            source_files = report.source_file_count,
            skipped = report.skipped.len(),
            "Audit complete"
        );
        Ok(report)
    }
}

/// Incremental audit over in-memory texts.
///
/// Every stylesheet must be added before the first source file; usage for a
/// class declared later would otherwise be missed.
#[derive(Debug, Default)]
pub struct AuditSession {
    model: DeclarationModel,
    skipped: Vec<SkippedFile>,
    undeclared: BTreeMap<String, usize>,
    advisory: BTreeMap<String, usize>,
    css_file_count: usize,
    source_file_count: usize,
}

impl AuditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one stylesheet. Parse failures are recorded and skipped.
    pub fn add_stylesheet(&mut self, file: &str, text: &str) {
        match extract_stylesheet(file, text) {
            Ok(partial) => {
                self.model.merge(partial);
                self.css_file_count += 1;
            }
            Err(e) => self.skip(Path::new(file), e),
        }
    }

    /// Count one source file's references.
    pub fn add_source(&mut self, file: &str, text: &str) {
        self.source_file_count += 1;
        let used = source_classes(file, text);
        for class in &used {
            if !self.model.record_usage(class) {
                *self.undeclared.entry(class.clone()).or_default() += 1;
            }
        }
        for literal in advisory_literals(text) {
            if self.model.contains(&literal) && !used.contains(&literal) {
                *self.advisory.entry(literal).or_default() += 1;
            }
        }
    }

    pub fn skip(&mut self, path: &Path, error: CssmigError) {
        tracing::warn!(file = %path.display(), error = %error, "Skipping file");
        self.skipped.push(SkippedFile {
            path: path.to_path_buf(),
            error,
        });
    }

    /// Classify, attribute and group duplicates.
    pub fn finish(mut self, heuristics: &Heuristics) -> AuditReport {
        self.model.finalize(&heuristics.risk, &heuristics.components);
        let duplicates = find_duplicates(&self.model);
        AuditReport {
            model: self.model,
            duplicates,
            skipped: self.skipped,
            undeclared: self.undeclared,
            advisory_literals: self.advisory,
            css_file_count: self.css_file_count,
            source_file_count: self.source_file_count,
        }
    }
}

/// A file left out of the audit, with the reason.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: CssmigError,
}

/// Result of an audit run.
#[derive(Debug)]
pub struct AuditReport {
    pub model: DeclarationModel,
    pub duplicates: Vec<DuplicateGroup>,
    pub skipped: Vec<SkippedFile>,
    /// Referenced but never declared: class → number of files.
    pub undeclared: BTreeMap<String, usize>,
    /// Declared classes appearing only as quoted literals: class → number of
    /// files. Never part of `usage_count`.
    pub advisory_literals: BTreeMap<String, usize>,
    pub css_file_count: usize,
    pub source_file_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl AuditReport {
    pub fn risk_breakdown(&self) -> RiskBreakdown {
        let mut breakdown = RiskBreakdown::default();
        for record in self.model.records() {
            match record.risk.unwrap_or(RiskLevel::Low) {
                RiskLevel::High => breakdown.high += 1,
                RiskLevel::Medium => breakdown.medium += 1,
                RiskLevel::Low => breakdown.low += 1,
            }
        }
        breakdown
    }

    /// Declared classes no source file references.
    pub fn unused_classes(&self) -> Vec<&str> {
        self.model
            .records()
            .filter(|r| r.usage_count == 0)
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// What the usage path sees in one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInspection {
    /// First lines, each cut at 100 characters.
    pub preview_lines: Vec<String>,
    pub classes: BTreeSet<String>,
    pub advisory: BTreeSet<String>,
}

pub fn inspect_source(file: &str, text: &str, line_count: usize) -> SourceInspection {
    let preview_lines = text
        .split('\n')
        .take(line_count)
        .map(|line| {
            if line.chars().count() > PREVIEW_WIDTH {
                format!("{}...", line.chars().take(PREVIEW_WIDTH).collect::<String>())
            } else {
                line.to_string()
            }
        })
        .collect();

    let classes = source_classes(file, text);
    let advisory = advisory_literals(text)
        .into_iter()
        .filter(|literal| !classes.contains(literal))
        .collect();

    SourceInspection {
        preview_lines,
        classes,
        advisory,
    }
}

fn log_sample(path: &Path, text: &str) {
    let inspection = inspect_source(&display_path(path), text, PREVIEW_LINES);
    tracing::debug!(
        file = %path.display(),
        classes = ?inspection.classes,
        "Sample source file"
    );
}
