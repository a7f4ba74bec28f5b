//! The interactive rename engine.
//!
//! Files are processed one at a time in sorted order:
//!
//! ```text
//! read → scan references → decide per occurrence → splice → backup → write
//! ```
//!
//! A file is written only when at least one edit was accepted and the operator
//! did not skip it. There are no cross-file transactions: files written before
//! a failure or a quit stay written.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::backup::{write_with_backup, WriteOutcome, DEFAULT_BACKUP_SUFFIX};
use super::decision::{Decision, DecisionStrategy, Occurrence};
use super::edit::{apply_edits, Edit};
use super::mapping::RenameMapping;
use crate::error::CssmigResult;
use crate::references::ReferenceScanner;
use crate::scan::{display_path, read_source};

/// Knobs shared by the class and token rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Report only; never prompt and never write.
    pub dry_run: bool,
    pub backup: bool,
    pub backup_suffix: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup: true,
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

impl RewriteOptions {
    pub(crate) fn backup_suffix(&self) -> Option<&str> {
        self.backup.then_some(self.backup_suffix.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// No occurrence found, or none accepted.
    Unchanged,
    Rewritten,
    /// Dry run found occurrences.
    WouldChange,
    /// Operator skipped the file; queued edits discarded.
    Skipped,
    /// Operator quit while on this file; queued edits discarded.
    Aborted,
    /// Not written because the path is a symlink.
    Refused,
    /// Unreadable or not UTF-8.
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub occurrences: usize,
    pub accepted: usize,
    pub backup: Option<PathBuf>,
}

impl FileOutcome {
    fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            occurrences: 0,
            accepted: 0,
            backup: None,
        }
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RewriteSummary {
    pub files: Vec<FileOutcome>,
    /// Operator quit before every file was visited.
    pub quit: bool,
    pub dry_run: bool,
}

impl RewriteSummary {
    pub fn files_with_status(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    pub fn total_occurrences(&self) -> usize {
        self.files.iter().map(|f| f.occurrences).sum()
    }

    pub fn total_accepted(&self) -> usize {
        self.files.iter().map(|f| f.accepted).sum()
    }

    /// True when a dry run found something that a real run would rewrite.
    pub fn would_change(&self) -> bool {
        self.dry_run && self.files_with_status(FileStatus::WouldChange) > 0
    }
}

/// Applies a [`RenameMapping`] across files, asking `strategy` per occurrence.
pub struct Rewriter<'m, S: DecisionStrategy> {
    mapping: &'m RenameMapping,
    options: RewriteOptions,
    strategy: S,
    scanner: ReferenceScanner,
    accept_all: bool,
}

impl<'m, S: DecisionStrategy> Rewriter<'m, S> {
    pub fn new(mapping: &'m RenameMapping, options: RewriteOptions, strategy: S) -> Self {
        Self {
            mapping,
            options,
            strategy,
            scanner: ReferenceScanner::default(),
            accept_all: false,
        }
    }

    /// Replace the default reference categories.
    pub fn with_scanner(mut self, scanner: ReferenceScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Process `files` in sorted order.
    ///
    /// Stops at the first write failure (earlier files stay written) or when
    /// the operator quits.
    pub fn run(&mut self, files: &[PathBuf]) -> CssmigResult<RewriteSummary> {
        let mut sorted = files.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut summary = RewriteSummary {
            dry_run: self.options.dry_run,
            ..Default::default()
        };
        for path in &sorted {
            let outcome = self.process_file(path)?;
            let aborted = outcome.status == FileStatus::Aborted;
            summary.files.push(outcome);
            if aborted {
                summary.quit = true;
                break;
            }
        }

        tracing::info!(
            files = summary.files.len(),
            rewritten = summary.files_with_status(FileStatus::Rewritten),
            occurrences = summary.total_occurrences(),
            accepted = summary.total_accepted(),
            dry_run = summary.dry_run,
            quit = summary.quit,
            "Rename run finished"
        );
        Ok(summary)
    }

    /// Process one file.
    pub fn process_file(&mut self, path: &Path) -> CssmigResult<FileOutcome> {
        let text = match read_source(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                return Ok(FileOutcome::new(path, FileStatus::Unreadable));
            }
        };

        let file = display_path(path);
        let references = self.scanner.scan(&file, &text);
        let mut outcome = FileOutcome::new(path, FileStatus::Unchanged);
        let mut edits: Vec<Edit> = Vec::new();

        let mapping = self.mapping;
        for (old, new) in mapping.iter() {
            for reference in references.iter().filter(|r| r.class == old) {
                outcome.occurrences += 1;
                let occurrence = occurrence_at(path, &text, reference, old, new);

                if self.options.dry_run {
                    print_dry_run(&occurrence);
                    continue;
                }

                let decision = if self.accept_all {
                    Decision::Accept
                } else {
                    self.strategy.decide(&occurrence)
                };
                match decision {
                    Decision::Accept => {}
                    Decision::Reject => continue,
                    Decision::AcceptAll => self.accept_all = true,
                    Decision::SkipFile => {
                        outcome.status = FileStatus::Skipped;
                        outcome.accepted = 0;
                        println!("[SKIP] {}", path.display());
                        return Ok(outcome);
                    }
                    Decision::Quit => {
                        outcome.status = FileStatus::Aborted;
                        outcome.accepted = 0;
                        return Ok(outcome);
                    }
                }
                edits.push(Edit::new(reference.start, reference.end, new));
                outcome.accepted += 1;
            }
        }

        if self.options.dry_run {
            if outcome.occurrences > 0 {
                outcome.status = FileStatus::WouldChange;
            }
            return Ok(outcome);
        }
        if edits.is_empty() {
            return Ok(outcome);
        }

        let updated = apply_edits(path, &text, edits)?;
        match write_with_backup(path, text.as_bytes(), &updated, self.options.backup_suffix())? {
            WriteOutcome::Written { backup } => {
                outcome.status = FileStatus::Rewritten;
                outcome.backup = backup;
                println!(
                    "[REWRITE] {} ({} change{})",
                    path.display(),
                    outcome.accepted,
                    if outcome.accepted == 1 { "" } else { "s" }
                );
            }
            WriteOutcome::RefusedSymlink => outcome.status = FileStatus::Refused,
        }
        Ok(outcome)
    }
}

fn occurrence_at(
    path: &Path,
    text: &str,
    reference: &crate::references::Reference,
    old: &str,
    new: &str,
) -> Occurrence {
    let line_start = text[..reference.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[reference.end..]
        .find('\n')
        .map_or(text.len(), |i| reference.end + i);

    Occurrence {
        file: path.to_path_buf(),
        line_number: text[..reference.start].matches('\n').count() + 1,
        line: text[line_start..line_end].trim_end_matches('\r').to_string(),
        column: reference.start - line_start,
        start: reference.start,
        end: reference.end,
        kind: reference.kind,
        context: reference.context.clone(),
        old: old.to_string(),
        new: new.to_string(),
    }
}

fn print_dry_run(occurrence: &Occurrence) {
    println!(
        "[DRY-RUN] {}:{}: {} -> {} ({})",
        occurrence.file.display(),
        occurrence.line_number,
        occurrence.old,
        occurrence.new,
        occurrence.kind
    );
    println!("    {}", occurrence.line.trim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::decision::{AcceptAll, RejectAll};
    use std::fs;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "cssmig_engine_test_{}_{}",
            std::process::id(),
            n
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn mapping(pairs: &[&str]) -> RenameMapping {
        RenameMapping::from_sources(None, &pairs.iter().map(|p| p.to_string()).collect::<Vec<_>>())
            .unwrap()
    }

    #[test]
    fn test_accept_all_rewrites_and_backs_up() {
        let dir = create_temp_dir();
        let file = dir.join("a.jsx");
        let original = r#"<a className="btn primary"/><b className="btn-primary"/>"#;
        fs::write(&file, original).unwrap();

        let map = mapping(&["btn:button"]);
        let summary = Rewriter::new(&map, RewriteOptions::default(), AcceptAll)
            .run(&[file.clone()])
            .unwrap();

        assert_eq!(summary.files[0].status, FileStatus::Rewritten);
        assert_eq!(summary.files[0].accepted, 1);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            r#"<a className="button primary"/><b className="btn-primary"/>"#
        );
        assert_eq!(fs::read_to_string(dir.join("a.jsx.bak")).unwrap(), original);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_reject_all_leaves_file_alone() {
        let dir = create_temp_dir();
        let file = dir.join("a.js");
        fs::write(&file, r#"el.classList.add("btn");"#).unwrap();

        let map = mapping(&["btn:button"]);
        let summary = Rewriter::new(&map, RewriteOptions::default(), RejectAll)
            .run(&[file.clone()])
            .unwrap();

        assert_eq!(summary.files[0].status, FileStatus::Unchanged);
        assert_eq!(summary.files[0].occurrences, 1);
        assert!(!dir.join("a.js.bak").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_accept_all_decision_stops_prompting() {
        let dir = create_temp_dir();
        let a = dir.join("a.js");
        let b = dir.join("b.js");
        fs::write(&a, r#"q(".x"); q('.x');"#).unwrap();
        fs::write(&b, r#"q(".x");"#).unwrap();

        let map = mapping(&["x:y"]);
        let mut asked = 0;
        let strategy = |_: &Occurrence| {
            asked += 1;
            Decision::AcceptAll
        };
        let summary = Rewriter::new(
            &map,
            RewriteOptions {
                backup: false,
                ..Default::default()
            },
            strategy,
        )
        .run(&[b.clone(), a.clone()])
        .unwrap();

        assert_eq!(asked, 1);
        assert_eq!(summary.total_accepted(), 3);
        assert_eq!(fs::read_to_string(&a).unwrap(), r#"q(".y"); q('.y');"#);
        assert_eq!(fs::read_to_string(&b).unwrap(), r#"q(".y");"#);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_quit_stops_run_and_discards_current_file() {
        let dir = create_temp_dir();
        let a = dir.join("a.js");
        let b = dir.join("b.js");
        fs::write(&a, r#"x = '.old'; y = '.old';"#).unwrap();
        fs::write(&b, r#"z = '.old';"#).unwrap();

        let map = mapping(&["old:new"]);
        let mut calls = 0;
        let strategy = |_: &Occurrence| {
            calls += 1;
            if calls == 1 {
                Decision::Accept
            } else {
                Decision::Quit
            }
        };
        let summary = Rewriter::new(&map, RewriteOptions::default(), strategy)
            .run(&[a.clone(), b.clone()])
            .unwrap();

        assert!(summary.quit);
        assert_eq!(summary.files.len(), 1);
        assert_eq!(summary.files[0].status, FileStatus::Aborted);
        assert_eq!(fs::read_to_string(&a).unwrap(), r#"x = '.old'; y = '.old';"#);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_dry_run_never_asks_or_writes() {
        let dir = create_temp_dir();
        let file = dir.join("a.html");
        fs::write(&file, r#"<div class="old"></div>"#).unwrap();

        let map = mapping(&["old:new"]);
        let strategy = |_: &Occurrence| -> Decision { panic!("dry run must not prompt") };
        let summary = Rewriter::new(
            &map,
            RewriteOptions {
                dry_run: true,
                ..Default::default()
            },
            strategy,
        )
        .run(&[file.clone()])
        .unwrap();

        assert!(summary.would_change());
        assert_eq!(summary.files[0].accepted, 0);
        assert_eq!(fs::read_to_string(&file).unwrap(), r#"<div class="old"></div>"#);
        assert!(!dir.join("a.html.bak").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unreadable_file_skipped() {
        let dir = create_temp_dir();
        let bad = dir.join("bad.js");
        let good = dir.join("good.js");
        fs::write(&bad, [0xffu8, 0xfe]).unwrap();
        fs::write(&good, r#"a = '.old';"#).unwrap();

        let map = mapping(&["old:new"]);
        let summary = Rewriter::new(&map, RewriteOptions::default(), AcceptAll)
            .run(&[bad, good.clone()])
            .unwrap();

        assert_eq!(summary.files[0].status, FileStatus::Unreadable);
        assert_eq!(summary.files[1].status, FileStatus::Rewritten);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_occurrence_line_info() {
        let text = "first\n  <i class=\"old\">\nlast";
        let refs = ReferenceScanner::default().scan("a.html", text);
        let occ = occurrence_at(Path::new("a.html"), text, &refs[0], "old", "new");
        assert_eq!(occ.line_number, 2);
        assert_eq!(occ.line, "  <i class=\"old\">");
    }
}
