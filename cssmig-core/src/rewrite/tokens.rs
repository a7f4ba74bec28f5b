//! Non-interactive design-token rewrite across files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use similar::TextDiff;

use super::backup::{write_with_backup, WriteOutcome};
use super::engine::RewriteOptions;
use crate::error::{CssmigResult, IoResultExt};
use crate::scan::read_source;
use crate::tokens::TokenMapping;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenRewriteSummary {
    /// Files rewritten (or, in a dry run, that would be).
    pub updated: Vec<PathBuf>,
    pub unchanged: usize,
    pub unreadable: Vec<PathBuf>,
}

fn is_stylesheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("css"))
}

/// Unified diff of one token rewrite, labelled with the file name.
pub fn token_diff(path: &Path, before: &str, after: &str) -> String {
    let name = path.display();
    TextDiff::from_lines(before, after)
        .unified_diff()
        .header(&format!("{} (original)", name), &format!("{} (updated)", name))
        .to_string()
}

/// Apply `mapping` to every file, in sorted order. With `show_diff`, each
/// change is printed as a unified diff instead of a one-line notice.
pub fn rewrite_token_files(
    files: &[PathBuf],
    mapping: &TokenMapping,
    options: &RewriteOptions,
    show_diff: bool,
) -> CssmigResult<TokenRewriteSummary> {
    let mut sorted = files.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut summary = TokenRewriteSummary::default();
    for path in &sorted {
        let text = match read_source(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                summary.unreadable.push(path.clone());
                continue;
            }
        };

        let Some(updated) = mapping.apply(&text, is_stylesheet(path))? else {
            summary.unchanged += 1;
            continue;
        };

        if show_diff {
            println!("\nDiff for {}:", path.display());
            print!("{}", token_diff(path, &text, &updated));
        }

        if options.dry_run {
            println!("[DRY-RUN] Would update tokens in: {}", path.display());
            summary.updated.push(path.clone());
            continue;
        }

        match write_with_backup(path, text.as_bytes(), &updated, options.backup_suffix())? {
            WriteOutcome::Written { .. } => {
                if !show_diff {
                    println!("[REWRITE] Updated tokens in: {}", path.display());
                }
                summary.updated.push(path.clone());
            }
            WriteOutcome::RefusedSymlink => summary.unchanged += 1,
        }
    }

    tracing::info!(
        updated = summary.updated.len(),
        unchanged = summary.unchanged,
        unreadable = summary.unreadable.len(),
        "Token rewrite finished"
    );
    Ok(summary)
}

/// Copy a replacement token sheet to `dest`, creating parent directories.
///
/// Does nothing under `analyze_only`. An existing `dest` is backed up first
/// when backups are on. Returns whether `dest` was (or, in a dry run, would
/// be) written.
pub fn install_token_sheet(
    source: &Path,
    dest: &Path,
    analyze_only: bool,
    options: &RewriteOptions,
) -> CssmigResult<bool> {
    if analyze_only {
        return Ok(false);
    }
    let sheet = read_source(source)?;

    if options.dry_run {
        println!(
            "[DRY-RUN] Would copy {} to {}",
            source.display(),
            dest.display()
        );
        return Ok(true);
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    let written = if dest.exists() {
        let previous = fs::read(dest).with_path(dest)?;
        matches!(
            write_with_backup(dest, &previous, &sheet, options.backup_suffix())?,
            WriteOutcome::Written { .. }
        )
    } else {
        fs::write(dest, &sheet).with_path(dest)?;
        true
    };

    if written {
        println!("Copied {} to {}", source.display(), dest.display());
        tracing::info!(source = %source.display(), dest = %dest.display(), "Token sheet installed");
    }
    Ok(written)
}
