//! Deterministic file discovery with directory pruning.
//!
//! Roots may be files or directories. Output is sorted and deduplicated so
//! every run visits files in the same order.

use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{CssmigError, CssmigResult, IoResultExt};

/// Directories excluded by default (front-end build conventions).
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "target"];

/// Stylesheet extensions.
pub const CSS_EXTENSIONS: &[&str] = &["css"];

/// Markup and script extensions scanned for class references.
pub const SOURCE_EXTENSIONS: &[&str] = &["html", "htm", "js", "jsx", "ts", "tsx"];

/// Checks if a directory entry should be pruned (excluded from traversal).
///
/// The walk root itself is never pruned.
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Gathers files with one of `extensions` under every root.
///
/// A root that is itself a file is included when its extension matches.
/// `excludes` are directory names pruned in addition to [`EXCLUDED_DIRS`].
pub fn gather_files(
    roots: &[PathBuf],
    extensions: &[&str],
    excludes: &[String],
) -> Result<Vec<PathBuf>> {
    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().map(String::as_str))
        .collect();

    let mut found: BTreeSet<PathBuf> = BTreeSet::new();
    for root in roots {
        if root.is_file() {
            if has_extension(root, extensions) {
                found.insert(root.clone());
            }
            continue;
        }
        if !root.exists() {
            anyhow::bail!("Path does not exist: {}", root.display());
        }

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        {
            let entry =
                entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            let path = entry.path();
            if entry.file_type().is_file() && has_extension(path, extensions) {
                found.insert(path.to_path_buf());
            }
        }
    }

    tracing::debug!(files = found.len(), "Gathered files");
    Ok(found.into_iter().collect())
}

/// Read a file as UTF-8 text.
///
/// Non-UTF-8 content is a recoverable [`CssmigError::Decode`].
pub fn read_source(path: &Path) -> CssmigResult<String> {
    let bytes = fs::read(path).with_path(path)?;
    String::from_utf8(bytes).map_err(|e| CssmigError::decode(path, e.to_string()))
}

/// Display form of a path, used as the file identifier in reports.
pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("cssmig_scan_test_{}_{}", std::process::id(), n));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_gather_files_prunes_and_sorts() {
        let dir = create_temp_dir();
        fs::create_dir_all(dir.join("src/ui")).unwrap();
        fs::create_dir_all(dir.join("node_modules/lib")).unwrap();
        fs::create_dir_all(dir.join("vendor")).unwrap();
        fs::write(dir.join("src/ui/b.js"), "").unwrap();
        fs::write(dir.join("src/a.tsx"), "").unwrap();
        fs::write(dir.join("src/a.js.bak"), "").unwrap();
        fs::write(dir.join("node_modules/lib/x.js"), "").unwrap();
        fs::write(dir.join("vendor/v.js"), "").unwrap();

        let files =
            gather_files(&[dir.clone()], SOURCE_EXTENSIONS, &["vendor".to_string()]).unwrap();
        assert_eq!(files, vec![dir.join("src/a.tsx"), dir.join("src/ui/b.js")]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_roots_and_dedup() {
        let dir = create_temp_dir();
        fs::write(dir.join("main.css"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let roots = vec![dir.join("main.css"), dir.clone(), dir.join("notes.txt")];
        let files = gather_files(&roots, CSS_EXTENSIONS, &[]).unwrap();
        assert_eq!(files, vec![dir.join("main.css")]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_root_named_like_excluded_dir_is_walked() {
        let dir = create_temp_dir().join("build");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("x.css"), "").unwrap();
        assert_eq!(gather_files(&[dir.clone()], CSS_EXTENSIONS, &[]).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_root_is_error() {
        let missing = std::env::temp_dir().join("cssmig_definitely_missing_root");
        assert!(gather_files(&[missing], CSS_EXTENSIONS, &[]).is_err());
    }

    #[test]
    fn test_read_source_decode_failure() {
        let dir = create_temp_dir();
        let file = dir.join("bad.js");
        fs::write(&file, [0xff, 0xfe, 0x00]).unwrap();

        let err = read_source(&file).unwrap_err();
        assert!(matches!(err, CssmigError::Decode { .. }));
        assert!(err.is_recoverable());
        assert!(matches!(
            read_source(&dir.join("nope.js")),
            Err(CssmigError::Io { .. })
        ));

        let _ = fs::remove_dir_all(&dir);
    }
}
