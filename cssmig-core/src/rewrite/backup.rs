//! Backup-then-write file replacement.
//!
//! Security: refuses to write through symlinks.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CssmigResult, IoResultExt};

/// Default backup suffix.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// `path` with `suffix` appended to the file name (`a.js` → `a.js.bak`).
pub fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { backup: Option<PathBuf> },
    /// Nothing was touched.
    RefusedSymlink,
}

/// Write `updated` to `path`, first copying `original` to a backup when
/// `backup_suffix` is given.
pub fn write_with_backup(
    path: &Path,
    original: &[u8],
    updated: &str,
    backup_suffix: Option<&str>,
) -> CssmigResult<WriteOutcome> {
    let metadata = path.symlink_metadata().with_path(path)?;
    if metadata.file_type().is_symlink() {
        eprintln!(
            "[WARN] Refusing to write through symlink: {} (security measure)",
            path.display()
        );
        return Ok(WriteOutcome::RefusedSymlink);
    }

    let backup = match backup_suffix {
        Some(suffix) => {
            let target = backup_path(path, suffix);
            fs::write(&target, original).with_path(&target)?;
            Some(target)
        }
        None => None,
    };

    fs::write(path, updated).with_path(path)?;
    Ok(WriteOutcome::Written { backup })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!("cssmig_backup_{}_{}", std::process::id(), n));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("src/a.js"), ".bak"),
            PathBuf::from("src/a.js.bak")
        );
    }

    #[test]
    fn test_write_with_backup() {
        let dir = temp_dir();
        let file = dir.join("a.js");
        fs::write(&file, "old").unwrap();

        let written = write_with_backup(&file, b"old", "new", Some(".bak")).unwrap();
        assert_eq!(
            written,
            WriteOutcome::Written {
                backup: Some(dir.join("a.js.bak"))
            }
        );
        assert_eq!(fs::read_to_string(&file).unwrap(), "new");
        assert_eq!(fs::read(dir.join("a.js.bak")).unwrap(), b"old");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_without_backup() {
        let dir = temp_dir();
        let file = dir.join("a.js");
        fs::write(&file, "old").unwrap();

        write_with_backup(&file, b"old", "new", None).unwrap();
        assert!(!dir.join("a.js.bak").exists());
        assert_eq!(fs::read_to_string(&file).unwrap(), "new");
        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_refused() {
        let dir = temp_dir();
        let target = dir.join("real.js");
        let link = dir.join("link.js");
        fs::write(&target, "old").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert_eq!(
            write_with_backup(&link, b"old", "new", Some(".bak")).unwrap(),
            WriteOutcome::RefusedSymlink
        );
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
        let _ = fs::remove_dir_all(&dir);
    }
}
