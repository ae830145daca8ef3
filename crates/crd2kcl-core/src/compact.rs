//! Empty directory removal
//!
//! Relocating files leaves directories behind (the converter's staging dirs,
//! version dirs that never got a file). Removing an empty leaf can empty its
//! parent, so this runs in passes until a pass finds nothing to remove.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What [`compact`] removed
#[derive(Debug, Default)]
pub struct CompactReport {
    /// Directories removed, in removal order
    pub removed: Vec<PathBuf>,
    /// Directories that were empty but could not be removed
    pub failed: Vec<PathBuf>,
    /// Number of passes that removed something
    pub passes: usize,
}

/// Remove every empty directory below `root`
///
/// `root` itself is kept even when it ends up empty. Removal failures are
/// logged and not retried, so the loop always reaches a fixed point.
pub fn compact(root: &Path) -> CompactReport {
    let mut report = CompactReport::default();
    let mut failed: HashSet<PathBuf> = HashSet::new();

    loop {
        let mut empty = find_empty_dirs(root, &failed);
        if empty.is_empty() {
            break;
        }
        report.passes += 1;

        // Deepest first
        empty.sort_by(|(a, _), (b, _)| b.cmp(a));

        for (_, dir) in empty {
            tracing::debug!("Removing empty directory '{}'", dir.display());
            match fs::remove_dir(&dir) {
                Ok(()) => report.removed.push(dir),
                Err(e) => {
                    tracing::warn!("Failed to remove directory '{}': {}", dir.display(), e);
                    failed.insert(dir.clone());
                    report.failed.push(dir);
                }
            }
        }
    }

    report
}

fn find_empty_dirs(root: &Path, skip: &HashSet<PathBuf>) -> Vec<(usize, PathBuf)> {
    let mut empty = Vec::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under '{}': {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_dir() || skip.contains(entry.path()) {
            continue;
        }

        match is_empty_dir(entry.path()) {
            Ok(true) => empty.push((entry.depth(), entry.into_path())),
            Ok(false) => {}
            Err(e) => tracing::debug!("Cannot read directory '{}': {}", entry.path().display(), e),
        }
    }

    empty
}

fn is_empty_dir(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dirs_under(root: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<_> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();
        dirs.sort();
        dirs
    }

    #[test]
    fn test_compact_removes_nested_empty_dirs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c/d")).unwrap();
        fs::create_dir_all(root.join("v1")).unwrap();
        fs::write(root.join("v1/widget_v1.k"), "").unwrap();

        let report = compact(root);

        assert!(!root.join("a").exists());
        assert!(root.join("v1/widget_v1.k").exists());
        assert_eq!(report.removed.len(), 4);
        assert!(report.failed.is_empty());
        assert_eq!(dirs_under(root), vec![root.join("v1")]);
    }

    #[test]
    fn test_compact_needs_several_passes() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        // a/b/c and a/x/y: both leaves go in pass one, then b and x, then a
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::create_dir_all(root.join("a/x/y")).unwrap();

        let report = compact(root);

        assert_eq!(report.passes, 3);
        assert!(dirs_under(root).is_empty());
    }

    #[test]
    fn test_compact_keeps_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("module");
        fs::create_dir_all(root.join("crds")).unwrap();

        compact(&root);

        assert!(root.exists());
        assert!(!root.join("crds").exists());
    }

    #[test]
    fn test_compact_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("staging/nested")).unwrap();
        fs::create_dir_all(root.join("v1beta1")).unwrap();
        fs::write(root.join("v1beta1/gadget_v1beta1.k"), "").unwrap();

        let first = compact(root);
        let after_first = dirs_under(root);
        let second = compact(root);

        assert_eq!(first.removed.len(), 2);
        assert!(second.removed.is_empty());
        assert_eq!(second.passes, 0);
        assert_eq!(dirs_under(root), after_first);
    }

    #[cfg(unix)]
    #[test]
    fn test_compact_reports_failed_removal_and_terminates() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let locked = root.join("locked");
        fs::create_dir_all(locked.join("empty")).unwrap();
        fs::create_dir_all(root.join("other")).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits are not enforced for root
        if fs::write(locked.join("write_check"), "").is_ok() {
            fs::remove_file(locked.join("write_check")).unwrap();
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = compact(root);

        assert_eq!(report.failed, vec![locked.join("empty")]);
        assert_eq!(report.removed, vec![root.join("other")]);
        assert_eq!(report.passes, 1);
        assert!(locked.join("empty").exists());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_compact_missing_root() {
        let dir = TempDir::new().unwrap();
        let report = compact(&dir.path().join("missing"));
        assert!(report.removed.is_empty());
    }
}
