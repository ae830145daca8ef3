//! Version directory layout
//!
//! After conversion every `.k` file must live in `<batch root>/<tag>/`. Files
//! that ended up elsewhere (mirrored source subdirectories, a stale layout from
//! an older run) are moved into place here.
//!
//! `kcl import` emits a `regex_match = regex.match` helper into every generated
//! file. KCL treats the files of one directory as a single package, so the
//! helper may only be declared once per version directory; every later copy is
//! stripped.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::converter::OUTPUT_EXTENSION;
use crate::version::{VersionTag, classify};

/// Declaration emitted by the converter into every generated file
pub const BOILERPLATE_LINE: &str = "regex_match = regex.match";

static BOILERPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&regex::escape(BOILERPLATE_LINE)).expect("valid regex"));

/// What [`organize`] did to the tree
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Files relocated, as (from, to)
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Files that could not be moved and were left where they were
    pub failed: Vec<PathBuf>,
    /// Files that had their duplicate helper declaration removed
    pub deduplicated: Vec<PathBuf>,
    /// Files whose duplicate helper could not be removed
    pub dedupe_failed: Vec<PathBuf>,
}

impl OrganizeReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || !self.dedupe_failed.is_empty()
    }
}

/// Move every generated file into its version directory, then deduplicate
///
/// Only a failure to walk the tree is returned as an error. A file that can't
/// be moved is logged, recorded in [`OrganizeReport::failed`] and skipped.
pub fn organize(batch_root: &Path) -> io::Result<OrganizeReport> {
    let mut report = OrganizeReport::default();

    // Collect first: moving files while walkdir is reading the same
    // directories would make it see them twice
    let mut generated = Vec::new();
    for entry in WalkDir::new(batch_root) {
        let entry = entry?;
        if entry.file_type().is_file() && is_generated(entry.path()) {
            generated.push(entry.into_path());
        }
    }

    for path in generated {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let tag = classify(file_name);
        let target_dir = batch_root.join(tag.as_str());
        if path.parent() == Some(target_dir.as_path()) {
            continue;
        }

        let target = target_dir.join(file_name);
        tracing::debug!(from = %path.display(), to = %target.display(), "moving generated file");

        if let Err(e) = fs::create_dir_all(&target_dir) {
            tracing::warn!("Failed to create directory '{}': {}", target_dir.display(), e);
            report.failed.push(path);
            continue;
        }

        match fs::rename(&path, &target) {
            Ok(()) => report.moved.push((path, target)),
            Err(e) => {
                tracing::warn!("Failed to move file '{}': {}", path.display(), e);
                report.failed.push(path);
            }
        }
    }

    let deduped = dedupe_boilerplate(batch_root);
    report.deduplicated = deduped.rewritten;
    report.dedupe_failed = deduped.failed;
    Ok(report)
}

/// What [`dedupe_boilerplate`] did to the version directories
#[derive(Debug, Default)]
pub struct DedupeReport {
    /// Files that had their copy of the helper removed
    pub rewritten: Vec<PathBuf>,
    /// Files that should have been rewritten but could not be written
    pub failed: Vec<PathBuf>,
}

/// Keep one [`BOILERPLATE_LINE`] per known version directory
///
/// Directories are visited in [`crate::KNOWN_API_VERSIONS`] order and files by
/// name, so the copy that survives is always the same one. The `unknown`
/// directory is left alone. Contents are handled as raw bytes, so files that
/// are not valid UTF-8 take part like any other.
pub fn dedupe_boilerplate(batch_root: &Path) -> DedupeReport {
    let mut report = DedupeReport::default();

    for tag in VersionTag::known() {
        let dir = batch_root.join(tag.as_str());
        let Ok(files) = sorted_generated_files(&dir) else {
            continue;
        };

        let mut seen = false;
        for path in files {
            let content = match fs::read(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!("Skipping unreadable file '{}': {}", path.display(), e);
                    continue;
                }
            };

            let Some(found) = BOILERPLATE.find(&content) else {
                continue;
            };
            if !seen {
                seen = true;
                continue;
            }

            let mut stripped = Vec::with_capacity(content.len());
            stripped.extend_from_slice(&content[..found.start()]);
            stripped.extend_from_slice(&content[found.end()..]);

            match fs::write(&path, stripped) {
                Ok(()) => {
                    tracing::debug!("Removed '{}' from '{}'", BOILERPLATE_LINE, path.display());
                    report.rewritten.push(path);
                }
                Err(e) => {
                    tracing::warn!("Failed to write file '{}': {}", path.display(), e);
                    report.failed.push(path);
                }
            }
        }
    }

    report
}

fn is_generated(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == OUTPUT_EXTENSION)
}

fn sorted_generated_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() && is_generated(&entry.path()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GENERATED: &str = "import regex\n\nregex_match = regex.match\n\nschema Widget:\n    name: str\n";

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn count_boilerplate(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| fs::read(e.unwrap().path()).unwrap())
            .map(|c| BOILERPLATE.find_iter(&c).count())
            .sum()
    }

    #[test]
    fn test_organize_moves_into_version_dirs() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "upstream/crds/widget_v1.k", GENERATED);
        write(root, "gadget_v1beta1.k", GENERATED);
        write(root, "v2/nested/deep_v2.k", GENERATED);

        let report = organize(root).unwrap();

        assert!(root.join("v1/widget_v1.k").exists());
        assert!(root.join("v1beta1/gadget_v1beta1.k").exists());
        assert!(root.join("v2/deep_v2.k").exists());
        assert!(!root.join("upstream/crds/widget_v1.k").exists());
        assert_eq!(report.moved.len(), 3);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_organize_leaves_placed_files_alone() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "v1/widget_v1.k", "schema Widget:\n    name: str\n");

        let report = organize(root).unwrap();

        assert!(report.moved.is_empty());
        assert!(root.join("v1/widget_v1.k").exists());
    }

    #[test]
    fn test_organize_unknown_version() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "v1/plainresource.k", GENERATED);
        write(root, "odd_v1alpha6.k", GENERATED);

        organize(root).unwrap();

        assert!(root.join("unknown/plainresource.k").exists());
        assert!(root.join("unknown/odd_v1alpha6.k").exists());
        assert!(!root.join("v1/plainresource.k").exists());
    }

    #[test]
    fn test_organize_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "crds/widget_v1.yaml", "kind: CustomResourceDefinition\n");
        write(root, "notes_v1.md", "notes");

        let report = organize(root).unwrap();

        assert!(report.moved.is_empty());
        assert!(root.join("crds/widget_v1.yaml").exists());
        assert!(root.join("notes_v1.md").exists());
        assert!(!root.join("v1").exists());
    }

    #[test]
    fn test_organize_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(organize(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_organize_continues_past_failed_move() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let stuck = write(root, "staging/widget_v1.k", GENERATED);
        write(root, "staging/gadget_v1beta1.k", GENERATED);
        // A non-empty directory already sits where widget_v1.k should go
        write(root, "v1/widget_v1.k/keep", "");

        let report = organize(root).unwrap();

        assert_eq!(report.failed, vec![stuck.clone()]);
        assert!(report.has_failures());
        assert!(stuck.exists());
        assert!(root.join("v1beta1/gadget_v1beta1.k").is_file());
        assert_eq!(report.moved.len(), 1);
    }

    #[test]
    fn test_dedupe_keeps_first_file_by_name() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let a = write(root, "v1/a_v1.k", GENERATED);
        let b = write(root, "v1/b_v1.k", GENERATED);
        let c = write(root, "v1/c_v1.k", GENERATED);

        let report = dedupe_boilerplate(root);

        assert_eq!(report.rewritten, vec![b.clone(), c.clone()]);
        assert!(report.failed.is_empty());
        assert!(fs::read_to_string(&a).unwrap().contains(BOILERPLATE_LINE));
        assert!(!fs::read_to_string(&b).unwrap().contains(BOILERPLATE_LINE));
        assert!(!fs::read_to_string(&c).unwrap().contains(BOILERPLATE_LINE));
        assert_eq!(count_boilerplate(&root.join("v1")), 1);
    }

    #[test]
    fn test_dedupe_removes_only_one_occurrence() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "v1/a_v1.k", GENERATED);
        let twice = format!("{BOILERPLATE_LINE}\n{BOILERPLATE_LINE}\n");
        let b = write(root, "v1/b_v1.k", &twice);

        dedupe_boilerplate(root);

        assert_eq!(fs::read_to_string(&b).unwrap(), format!("\n{BOILERPLATE_LINE}\n"));
    }

    #[test]
    fn test_dedupe_handles_non_utf8_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("v1")).unwrap();
        let a = root.join("v1/a_v1.k");
        let c = root.join("v1/c_v1.k");
        fs::write(&a, b"# descr\xe9\nregex_match = regex.match\n").unwrap();
        let b = write(root, "v1/b_v1.k", GENERATED);
        fs::write(&c, b"\xffregex_match = regex.match\n").unwrap();

        let report = dedupe_boilerplate(root);

        assert_eq!(report.rewritten, vec![b, c.clone()]);
        assert_eq!(count_boilerplate(&root.join("v1")), 1);
        assert_eq!(fs::read(&a).unwrap(), b"# descr\xe9\nregex_match = regex.match\n");
        assert_eq!(fs::read(&c).unwrap(), b"\xff\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_dedupe_reports_unwritable_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "v1/a_v1.k", GENERATED);
        let locked = write(root, "v1/b_v1.k", GENERATED);
        let c = write(root, "v1/c_v1.k", GENERATED);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o444)).unwrap();

        // Permission bits are not enforced for root
        if fs::OpenOptions::new().write(true).open(&locked).is_ok() {
            return;
        }

        let report = dedupe_boilerplate(root);

        assert_eq!(report.failed, vec![locked.clone()]);
        assert_eq!(report.rewritten, vec![c]);
        assert_eq!(fs::read_to_string(&locked).unwrap(), GENERATED);

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
    }

    #[test]
    fn test_dedupe_skips_files_without_line() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let plain = "schema Plain:\n    name: str\n";
        let a = write(root, "v1/a_v1.k", plain);
        let b = write(root, "v1/b_v1.k", GENERATED);

        let report = dedupe_boilerplate(root);

        // a has no helper, so b holds the one copy
        assert!(report.rewritten.is_empty());
        assert_eq!(fs::read_to_string(&a).unwrap(), plain);
        assert_eq!(fs::read_to_string(&b).unwrap(), GENERATED);
    }

    #[test]
    fn test_dedupe_is_scoped_per_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "v1/a_v1.k", GENERATED);
        write(root, "v1/b_v1.k", GENERATED);
        let beta = write(root, "v1beta1/a_v1beta1.k", GENERATED);
        let unknown_a = write(root, "unknown/a.k", GENERATED);
        let unknown_b = write(root, "unknown/b.k", GENERATED);

        dedupe_boilerplate(root);

        assert_eq!(count_boilerplate(&root.join("v1")), 1);
        assert_eq!(fs::read_to_string(&beta).unwrap(), GENERATED);
        assert_eq!(fs::read_to_string(&unknown_a).unwrap(), GENERATED);
        assert_eq!(fs::read_to_string(&unknown_b).unwrap(), GENERATED);
    }

    #[test]
    fn test_dedupe_is_stable_on_rerun() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "v2/a_v2.k", GENERATED);
        write(root, "v2/b_v2.k", GENERATED);

        assert_eq!(dedupe_boilerplate(root).rewritten.len(), 1);
        assert!(dedupe_boilerplate(root).rewritten.is_empty());
        assert_eq!(count_boilerplate(&root.join("v2")), 1);
    }

    #[test]
    fn test_organize_then_dedupe_across_sources() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "staging/widget_v1.k", GENERATED);
        write(root, "staging/gadget_v1beta1.k", GENERATED);
        write(root, "staging/extra_v1.k", GENERATED);

        let report = organize(root).unwrap();

        let extra = fs::read_to_string(root.join("v1/extra_v1.k")).unwrap();
        let widget = fs::read_to_string(root.join("v1/widget_v1.k")).unwrap();
        let gadget = fs::read_to_string(root.join("v1beta1/gadget_v1beta1.k")).unwrap();

        assert!(extra.contains(BOILERPLATE_LINE));
        assert!(!widget.contains(BOILERPLATE_LINE));
        assert!(gadget.contains(BOILERPLATE_LINE));
        assert_eq!(report.deduplicated, vec![root.join("v1/widget_v1.k")]);
        assert!(report.dedupe_failed.is_empty());
    }
}
