//! Remove target folders from disk

use super::{ApplyStrategy, Outcome};
use crate::error::Result;
use crate::scanner::ScanEvent;
use crate::utils;
use std::path::Path;
use walkdir::WalkDir;

/// Deletes each target folder, tolerating entries that refuse to go
#[derive(Debug, Default)]
pub struct DeleteTarget;

impl DeleteTarget {
    pub fn new() -> Self {
        Self
    }
}

impl ApplyStrategy for DeleteTarget {
    fn apply(&mut self, event: &ScanEvent) -> Result<Outcome> {
        Ok(remove_target(&event.path))
    }
}

/// Remove `path` and everything under it.
///
/// A path that no longer exists is left alone. When the fast removal fails,
/// the tree is removed entry by entry and whatever cannot be deleted is
/// counted and left in place.
pub fn remove_target(path: &Path) -> Outcome {
    if utils::safe_symlink_metadata(path).is_err() {
        return Outcome::Unchanged;
    }

    if utils::safe_remove_dir_all(path).is_ok() {
        return Outcome::Changed;
    }

    match remove_best_effort(path) {
        0 => Outcome::Changed,
        failed => Outcome::Partial { failed },
    }
}

/// Bottom-up removal that keeps going past failures; returns the failure count
fn remove_best_effort(path: &Path) -> usize {
    let mut failed = 0;

    for entry in WalkDir::new(path).follow_links(false).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => {
                failed += 1;
                continue;
            }
        };

        let removed = if entry.file_type().is_dir() {
            utils::safe_remove_dir(entry.path())
        } else {
            // Directory symlinks on Windows need remove_dir
            utils::safe_remove_file(entry.path()).or_else(|_| utils::safe_remove_dir(entry.path()))
        };
        if removed.is_err() && utils::safe_symlink_metadata(entry.path()).is_ok() {
            failed += 1;
        }
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn populated_target(root: &Path) -> std::path::PathBuf {
        let target = root.join("node_modules");
        fs::create_dir_all(target.join("pkg").join("lib")).unwrap();
        fs::write(target.join("pkg").join("index.js"), "module.exports = 1;").unwrap();
        fs::write(target.join("pkg").join("lib").join("a.js"), "").unwrap();
        target
    }

    #[test]
    fn test_delete_removes_tree() {
        let temp_dir = create_test_dir();
        let target = populated_target(temp_dir.path());

        let mut strategy = DeleteTarget::new();
        let outcome = strategy
            .apply(&ScanEvent {
                path: target.clone(),
                relative: "node_modules".into(),
            })
            .unwrap();

        assert_eq!(outcome, Outcome::Changed);
        assert!(!target.exists());
        assert!(temp_dir.path().exists());
    }

    #[test]
    fn test_delete_twice_is_noop() {
        let temp_dir = create_test_dir();
        let target = populated_target(temp_dir.path());

        assert_eq!(remove_target(&target), Outcome::Changed);
        assert_eq!(remove_target(&target), Outcome::Unchanged);
    }

    #[test]
    fn test_delete_missing_path() {
        let temp_dir = create_test_dir();
        let missing = temp_dir.path().join("venv");
        assert_eq!(remove_target(&missing), Outcome::Unchanged);
    }

    #[test]
    fn test_best_effort_removal_of_plain_tree() {
        let temp_dir = create_test_dir();
        let target = populated_target(temp_dir.path());

        assert_eq!(remove_best_effort(&target), 0);
        assert!(!target.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_delete_partial_when_entries_refuse() {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};

        let temp_dir = create_test_dir();
        // Permission bits do not stop root
        if fs::metadata(temp_dir.path()).unwrap().uid() == 0 {
            return;
        }
        let target = populated_target(temp_dir.path());
        let locked = target.join("pkg");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let outcome = remove_target(&target);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(outcome, Outcome::Partial { failed } if failed > 0));
        assert!(outcome.changed());
        assert!(locked.join("index.js").exists());
        assert!(!locked.join("lib").join("a.js").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_delete_does_not_follow_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = create_test_dir();
        let keep = temp_dir.path().join("keep");
        fs::create_dir(&keep).unwrap();
        fs::write(keep.join("important.txt"), "data").unwrap();

        let target = temp_dir.path().join("venv");
        fs::create_dir(&target).unwrap();
        symlink(&keep, target.join("link")).unwrap();

        assert_eq!(remove_target(&target), Outcome::Changed);
        assert!(!target.exists());
        assert!(keep.join("important.txt").exists());
    }
}
