//! Sequential walk that finds target folders under a root
//!
//! A matched folder is yielded and never entered, so `node_modules/foo/venv`
//! is not reported on its own. Entries are visited in file-name order, which
//! keeps the counting pass and the apply pass aligned on an unchanged tree.

use crate::targets;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// A target folder found during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEvent {
    /// Full path of the folder
    pub path: PathBuf,
    /// Same folder relative to the scan root
    pub relative: PathBuf,
}

/// A directory the walk could not read
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDir {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of the counting pass
#[derive(Debug, Clone, Default)]
pub struct ScanCount {
    pub targets: usize,
    pub skipped: Vec<SkippedDir>,
}

type DirFilter = fn(&DirEntry) -> bool;

fn only_dirs(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
}

/// Lazy iterator over the target folders under a root
///
/// Unreadable directories are recorded in [`Scanner::skipped`] and the walk
/// moves on.
pub struct Scanner {
    root: PathBuf,
    walker: FilterEntry<walkdir::IntoIter, DirFilter>,
    skipped: Vec<SkippedDir>,
}

impl Scanner {
    pub fn new(root: &Path) -> Self {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(only_dirs as DirFilter);

        Self {
            root: root.to_path_buf(),
            walker,
            skipped: Vec::new(),
        }
    }

    /// Directories skipped so far
    pub fn skipped(&self) -> &[SkippedDir] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<SkippedDir> {
        self.skipped
    }
}

impl Iterator for Scanner {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    self.skipped.push(SkippedDir {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if !targets::is_target_os(entry.file_name()) {
                continue;
            }

            // Matched folders are opaque
            self.walker.skip_current_dir();

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path().to_path_buf());
            return Some(ScanEvent {
                path: entry.into_path(),
                relative,
            });
        }
    }
}

/// Walk once to count the targets under `root`
pub fn count_targets(root: &Path) -> ScanCount {
    let mut scanner = Scanner::new(root);
    let targets = scanner.by_ref().count();
    ScanCount {
        targets,
        skipped: scanner.into_skipped(),
    }
}
