//! Append target folders to the project's ignore file

use super::{ApplyStrategy, Outcome};
use crate::error::{Result, SweepError};
use crate::scanner::ScanEvent;
use crate::utils;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default ignore file name
pub const IGNORE_FILE: &str = ".gitignore";

/// Ignore entry for a root-relative folder path: `a/b/venv/`
pub fn ignore_entry(relative: &Path) -> Option<String> {
    utils::to_slash_path(relative).map(|p| p + "/")
}

/// Read the trimmed, non-empty lines of an ignore file.
///
/// A missing file yields an empty set.
pub fn load_existing_entries(path: &Path) -> io::Result<HashSet<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(e) => Err(e),
    }
}

/// Appends one line per folder not already listed in the ignore file
///
/// The file is held open in append mode for the life of the value and closed
/// on drop. Every line is flushed as soon as it is written.
pub struct RecordIgnore {
    path: PathBuf,
    file: File,
    existing: HashSet<String>,
    /// Last line of the file has no terminating newline yet
    needs_newline: bool,
}

impl RecordIgnore {
    /// Open `root/<file_name>`, creating it if missing
    pub fn open(root: &Path, file_name: &str) -> Result<Self> {
        let path = root.join(file_name);
        let wrap = |source| SweepError::IgnoreFile {
            path: path.clone(),
            source,
        };

        let existing = load_existing_entries(&path).map_err(wrap)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(wrap)?;
        let needs_newline = !ends_with_newline_or_empty(&path).map_err(wrap)?;

        Ok(Self {
            path,
            file,
            existing,
            needs_newline,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, entry: &str) -> io::Result<()> {
        // Keep the first new entry off an unterminated last line
        if self.needs_newline {
            self.file.write_all(b"\n")?;
            self.needs_newline = false;
        }
        self.file.write_all(entry.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()
    }
}

fn ends_with_newline_or_empty(path: &Path) -> io::Result<bool> {
    let content = fs::read(path)?;
    Ok(content.last().map_or(true, |b| *b == b'\n'))
}

impl ApplyStrategy for RecordIgnore {
    fn apply(&mut self, event: &ScanEvent) -> Result<Outcome> {
        let Some(entry) = ignore_entry(&event.relative) else {
            return Ok(Outcome::Unchanged);
        };
        if self.existing.contains(&entry) {
            return Ok(Outcome::Unchanged);
        }

        self.append(&entry).map_err(|source| SweepError::IgnoreFile {
            path: self.path.clone(),
            source,
        })?;
        self.existing.insert(entry);
        Ok(Outcome::Changed)
    }
}
