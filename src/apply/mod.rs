//! What happens to each target folder: recorded in the ignore file, or deleted

pub mod delete;
pub mod record;

use crate::error::Result;
use crate::scanner::ScanEvent;
use serde::Serialize;
use std::fmt;

pub use delete::DeleteTarget;
pub use record::RecordIgnore;

/// Action applied to every target folder of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Append the folder to the ignore file
    #[default]
    Record,
    /// Remove the folder and everything in it
    Delete,
}

impl Mode {
    /// Final status message for a finished run
    pub fn summary_message(self, changes: usize) -> &'static str {
        match (self, changes) {
            (Mode::Record, 0) => "no new folder",
            (Mode::Record, _) => "ignore file updated",
            (Mode::Delete, 0) => "nothing deleted",
            (Mode::Delete, _) => "deletions finished",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Record => write!(f, "record"),
            Mode::Delete => write!(f, "delete"),
        }
    }
}

/// Result of applying a strategy to one folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    /// Already recorded, or already gone
    Unchanged,
    /// Folder removed only in part; `failed` entries could not be deleted
    Partial { failed: usize },
}

impl Outcome {
    pub fn changed(self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }
}

/// A per-folder action, chosen once per run
pub trait ApplyStrategy {
    fn apply(&mut self, event: &ScanEvent) -> Result<Outcome>;
}
