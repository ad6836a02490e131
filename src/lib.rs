//! depsweep library crate
//!
//! Finds dependency and virtual environment folders (`node_modules`, `venv`,
//! `.venv`, `env`, `.env`) under a project root and either appends them to the
//! project's ignore file or deletes them, with a live two-line progress
//! display. The CLI binary is a thin layer over [`sweep::Sweep`].

pub mod apply;
pub mod cli;
pub mod error;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod sweep;
pub mod targets;
pub mod theme;
pub mod utils;

pub use apply::{ApplyStrategy, DeleteTarget, Mode, Outcome, RecordIgnore};
pub use error::SweepError;
pub use scanner::{count_targets, ScanEvent, Scanner};
pub use sweep::{resolve_root, RunSummary, Sweep, SweepOptions};
