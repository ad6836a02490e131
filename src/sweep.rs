//! One run: count targets, apply the chosen mode to each, report
//!
//! The counting walk and the apply walk are independent, so the tree may
//! change in between. Progress copes with that through
//! [`ProgressState::advance`], and both strategies tolerate folders that are
//! already handled or already gone.

use crate::apply::{ApplyStrategy, DeleteTarget, Mode, Outcome, RecordIgnore};
use crate::apply::record::{ignore_entry, IGNORE_FILE};
use crate::error::{Result, SweepError};
use crate::output::OutputMode;
use crate::progress::{self, ProgressReporter, ProgressState};
use crate::scanner::{self, ScanEvent, Scanner, SkippedDir};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Pause after each redraw so the display can be followed by eye
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

/// Options controlling a run
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub mode: Mode,
    /// Ignore file name, relative to the root
    pub ignore_file: String,
    pub delay: Duration,
    pub output: OutputMode,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Record,
            ignore_file: IGNORE_FILE.to_string(),
            delay: DEFAULT_DELAY,
            output: OutputMode::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Counting,
    Applying,
    Summarizing,
    Done,
}

/// What a finished run did
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub root: PathBuf,
    pub mode: Mode,
    /// Targets seen by the counting walk
    pub counted: usize,
    /// Targets handed to the strategy
    pub processed: usize,
    /// Folders recorded or deleted
    pub changes: usize,
    /// Folders only partly deleted
    pub partial: usize,
    pub skipped_dirs: Vec<SkippedDir>,
    pub elapsed_ms: u64,
}

/// Turn user input into the scan root.
///
/// Surrounding whitespace and one pair of quotes are dropped. The result
/// must be an existing directory.
pub fn resolve_root(raw: &str) -> Result<PathBuf> {
    let trimmed = strip_quotes(raw.trim());
    if trimmed.is_empty() {
        return Err(SweepError::EmptyPath);
    }

    let path = PathBuf::from(trimmed);
    match fs::canonicalize(&path) {
        Ok(root) if root.is_dir() => Ok(root),
        Ok(root) => Err(SweepError::NotADirectory(root)),
        Err(_) => Err(SweepError::NotADirectory(path)),
    }
}

/// Drop one leading and one trailing quote character
pub fn strip_quotes(raw: &str) -> &str {
    let raw = raw.strip_prefix(['"', '\'']).unwrap_or(raw);
    raw.strip_suffix(['"', '\'']).unwrap_or(raw)
}

pub struct Sweep<W: Write> {
    root: PathBuf,
    options: SweepOptions,
    reporter: Option<ProgressReporter<W>>,
    state: ProgressState,
    phase: Phase,
}

impl<W: Write> Sweep<W> {
    /// A run without live display. `root` should come from [`resolve_root`].
    pub fn new(root: PathBuf, options: SweepOptions) -> Self {
        Self {
            root,
            options,
            reporter: None,
            state: ProgressState::default(),
            phase: Phase::Idle,
        }
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter<W>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run every phase and give back the reporter for the caller's banners
    pub fn run(mut self) -> Result<(RunSummary, Option<ProgressReporter<W>>)> {
        let started = Instant::now();
        let counted = self.count();

        let mut strategy: Box<dyn ApplyStrategy> = match self.options.mode {
            Mode::Record => Box::new(RecordIgnore::open(&self.root, &self.options.ignore_file)?),
            Mode::Delete => Box::new(DeleteTarget::new()),
        };

        let mut scanner = Scanner::new(&self.root);
        let tally = self.apply_all(strategy.as_mut(), scanner.by_ref(), counted, started)?;
        // Closes the ignore file
        drop(strategy);

        let summary = self.summarize(counted, tally, scanner.into_skipped(), started)?;
        Ok((summary, self.reporter))
    }

    fn count(&mut self) -> usize {
        self.phase = Phase::Counting;
        let spinner = match (&self.reporter, self.options.output) {
            (Some(_), mode) if mode != OutputMode::Quiet => {
                Some(progress::create_spinner("Counting target folders..."))
            }
            _ => None,
        };

        let count = scanner::count_targets(&self.root);

        if let Some(sp) = spinner {
            progress::finish_and_clear(&sp);
        }
        count.targets
    }

    /// Apply `strategy` to each event, redrawing after every one
    pub fn apply_all<I>(
        &mut self,
        strategy: &mut dyn ApplyStrategy,
        events: I,
        total: usize,
        started: Instant,
    ) -> Result<Tally>
    where
        I: Iterator<Item = ScanEvent>,
    {
        self.phase = Phase::Applying;
        self.state = ProgressState::new(total);
        let mut tally = Tally::default();

        if let Some(reporter) = self.reporter.as_mut() {
            reporter.begin()?;
            reporter.render("-", &self.state, started)?;
        }

        for event in events {
            let outcome = match strategy.apply(&event) {
                Ok(outcome) => outcome,
                Err(err) => {
                    // Leave the live rows so the error prints on its own line
                    if let Some(reporter) = self.reporter.as_mut() {
                        reporter.abort()?;
                    }
                    return Err(err);
                }
            };
            tally.record(outcome);

            let label = ignore_entry(&event.relative)
                .unwrap_or_else(|| event.relative.display().to_string());
            self.state.advance(label);

            if let Some(reporter) = self.reporter.as_mut() {
                reporter.tick(&self.state, started)?;
                if !self.options.delay.is_zero() {
                    thread::sleep(self.options.delay);
                }
            }
        }

        Ok(tally)
    }

    fn summarize(
        &mut self,
        counted: usize,
        tally: Tally,
        skipped_dirs: Vec<SkippedDir>,
        started: Instant,
    ) -> Result<RunSummary> {
        self.phase = Phase::Summarizing;
        let mode = self.options.mode;
        self.state.finish();

        if let Some(reporter) = self.reporter.as_mut() {
            reporter.finish(mode.summary_message(tally.changes), &self.state, started)?;
        }

        self.phase = Phase::Done;
        Ok(RunSummary {
            root: self.root.clone(),
            mode,
            counted,
            processed: self.state.done,
            changes: tally.changes,
            partial: tally.partial,
            skipped_dirs,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Outcome counts for the apply walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub changes: usize,
    pub partial: usize,
}

impl Tally {
    fn record(&mut self, outcome: Outcome) {
        if outcome.changed() {
            self.changes += 1;
        }
        if let Outcome::Partial { .. } = outcome {
            self.partial += 1;
        }
    }
}

/// Run a sweep over `root` with no live display
pub fn sweep_quiet(root: &Path, options: SweepOptions) -> Result<RunSummary> {
    let (summary, _) = Sweep::<std::io::Sink>::new(root.to_path_buf(), options).run()?;
    Ok(summary)
}
