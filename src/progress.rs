//! Live two-line progress display
//!
//! The display owns two terminal rows: a status row (spinner and last entry)
//! and a progress row (bar, percent, elapsed, remaining). Each redraw moves
//! the cursor back up and rewrites both rows in place. Rows are padded to the
//! widest row drawn so far in the run so a shorter redraw leaves nothing
//! behind from a longer one.

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::queue;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cells in the progress bar
pub const BAR_WIDTH: usize = 20;

/// Terminal width used when the real one cannot be detected
pub const FALLBACK_WIDTH: usize = 120;

pub const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Glyph shown in place of the spinner once the run is over
pub const DONE_GLYPH: &str = "OK";

/// Create a spinner for indeterminate progress
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Finish and clear progress bar
pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}

/// Format a duration as `HHhMMmSSs`, `MMmSSs` or `SSs`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (h, rem) = (secs / 3600, secs % 3600);
    let (m, s) = (rem / 60, rem % 60);
    if h > 0 {
        format!("{:02}h{:02}m{:02}s", h, m, s)
    } else if m > 0 {
        format!("{:02}m{:02}s", m, s)
    } else {
        format!("{:02}s", s)
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    pub done: usize,
    pub total: usize,
    pub message: String,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            done: 0,
            total,
            message: String::from("waiting"),
        }
    }

    /// Count one processed entry.
    ///
    /// `total` comes from a walk made before any entry was processed, so the
    /// tree may have gained targets since. It is raised to keep `done <= total`.
    pub fn advance(&mut self, message: impl Into<String>) {
        self.done += 1;
        self.total = self.total.max(self.done);
        self.message = message.into();
    }

    /// Settle the counters at the end of a run so the bar reads 100%
    pub fn finish(&mut self) {
        self.total = self.done;
    }

    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            self.done as f64 / self.total as f64 * 100.0
        } else {
            100.0
        }
    }

    /// Remaining time, extrapolated from the average time per entry so far
    pub fn eta(&self, elapsed: Duration) -> Duration {
        if self.done == 0 {
            return Duration::ZERO;
        }
        let remaining = self.total.saturating_sub(self.done) as f64;
        Duration::from_secs_f64(elapsed.as_secs_f64() * remaining / self.done as f64)
    }
}

/// Renders [`ProgressState`] as a two-row block redrawn in place
pub struct ProgressReporter<W: Write> {
    out: W,
    width: Option<usize>,
    max_status: usize,
    max_progress: usize,
    frame: usize,
}

impl<W: Write> ProgressReporter<W> {
    /// Reporter that follows the terminal width
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: None,
            max_status: 0,
            max_progress: 0,
            frame: 0,
        }
    }

    /// Reporter with a fixed width
    pub fn with_width(out: W, width: usize) -> Self {
        Self {
            width: Some(width),
            ..Self::new(out)
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn term_width(&self) -> usize {
        self.width.unwrap_or_else(|| {
            terminal::size()
                .ok()
                .map(|(cols, _)| cols as usize)
                .filter(|cols| *cols > 0)
                .unwrap_or(FALLBACK_WIDTH)
        })
    }

    /// Reserve the status row. Call once before the first redraw.
    pub fn begin(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()
    }

    /// Next spinner glyph
    pub fn spin(&mut self) -> &'static str {
        let glyph = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        self.frame = self.frame.wrapping_add(1);
        glyph
    }

    /// Build both rows, truncated to the terminal and padded to the widest
    /// rows drawn so far.
    pub fn compose(
        &mut self,
        status: &str,
        state: &ProgressState,
        elapsed: Duration,
    ) -> (String, String) {
        let percent = state.percent();
        let filled = ((percent / 100.0 * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));
        let progress = format!(
            "[{}] {:5.1}% | elapsed {} | remaining {}",
            bar,
            percent,
            format_duration(elapsed),
            format_duration(state.eta(elapsed))
        );

        let width = self.term_width();
        let status = truncate(status, width);
        let progress = truncate(&progress, width);

        self.max_status = self.max_status.max(status.width());
        self.max_progress = self.max_progress.max(progress.width());
        (
            pad(status, self.max_status),
            pad(progress, self.max_progress),
        )
    }

    fn draw(&mut self, status: &str, progress: &str) -> io::Result<()> {
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            MoveUp(1),
            Clear(ClearType::CurrentLine),
            Print(status),
            Print("\n"),
            Clear(ClearType::CurrentLine),
            Print(progress)
        )?;
        self.out.flush()
    }

    /// Redraw with `glyph` and the last processed entry
    pub fn render(
        &mut self,
        glyph: &str,
        state: &ProgressState,
        started: Instant,
    ) -> io::Result<()> {
        let message = state.message.replace(['\n', '\r'], " ");
        let status = format!("{} Processing | last entry: {}", glyph, message);
        let (status, progress) = self.compose(&status, state, started.elapsed());
        self.draw(&status, &progress)
    }

    /// Redraw with the next spinner glyph
    pub fn tick(&mut self, state: &ProgressState, started: Instant) -> io::Result<()> {
        let glyph = self.spin();
        self.render(glyph, state, started)
    }

    /// Last redraw with the run summary, then leave the live rows behind
    pub fn finish(
        &mut self,
        summary: &str,
        state: &ProgressState,
        started: Instant,
    ) -> io::Result<()> {
        let status = format!("{} Done | {}", DONE_GLYPH, summary.replace(['\n', '\r'], " "));
        let (status, progress) = self.compose(&status, state, started.elapsed());
        self.draw(&status, &progress)?;
        self.abort()
    }

    /// Move below the live rows without redrawing them
    pub fn abort(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

/// Cut `text` so it fits in `width` cells, ending with `...`.
///
/// Text reaching the full width is cut too, so the cursor never wraps.
fn truncate(text: &str, width: usize) -> String {
    if width == 0 || text.width() < width {
        return text.to_string();
    }

    let keep = width.saturating_sub(4).max(1);
    let mut used = 0;
    let mut cut = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > keep {
            break;
        }
        used += w;
        cut.push(ch);
    }
    cut.push_str("...");
    cut
}

fn pad(text: String, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    text + &" ".repeat(fill)
}
