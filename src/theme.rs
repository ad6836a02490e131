//! Console message styling

use colored::{ColoredString, Colorize};

pub struct Theme;

impl Theme {
    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn success(text: &str) -> ColoredString {
        text.green().bold()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red().bold()
    }

    pub fn value(text: &str) -> ColoredString {
        text.cyan().bold()
    }

    /// Paths and other secondary details
    pub fn secondary(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }
}
