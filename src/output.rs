use crate::apply::Mode;
use crate::sweep::RunSummary;
use crate::theme::Theme;
use crate::utils;
use serde::Serialize;

/// Output verbosity mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,       // Only errors
    #[default]
    Normal,      // Standard output
    Verbose,     // Skip and partial-removal counts
    VeryVerbose, // Every skipped directory
}

#[derive(Serialize)]
struct JsonResults<'a> {
    version: &'static str,
    timestamp: String,
    summary: &'a RunSummary,
    message: &'static str,
}

/// Print the end-of-run report
pub fn print_summary(summary: &RunSummary, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }

    let changes = summary.changes.to_string();
    let processed = summary.processed.to_string();
    let line = match summary.mode {
        Mode::Record => format!(
            "{} new ignore entries, {} folders found",
            Theme::value(&changes),
            Theme::value(&processed)
        ),
        Mode::Delete => format!(
            "{} folders deleted, {} folders found",
            Theme::value(&changes),
            Theme::value(&processed)
        ),
    };
    println!("{}", line);

    if mode == OutputMode::Normal {
        return;
    }

    if summary.partial > 0 {
        eprintln!(
            "{} {} folders were only partly removed",
            Theme::error("Error:"),
            Theme::value(&summary.partial.to_string())
        );
    }
    if !summary.skipped_dirs.is_empty() {
        eprintln!(
            "{} {} directories could not be read and were skipped",
            Theme::warning("Warning:"),
            Theme::value(&summary.skipped_dirs.len().to_string())
        );
    }
    if mode == OutputMode::VeryVerbose {
        for skipped in &summary.skipped_dirs {
            eprintln!(
                "  {} {}",
                Theme::secondary(&utils::display_path(&skipped.path)),
                Theme::muted(&skipped.reason)
            );
        }
    }
}

fn render_json(summary: &RunSummary) -> serde_json::Result<String> {
    let results = JsonResults {
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        summary,
        message: summary.mode.summary_message(summary.changes),
    };
    serde_json::to_string_pretty(&results)
}

/// Print the run summary as JSON
pub fn print_json(summary: &RunSummary) -> anyhow::Result<()> {
    println!("{}", render_json(summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_json_lists_root_and_mode_once() {
        let summary = RunSummary {
            root: PathBuf::from("/work/proj"),
            mode: Mode::Delete,
            counted: 3,
            processed: 3,
            changes: 2,
            partial: 1,
            skipped_dirs: Vec::new(),
            elapsed_ms: 12,
        };

        let value: serde_json::Value = serde_json::from_str(&render_json(&summary).unwrap()).unwrap();
        let top = value.as_object().unwrap();
        assert!(!top.contains_key("root"));
        assert!(!top.contains_key("mode"));
        assert_eq!(value["summary"]["root"], "/work/proj");
        assert_eq!(value["summary"]["mode"], "delete");
        assert_eq!(value["summary"]["partial"], 1);
        assert_eq!(value["message"], "deletions finished");
    }
}
