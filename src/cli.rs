use anyhow::Context;
use clap::{ArgAction, Parser};
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::apply::record::IGNORE_FILE;
use crate::apply::Mode;
use crate::output::{self, OutputMode};
use crate::progress::ProgressReporter;
use crate::sweep::{self, Sweep, SweepOptions};
use crate::theme::Theme;
use crate::utils;

#[derive(Parser)]
#[command(name = "depsweep")]
#[command(version)]
#[command(about = "Ignore or delete dependency and virtualenv folders in a project")]
#[command(long_about = "depsweep walks a project tree looking for node_modules, venv, .venv, \
    env and .env folders. Each one found is either appended to the project's .gitignore \
    or deleted.\n\n\
    Run without arguments for interactive prompts.\n\n\
    Examples:\n  \
    depsweep .                       # Record folders in ./.gitignore\n  \
    depsweep ~/code/app --delete     # Delete the folders\n  \
    depsweep . --ignore-file .dockerignore")]
pub struct Cli {
    /// Project directory to scan
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: String,

    /// What to do with each folder found
    #[arg(short = 'm', long, value_enum, default_value_t = Mode::Record)]
    pub mode: Mode,

    /// Shorthand for --mode delete
    #[arg(short = 'd', long)]
    pub delete: bool,

    /// Ignore file to append to, relative to PATH
    #[arg(long, default_value = IGNORE_FILE, value_name = "NAME")]
    pub ignore_file: String,

    /// Pause after each folder so the progress can be followed (0 to disable)
    #[arg(long, default_value_t = 50, value_name = "MS")]
    pub delay_ms: u64,

    /// Print the run summary as JSON instead of the live display
    #[arg(long)]
    pub json: bool,

    /// Increase output verbosity (-v, -vv for more)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    fn output_mode(&self) -> OutputMode {
        if self.quiet {
            OutputMode::Quiet
        } else if self.verbose >= 2 {
            OutputMode::VeryVerbose
        } else if self.verbose == 1 {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }

    pub fn options(&self) -> SweepOptions {
        SweepOptions {
            mode: if self.delete { Mode::Delete } else { self.mode },
            ignore_file: self.ignore_file.clone(),
            delay: Duration::from_millis(self.delay_ms),
            output: self.output_mode(),
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let options = self.options();
        run_sweep(&self.path, options, self.json)
    }
}

/// Prompt for the root and the mode on stdin, then run
pub fn run_interactive() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let (path, mode) = ask(&mut input, &mut stdout, &cwd.to_string_lossy())?;

    let options = SweepOptions {
        mode,
        ..SweepOptions::default()
    };
    run_sweep(&path, options, false)
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> io::Result<String> {
    write!(out, "{}", question)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Interactive questions. Returns the raw root path and the chosen mode.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, cwd: &str) -> io::Result<(String, Mode)> {
    writeln!(out, "Current directory: {}", cwd)?;
    let change = prompt(input, out, "Use another path? (y/N): ")?.to_lowercase();

    let mut path = cwd.to_string();
    if matches!(change.as_str(), "y" | "yes" | "o" | "oui") {
        let raw = prompt(input, out, "Project path to clean: ")?;
        let cleaned = sweep::strip_quotes(&raw);
        if !cleaned.is_empty() {
            path = cleaned.to_string();
        }
    }

    writeln!(out, "Available modes:")?;
    writeln!(out, "  1) Add to {} (default)", IGNORE_FILE)?;
    writeln!(out, "  2) Delete the folders found")?;
    let choice = prompt(input, out, "Your choice (1/2): ")?;
    let mode = if choice == "2" { Mode::Delete } else { Mode::Record };

    Ok((path, mode))
}

fn run_sweep(raw_path: &str, options: SweepOptions, json: bool) -> anyhow::Result<()> {
    let root = sweep::resolve_root(raw_path)?;
    let output_mode = options.output;
    let live = !json && output_mode != OutputMode::Quiet;

    if live {
        println!(
            "{} {}",
            Theme::muted("Using path:"),
            Theme::secondary(&utils::display_path(&root))
        );
        if options.mode == Mode::Delete {
            println!("{}", Theme::warning("Delete mode: folders found will be removed"));
        }
        println!("{}", Theme::header("Scan started"));
    }

    let mut run = Sweep::new(root, options);
    if live {
        run = run.with_reporter(ProgressReporter::new(io::stdout()));
    }
    let (summary, _) = run.run().context("Sweep failed")?;

    if json {
        return output::print_json(&summary);
    }
    if live {
        println!("{}", Theme::success("Scan finished"));
    }
    output::print_summary(&summary, output_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn answers(text: &str) -> (String, Mode, String) {
        let mut input = Cursor::new(text.as_bytes().to_vec());
        let mut out = Vec::new();
        let (path, mode) = ask(&mut input, &mut out, "/work/proj").unwrap();
        (path, mode, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_ask_defaults() {
        let (path, mode, shown) = answers("\n\n");
        assert_eq!(path, "/work/proj");
        assert_eq!(mode, Mode::Record);
        assert!(shown.contains("Current directory: /work/proj"));
    }

    #[test]
    fn test_ask_other_path_and_delete() {
        let (path, mode, _) = answers("oui\n'/tmp/other dir'\n2\n");
        assert_eq!(path, "/tmp/other dir");
        assert_eq!(mode, Mode::Delete);
    }

    #[test]
    fn test_ask_blank_other_path_keeps_cwd() {
        let (path, _, _) = answers("y\n\n1\n");
        assert_eq!(path, "/work/proj");
    }

    #[test]
    fn test_ask_unknown_choice_is_record() {
        let (_, mode, _) = answers("n\n3\n");
        assert_eq!(mode, Mode::Record);
    }

    #[test]
    fn test_ask_eof() {
        let (path, mode, _) = answers("");
        assert_eq!(path, "/work/proj");
        assert_eq!(mode, Mode::Record);
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from(["depsweep", "proj", "--delete", "-v", "--delay-ms", "0"]).unwrap();
        let options = cli.options();
        assert_eq!(cli.path, "proj");
        assert_eq!(options.mode, Mode::Delete);
        assert_eq!(options.output, OutputMode::Verbose);
        assert!(options.delay.is_zero());
        assert_eq!(options.ignore_file, IGNORE_FILE);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["depsweep"]).unwrap();
        let options = cli.options();
        assert_eq!(cli.path, ".");
        assert_eq!(options.mode, Mode::Record);
        assert_eq!(options.output, OutputMode::Normal);
        assert_eq!(options.delay, Duration::from_millis(50));
    }

    #[test]
    fn test_cli_mode_value() {
        let cli = Cli::try_parse_from(["depsweep", "--mode", "delete", "-q"]).unwrap();
        assert_eq!(cli.options().mode, Mode::Delete);
        assert_eq!(cli.options().output, OutputMode::Quiet);
        assert!(Cli::try_parse_from(["depsweep", "--mode", "purge"]).is_err());
        assert!(Cli::try_parse_from(["depsweep", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_run_sweep_rejects_bad_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing");
        let options = SweepOptions {
            output: OutputMode::Quiet,
            ..SweepOptions::default()
        };
        assert!(run_sweep(missing.to_str().unwrap(), options, false).is_err());
    }
}
