use anyhow::Result;
use depsweep::cli::{self, Cli};
use std::env;

fn main() -> Result<()> {
    // No arguments at all: ask for the path and mode instead
    let args: Vec<String> = env::args().collect();
    if args.len() == 1 {
        cli::run_interactive()?;
        return Ok(());
    }

    let cli = Cli::parse();
    cli.run()
}
