//! `qmt reset` command - Drop persisted data and start over from the seed

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, load_config};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ResetArgs {
    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: ResetArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let bridge = config.bridge().into_diagnostic()?;

    let prompt = format!(
        "Delete all saved records under '{}' in {}?",
        bridge.key(),
        config.data_dir().display()
    );
    if !confirm(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    bridge.clear().into_diagnostic()?;
    tracing::info!(key = bridge.key(), "cleared persisted state");
    if !global.quiet {
        println!(
            "{} Cleared saved data; the next command starts from the sample records",
            style("✓").green()
        );
    }
    Ok(())
}
