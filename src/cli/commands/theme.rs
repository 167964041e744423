//! `qmt theme` command - Dark mode preference

use console::style;
use miette::Result;

use crate::cli::helpers::Session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::reducer::Action;

#[derive(clap::Args, Debug)]
pub struct ThemeArgs {
    /// Print the current mode without toggling
    #[arg(long)]
    pub show: bool,
}

fn mode_name(dark: bool) -> &'static str {
    if dark {
        "dark"
    } else {
        "light"
    }
}

pub fn run(args: ThemeArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let dark = if args.show {
        session.state().dark_mode
    } else {
        session.dispatch(Action::ToggleDarkMode).dark_mode
    };

    match global.format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "darkMode": dark })),
        _ if global.quiet || args.show => println!("{}", mode_name(dark)),
        _ => println!(
            "{} Switched to {} mode",
            style("✓").green(),
            style(mode_name(dark)).bold()
        ),
    }
    Ok(())
}
