//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, dispatch::DispatchArgs, doc::DocCommands, export::ExportArgs,
    kpi::KpiCommands, ncr::NcrCommands, opp::OppCommands, pdca::PdcaCommands,
    proc::ProcCommands, reset::ResetArgs, risk::RiskCommands, status::StatusArgs,
    theme::ThemeArgs,
};

#[derive(Parser)]
#[command(name = "qmt")]
#[command(author, version, about = "Quality Management Toolkit")]
#[command(long_about = "Quality Management Toolkit. Keeps the records of an ISO 9001 quality management system: documents, processes, risks, opportunities, PDCA cycles, non-conformities and KPIs.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Data directory (default: from config, then the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Controlled document management
    #[command(subcommand)]
    Doc(DocCommands),

    /// Process management (with ordered steps)
    #[command(subcommand)]
    Proc(ProcCommands),

    /// Risk management (probability × impact)
    #[command(subcommand)]
    Risk(RiskCommands),

    /// Improvement opportunity management
    #[command(subcommand)]
    Opp(OppCommands),

    /// PDCA cycle management
    #[command(subcommand)]
    Pdca(PdcaCommands),

    /// Non-conformity and corrective action management
    #[command(subcommand)]
    Ncr(NcrCommands),

    /// Key performance indicators
    #[command(subcommand)]
    Kpi(KpiCommands),

    /// Show the quality system dashboard
    Status(StatusArgs),

    /// Toggle dark mode preference
    Theme(ThemeArgs),

    /// Export a collection as CSV
    Export(ExportArgs),

    /// Apply a raw JSON action ({"type": ..., "payload": ...})
    Dispatch(DispatchArgs),

    /// Discard stored data and start again from the sample data
    Reset(ResetArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, detail view for single records
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_record_version_flag_parses() {
        let cli = Cli::try_parse_from([
            "qmt", "doc", "new", "--title", "Manual", "--file-name", "a.pdf", "--version", "2.0",
        ])
        .unwrap();
        match cli.command {
            Commands::Doc(DocCommands::New(args)) => assert_eq!(args.version, "2.0"),
            _ => panic!("expected doc new"),
        }

        let cli = Cli::try_parse_from(["qmt", "proc", "edit", "1", "--version", "3.1"]).unwrap();
        match cli.command {
            Commands::Proc(ProcCommands::Edit(args)) => {
                assert_eq!(args.version.as_deref(), Some("3.1"))
            }
            _ => panic!("expected proc edit"),
        }
    }
}
