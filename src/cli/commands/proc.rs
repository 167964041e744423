//! `qmt proc` command - Process management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    confirm, output_list, output_record, parse_date, print_field, report, require, today,
    tone_style, truncate_str, Session,
};
use crate::cli::GlobalOpts;
use crate::core::entity::Sector;
use crate::core::identity::RecordId;
use crate::core::reducer::Action;
use crate::core::stats::search;
use crate::entities::process::ProcessStatus;
use crate::entities::{Process, ProcessStep};

#[derive(Subcommand, Debug)]
pub enum ProcCommands {
    /// List processes with filtering
    List(ListArgs),

    /// Create a new process
    New(NewArgs),

    /// Show a process and its steps
    Show(ShowArgs),

    /// Edit process fields
    Edit(EditArgs),

    /// Delete a process
    Delete(DeleteArgs),

    /// Manage the steps of a process
    #[command(subcommand)]
    Step(StepCommands),
}

#[derive(Subcommand, Debug)]
pub enum StepCommands {
    /// Append a step to a process
    Add(StepAddArgs),

    /// Remove a step from a process
    Remove(StepRemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by sector
    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    /// Filter by status
    #[arg(long)]
    pub status: Option<ProcessStatus>,

    /// Only processes whose next review date has passed
    #[arg(long)]
    pub review_due: bool,

    /// Search in name and description
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Process name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    /// Process owner (default: from config)
    #[arg(long, short = 'o')]
    pub owner: Option<String>,

    #[arg(long)]
    pub status: Option<ProcessStatus>,

    /// Next review date (default: six months from today)
    #[arg(long, value_parser = parse_date)]
    pub next_review: Option<chrono::NaiveDate>,

    #[arg(long, default_value = "1.0")]
    pub version: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Process ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Process ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long, short = 'o')]
    pub owner: Option<String>,

    #[arg(long)]
    pub status: Option<ProcessStatus>,

    #[arg(long)]
    pub version: Option<String>,

    /// Record a review today and schedule the next one
    #[arg(long, value_parser = parse_date)]
    pub reviewed_until: Option<chrono::NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Process ID
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct StepAddArgs {
    /// Process ID
    pub process: String,

    /// Step name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Role carrying out the step
    #[arg(long, short = 'r')]
    pub responsible: String,

    /// Duration estimate (e.g., "2-3 días")
    #[arg(long, short = 't', default_value = "")]
    pub time: String,

    /// Required resource (repeatable)
    #[arg(long = "resource")]
    pub resources: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct StepRemoveArgs {
    /// Process ID
    pub process: String,

    /// Step ID
    pub step: String,
}

/// Run a process subcommand
pub fn run(cmd: ProcCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProcCommands::List(args) => run_list(args, global),
        ProcCommands::New(args) => run_new(args, global),
        ProcCommands::Show(args) => run_show(args, global),
        ProcCommands::Edit(args) => run_edit(args, global),
        ProcCommands::Delete(args) => run_delete(args, global),
        ProcCommands::Step(StepCommands::Add(args)) => run_step_add(args, global),
        ProcCommands::Step(StepCommands::Remove(args)) => run_step_remove(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let today = today();

    let procs: Vec<&Process> = search(&state.processes, args.search.as_deref().unwrap_or(""))
        .into_iter()
        .filter(|p| args.sector.map_or(true, |s| p.sector == s))
        .filter(|p| args.status.map_or(true, |s| p.status == s))
        .filter(|p| !args.review_due || p.is_review_due(today))
        .collect();

    if args.count {
        println!("{}", procs.len());
        return Ok(());
    }

    output_list(
        &procs,
        global.format,
        &["ID", "NAME", "SECTOR", "OWNER", "STATUS", "STEPS", "NEXT REVIEW"],
        |p| {
            vec![
                p.id.to_string(),
                truncate_str(&p.name, 36),
                p.sector.to_string(),
                p.owner.clone(),
                p.status.to_string(),
                p.steps.len().to_string(),
                p.next_review.to_string(),
            ]
        },
    )
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let owner = args.owner.unwrap_or_else(|| session.author());

    let mut process = Process::new(session.new_id(), args.name, owner, today());
    if let Some(description) = args.description {
        process.description = description;
    }
    if let Some(sector) = args.sector {
        process.sector = sector;
    }
    if let Some(status) = args.status {
        process.status = status;
    }
    if let Some(next_review) = args.next_review {
        process.next_review = next_review;
    }
    process.version = args.version;

    report(global, "Created", "process", &process.id, &process.name);
    if !global.quiet {
        println!(
            "   {}",
            style("No steps yet; add them with `qmt proc step add`").dim()
        );
    }
    session.dispatch(Action::AddProcess(process));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let process = require(state.process(&RecordId::new(&args.id)), &args.id)?;
    let today = today();

    output_record(&process, global.format, |p| {
        println!("{}", style(&p.name).bold());
        println!("{}", "─".repeat(60));
        print_field("ID", &p.id);
        print_field("Status", tone_style(p.status.label(), p.status.tone()));
        print_field("Sector", p.sector);
        print_field("Owner", &p.owner);
        print_field("Version", &p.version);
        print_field("Last review", p.last_review);
        let next = if p.is_review_due(today) {
            style(format!("{} (overdue)", p.next_review)).red()
        } else {
            style(p.next_review.to_string())
        };
        print_field("Next review", next);
        if !p.description.is_empty() {
            println!();
            println!("{}", p.description);
        }

        println!();
        if p.is_incomplete() {
            println!("{}", style("No steps defined (process is incomplete)").yellow());
            return;
        }
        println!("{}", style("Steps").bold());
        for (i, step) in p.steps.iter().enumerate() {
            println!(
                "  {}. {} {} {}",
                i + 1,
                style(&step.name).bold(),
                style(format!("[{}]", step.id)).dim(),
                style(&step.estimated_time).dim()
            );
            println!("     {}", step.responsible);
            if !step.description.is_empty() {
                println!("     {}", step.description);
            }
            if !step.resources.is_empty() {
                println!("     {}", style(step.resources.join(", ")).dim());
            }
        }
    })
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let mut process = require(state.process(&RecordId::new(&args.id)), &args.id)?;

    if let Some(name) = args.name {
        process.name = name;
    }
    if let Some(description) = args.description {
        process.description = description;
    }
    if let Some(sector) = args.sector {
        process.sector = sector;
    }
    if let Some(owner) = args.owner {
        process.owner = owner;
    }
    if let Some(status) = args.status {
        process.status = status;
    }
    if let Some(version) = args.version {
        process.version = version;
    }
    if let Some(next_review) = args.reviewed_until {
        process.last_review = today();
        process.next_review = next_review;
    }

    report(global, "Updated", "process", &process.id, &process.name);
    session.dispatch(Action::UpdateProcess(process));
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let process = require(state.process(&RecordId::new(&args.id)), &args.id)?;

    let prompt = format!(
        "Delete process '{}' and its {} step(s)?",
        process.name,
        process.steps.len()
    );
    if !confirm(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    session.dispatch(Action::DeleteProcess(process.id.clone()));
    if !global.quiet {
        println!("{} Deleted process {}", style("✓").green(), style(&process.id).cyan());
    }
    Ok(())
}

fn run_step_add(args: StepAddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let process = require(state.process(&RecordId::new(&args.process)), &args.process)?;

    let step = ProcessStep {
        id: session.new_id(),
        name: args.name,
        description: args.description,
        responsible: args.responsible,
        estimated_time: args.time,
        resources: args.resources,
    };
    let step_id = step.id.clone();
    let updated = process.with_step(step);

    if !global.quiet {
        println!(
            "{} Added step {} to process {} ({} step(s))",
            style("✓").green(),
            style(&step_id).cyan(),
            style(&updated.id).cyan(),
            updated.steps.len()
        );
    }
    session.dispatch(Action::UpdateProcess(updated));
    Ok(())
}

fn run_step_remove(args: StepRemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let process = require(state.process(&RecordId::new(&args.process)), &args.process)?;

    let step_id = RecordId::new(&args.step);
    if !process.steps.iter().any(|s| s.id == step_id) {
        return Err(miette::miette!(
            "Process {} has no step '{}'",
            process.id,
            args.step
        ));
    }
    let updated = process.without_step(&step_id);

    if !global.quiet {
        println!(
            "{} Removed step {} from process {}",
            style("✓").green(),
            style(&step_id).cyan(),
            style(&updated.id).cyan()
        );
        if updated.is_incomplete() {
            println!("   {}", style("Process has no steps left").yellow());
        }
    }
    session.dispatch(Action::UpdateProcess(updated));
    Ok(())
}
