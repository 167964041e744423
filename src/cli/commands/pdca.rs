//! `qmt pdca` command - PDCA cycle management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    confirm, output_list, output_record, parse_date, print_field, report, require, today,
    tone_style, truncate_str, Session,
};
use crate::cli::GlobalOpts;
use crate::core::entity::{Priority, Sector};
use crate::core::identity::RecordId;
use crate::core::reducer::Action;
use crate::core::stats::search;
use crate::entities::pdca::{PdcaPhase, PdcaStatus};
use crate::entities::PdcaItem;

#[derive(Subcommand, Debug)]
pub enum PdcaCommands {
    /// List PDCA items with progress
    List(ListArgs),

    /// Start a new PDCA item in the Plan phase
    New(NewArgs),

    /// Show a PDCA item's details
    Show(ShowArgs),

    /// Edit PDCA item fields and notes
    Edit(EditArgs),

    /// Change phase and/or status
    Move(MoveArgs),

    /// Delete a PDCA item
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    /// Filter by phase (plan, do, check, act)
    #[arg(long)]
    pub phase: Option<PdcaPhase>,

    #[arg(long)]
    pub status: Option<PdcaStatus>,

    /// Only Alta or Crítica priority
    #[arg(long)]
    pub high_priority: bool,

    /// Search in title and description
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Item title
    #[arg(long, short = 't')]
    pub title: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    /// Responsible person (default: from config)
    #[arg(long, short = 'r')]
    pub responsible: Option<String>,

    /// Target date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub target: NaiveDate,

    /// Planned actions
    #[arg(long)]
    pub planned: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// PDCA item ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// PDCA item ID
    pub id: String,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    #[arg(long, short = 'r')]
    pub responsible: Option<String>,

    #[arg(long, value_parser = parse_date)]
    pub target: Option<NaiveDate>,

    /// Planned actions
    #[arg(long)]
    pub planned: Option<String>,

    /// Actual results
    #[arg(long)]
    pub results: Option<String>,

    /// Lessons learned
    #[arg(long)]
    pub lessons: Option<String>,

    /// Next steps
    #[arg(long)]
    pub next_steps: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    /// PDCA item ID
    pub id: String,

    /// New phase
    #[arg(long, conflicts_with = "next")]
    pub phase: Option<PdcaPhase>,

    /// Advance to the following phase (Act wraps to Plan)
    #[arg(long)]
    pub next: bool,

    /// New status
    #[arg(long)]
    pub status: Option<PdcaStatus>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// PDCA item ID
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a PDCA subcommand
pub fn run(cmd: PdcaCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PdcaCommands::List(args) => run_list(args, global),
        PdcaCommands::New(args) => run_new(args, global),
        PdcaCommands::Show(args) => run_show(args, global),
        PdcaCommands::Edit(args) => run_edit(args, global),
        PdcaCommands::Move(args) => run_move(args, global),
        PdcaCommands::Delete(args) => run_delete(args, global),
    }
}

/// Ten-cell bar for a 0-100 progress value
fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) / 10;
    format!("{}{} {:>3}%", "█".repeat(filled), "░".repeat(10 - filled), progress)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();

    let items: Vec<&PdcaItem> = search(&state.pdca_items, args.search.as_deref().unwrap_or(""))
        .into_iter()
        .filter(|i| args.sector.map_or(true, |s| i.sector == s))
        .filter(|i| args.phase.map_or(true, |p| i.phase == p))
        .filter(|i| args.status.map_or(true, |s| i.status == s))
        .filter(|i| !args.high_priority || i.is_high_priority())
        .collect();

    if args.count {
        println!("{}", items.len());
        return Ok(());
    }

    output_list(
        &items,
        global.format,
        &["ID", "TITLE", "PHASE", "STATUS", "PRIORITY", "PROGRESS", "TARGET"],
        |i| {
            vec![
                i.id.to_string(),
                truncate_str(&i.title, 36),
                i.phase.to_string(),
                i.status.to_string(),
                i.priority.to_string(),
                progress_bar(i.progress()),
                i.target_date.to_string(),
            ]
        },
    )
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let responsible = args.responsible.unwrap_or_else(|| session.author());

    let mut item = PdcaItem::new(session.new_id(), args.title, responsible, today(), args.target);
    if let Some(description) = args.description {
        item.description = description;
    }
    if let Some(sector) = args.sector {
        item.sector = sector;
    }
    if let Some(priority) = args.priority {
        item.priority = priority;
    }
    if let Some(planned) = args.planned {
        item.planned_actions = planned;
    }

    report(global, "Created", "PDCA item", &item.id, &item.title);
    session.dispatch(Action::AddPdcaItem(item));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let item = require(state.pdca_item(&RecordId::new(&args.id)), &args.id)?;

    output_record(&item, global.format, |i| {
        println!("{}", style(&i.title).bold());
        println!("{}", "─".repeat(60));
        print_field("ID", &i.id);
        print_field("Phase", tone_style(i.phase.label(), i.phase.tone()));
        print_field("Status", tone_style(i.status.label(), i.status.tone()));
        print_field("Progress", progress_bar(i.progress()));
        print_field("Priority", tone_style(i.priority.label(), i.priority.tone()));
        print_field("Sector", i.sector);
        print_field("Responsible", &i.responsible);
        print_field("Created", i.created_date);
        print_field("Last updated", i.last_updated);
        print_field("Target", i.target_date);
        if let Some(done) = i.completion_date {
            print_field("Completed", done);
        }
        if !i.description.is_empty() {
            println!();
            println!("{}", i.description);
        }
        for (heading, text) in [
            ("Planned actions", &i.planned_actions),
            ("Results", &i.actual_results),
            ("Lessons learned", &i.lessons),
            ("Next steps", &i.next_steps),
        ] {
            if !text.is_empty() {
                println!();
                println!("{}", style(heading).bold());
                println!("{}", text);
            }
        }
    })
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let mut item = require(state.pdca_item(&RecordId::new(&args.id)), &args.id)?;

    if let Some(title) = args.title {
        item.title = title;
    }
    if let Some(description) = args.description {
        item.description = description;
    }
    if let Some(sector) = args.sector {
        item.sector = sector;
    }
    if let Some(priority) = args.priority {
        item.priority = priority;
    }
    if let Some(responsible) = args.responsible {
        item.responsible = responsible;
    }
    if let Some(target) = args.target {
        item.target_date = target;
    }
    if let Some(planned) = args.planned {
        item.planned_actions = planned;
    }
    if let Some(results) = args.results {
        item.actual_results = results;
    }
    if let Some(lessons) = args.lessons {
        item.lessons = lessons;
    }
    if let Some(next_steps) = args.next_steps {
        item.next_steps = next_steps;
    }
    item.last_updated = today();

    report(global, "Updated", "PDCA item", &item.id, &item.title);
    session.dispatch(Action::UpdatePdcaItem(item));
    Ok(())
}

fn run_move(args: MoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let item = require(state.pdca_item(&RecordId::new(&args.id)), &args.id)?;

    if args.phase.is_none() && args.status.is_none() && !args.next {
        return Err(miette::miette!(
            help = "pass --phase, --next or --status",
            "Nothing to change"
        ));
    }

    let phase = match (args.phase, args.next) {
        (Some(phase), _) => phase,
        (None, true) => item.phase.next(),
        (None, false) => item.phase,
    };
    // A new phase starts over unless a status is given
    let status = args.status.unwrap_or(if phase != item.phase {
        PdcaStatus::Planificado
    } else {
        item.status
    });
    let moved = item.with_state(phase, status, today());

    if !global.quiet {
        println!(
            "{} {} {} / {} → {} / {} ({})",
            style("✓").green(),
            style(&moved.id).cyan(),
            item.phase,
            item.status,
            tone_style(moved.phase.label(), moved.phase.tone()),
            tone_style(moved.status.label(), moved.status.tone()),
            progress_bar(moved.progress())
        );
    }
    session.dispatch(Action::UpdatePdcaItem(moved));
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let item = require(state.pdca_item(&RecordId::new(&args.id)), &args.id)?;

    if !confirm(&format!("Delete PDCA item '{}'?", item.title), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    session.dispatch(Action::DeletePdcaItem(item.id.clone()));
    if !global.quiet {
        println!("{} Deleted PDCA item {}", style("✓").green(), style(&item.id).cyan());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), "░░░░░░░░░░   0%");
        assert_eq!(progress_bar(40), "████░░░░░░  40%");
        assert_eq!(progress_bar(100), "██████████ 100%");
    }
}
