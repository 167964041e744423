//! `qmt opp` command - Improvement opportunity management

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
use crate::core::stats::{days_until, search};
use crate::entities::opportunity::{OpportunityCategory, OpportunityStatus};
use crate::entities::Opportunity;

#[derive(Subcommand, Debug)]
pub enum OppCommands {
    /// List opportunities with filtering
    List(ListArgs),

    /// Identify a new opportunity
    New(NewArgs),

    /// Show an opportunity's details
    Show(ShowArgs),

    /// Edit opportunity fields
    Edit(EditArgs),

    /// Delete an opportunity
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long)]
    pub status: Option<OpportunityStatus>,

    #[arg(long, short = 'c')]
    pub category: Option<OpportunityCategory>,

    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    /// Only opportunities past their target date and still open
    #[arg(long)]
    pub overdue: bool,

    /// Search in title and description
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Opportunity title
    #[arg(long, short = 't')]
    pub title: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long, short = 'c')]
    pub category: Option<OpportunityCategory>,

    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    /// Expected benefit
    #[arg(long, short = 'b')]
    pub benefit: Option<String>,

    /// Responsible person (default: from config)
    #[arg(long, short = 'r')]
    pub responsible: Option<String>,

    /// Target date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub target: NaiveDate,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Opportunity ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Opportunity ID
    pub id: String,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long, short = 'c')]
    pub category: Option<OpportunityCategory>,

    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    #[arg(long, short = 'b')]
    pub benefit: Option<String>,

    #[arg(long, short = 'r')]
    pub responsible: Option<String>,

    #[arg(long)]
    pub status: Option<OpportunityStatus>,

    #[arg(long, value_parser = parse_date)]
    pub target: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Opportunity ID
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run an opportunity subcommand
pub fn run(cmd: OppCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OppCommands::List(args) => run_list(args, global),
        OppCommands::New(args) => run_new(args, global),
        OppCommands::Show(args) => run_show(args, global),
        OppCommands::Edit(args) => run_edit(args, global),
        OppCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let today = today();

    let opps: Vec<&Opportunity> =
        search(&state.opportunities, args.search.as_deref().unwrap_or(""))
            .into_iter()
            .filter(|o| args.sector.map_or(true, |s| o.sector == s))
            .filter(|o| args.status.map_or(true, |s| o.status == s))
            .filter(|o| args.category.map_or(true, |c| o.category == c))
            .filter(|o| args.priority.map_or(true, |p| o.priority == p))
            .filter(|o| !args.overdue || o.is_overdue(today))
            .collect();

    if args.count {
        println!("{}", opps.len());
        return Ok(());
    }

    output_list(
        &opps,
        global.format,
        &["ID", "TITLE", "CATEGORY", "PRIORITY", "STATUS", "RESPONSIBLE", "TARGET"],
        |o| {
            vec![
                o.id.to_string(),
                truncate_str(&o.title, 36),
                o.category.to_string(),
                o.priority.to_string(),
                o.status.to_string(),
                o.responsible.clone(),
                o.target_date.to_string(),
            ]
        },
    )
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let responsible = args.responsible.unwrap_or_else(|| session.author());

    let mut opp = Opportunity::new(session.new_id(), args.title, responsible, today(), args.target);
    if let Some(description) = args.description {
        opp.description = description;
    }
    if let Some(sector) = args.sector {
        opp.sector = sector;
    }
    if let Some(category) = args.category {
        opp.category = category;
    }
    if let Some(priority) = args.priority {
        opp.priority = priority;
    }
    if let Some(benefit) = args.benefit {
        opp.expected_benefit = benefit;
    }

    report(global, "Created", "opportunity", &opp.id, &opp.title);
    session.dispatch(Action::AddOpportunity(opp));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let opp = require(state.opportunity(&RecordId::new(&args.id)), &args.id)?;
    let today = today();

    output_record(&opp, global.format, |o| {
        println!("{}", style(&o.title).bold());
        println!("{}", "─".repeat(60));
        print_field("ID", &o.id);
        print_field("Status", tone_style(o.status.label(), o.status.tone()));
        print_field("Priority", tone_style(o.priority.label(), o.priority.tone()));
        print_field("Category", o.category);
        print_field("Sector", o.sector);
        print_field("Responsible", &o.responsible);
        print_field("Identified", o.identified_date);
        let target = if o.is_overdue(today) {
            style(format!("{} (overdue)", o.target_date)).red()
        } else if o.status.is_terminal() {
            style(o.target_date.to_string())
        } else {
            style(format!(
                "{} ({} days left)",
                o.target_date,
                days_until(o.target_date, today)
            ))
        };
        print_field("Target", target);
        if !o.expected_benefit.is_empty() {
            print_field("Expected benefit", &o.expected_benefit);
        }
        if !o.description.is_empty() {
            println!();
            println!("{}", o.description);
        }
    })
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let mut opp = require(state.opportunity(&RecordId::new(&args.id)), &args.id)?;

    if let Some(title) = args.title {
        opp.title = title;
    }
    if let Some(description) = args.description {
        opp.description = description;
    }
    if let Some(sector) = args.sector {
        opp.sector = sector;
    }
    if let Some(category) = args.category {
        opp.category = category;
    }
    if let Some(priority) = args.priority {
        opp.priority = priority;
    }
    if let Some(benefit) = args.benefit {
        opp.expected_benefit = benefit;
    }
    if let Some(responsible) = args.responsible {
        opp.responsible = responsible;
    }
    if let Some(status) = args.status {
        opp.status = status;
    }
    if let Some(target) = args.target {
        opp.target_date = target;
    }

    report(global, "Updated", "opportunity", &opp.id, &opp.title);
    session.dispatch(Action::UpdateOpportunity(opp));
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let opp = require(state.opportunity(&RecordId::new(&args.id)), &args.id)?;

    if !confirm(&format!("Delete opportunity '{}'?", opp.title), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    session.dispatch(Action::DeleteOpportunity(opp.id.clone()));
    if !global.quiet {
        println!("{} Deleted opportunity {}", style("✓").green(), style(&opp.id).cyan());
    }
    Ok(())
}
