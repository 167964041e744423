//! `qmt ncr` command - Non-conformity management

use chrono::NaiveDate;
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
use crate::entities::ncr::{
    is_action_overdue, ActionStatus, NonConformitySource, NonConformityStatus, Severity,
};
use crate::entities::{CorrectiveAction, NonConformity};

#[derive(Subcommand, Debug)]
pub enum NcrCommands {
    /// List non-conformities with filtering
    List(ListArgs),

    /// Record a new non-conformity
    New(NewArgs),

    /// Show a non-conformity and its corrective actions
    Show(ShowArgs),

    /// Edit non-conformity fields
    Edit(EditArgs),

    /// Close a non-conformity (whatever the state of its actions)
    Close(CloseArgs),

    /// Delete a non-conformity and its actions
    Delete(DeleteArgs),

    /// Manage corrective actions
    #[command(subcommand)]
    Action(ActionCommands),
}

#[derive(Subcommand, Debug)]
pub enum ActionCommands {
    /// Add a corrective action (moves the record to En Tratamiento)
    Add(ActionAddArgs),

    /// Change an action's status
    Status(ActionStatusArgs),

    /// Edit an action's description, owner or dates
    Edit(ActionEditArgs),

    /// Remove an action
    Remove(ActionRemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long)]
    pub status: Option<NonConformityStatus>,

    #[arg(long)]
    pub severity: Option<Severity>,

    #[arg(long)]
    pub source: Option<NonConformitySource>,

    /// Exclude closed records
    #[arg(long)]
    pub open: bool,

    /// Only records with overdue corrective actions
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
    /// Non-conformity title
    #[arg(long, short = 't')]
    pub title: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long)]
    pub severity: Option<Severity>,

    #[arg(long)]
    pub source: Option<NonConformitySource>,

    /// Who identified it (default: from config)
    #[arg(long)]
    pub identified_by: Option<String>,

    #[arg(long)]
    pub root_cause: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Non-conformity ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Non-conformity ID
    pub id: String,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long)]
    pub severity: Option<Severity>,

    #[arg(long)]
    pub source: Option<NonConformitySource>,

    #[arg(long)]
    pub root_cause: Option<String>,

    #[arg(long)]
    pub status: Option<NonConformityStatus>,
}

#[derive(clap::Args, Debug)]
pub struct CloseArgs {
    /// Non-conformity ID
    pub id: String,

    /// Skip confirmation when actions are still open
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Non-conformity ID
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ActionAddArgs {
    /// Non-conformity ID
    pub ncr: String,

    /// What has to be done
    #[arg(long, short = 'd')]
    pub description: String,

    /// Responsible person (default: from config)
    #[arg(long, short = 'r')]
    pub responsible: Option<String>,

    /// Target date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub target: NaiveDate,
}

#[derive(clap::Args, Debug)]
pub struct ActionStatusArgs {
    /// Non-conformity ID
    pub ncr: String,

    /// Action ID
    pub action: String,

    /// New status (pendiente, en-progreso, completada, vencida)
    pub status: ActionStatus,
}

#[derive(clap::Args, Debug)]
pub struct ActionEditArgs {
    /// Non-conformity ID
    pub ncr: String,

    /// Action ID
    pub action: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'r')]
    pub responsible: Option<String>,

    #[arg(long, value_parser = parse_date)]
    pub target: Option<NaiveDate>,

    /// How completion was verified
    #[arg(long)]
    pub verification: Option<String>,

    /// Observed effectiveness
    #[arg(long)]
    pub effectiveness: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ActionRemoveArgs {
    /// Non-conformity ID
    pub ncr: String,

    /// Action ID
    pub action: String,
}

/// Run a non-conformity subcommand
pub fn run(cmd: NcrCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        NcrCommands::List(args) => run_list(args, global),
        NcrCommands::New(args) => run_new(args, global),
        NcrCommands::Show(args) => run_show(args, global),
        NcrCommands::Edit(args) => run_edit(args, global),
        NcrCommands::Close(args) => run_close(args, global),
        NcrCommands::Delete(args) => run_delete(args, global),
        NcrCommands::Action(cmd) => match cmd {
            ActionCommands::Add(args) => run_action_add(args, global),
            ActionCommands::Status(args) => run_action_status(args, global),
            ActionCommands::Edit(args) => run_action_edit(args, global),
            ActionCommands::Remove(args) => run_action_remove(args, global),
        },
    }
}

/// Next `<ncr>-<n>` action id not yet used by this record
fn next_action_id(nc: &NonConformity) -> RecordId {
    (nc.corrective_actions.len() + 1..)
        .map(|n| RecordId::new(format!("{}-{}", nc.id, n)))
        .find(|id| nc.action(id).is_none())
        .unwrap_or_else(|| RecordId::new(format!("{}-0", nc.id)))
}

fn load(session: &Session, id: &str) -> Result<NonConformity> {
    let state = session.state();
    require(state.non_conformity(&RecordId::new(id)), id)
}

fn require_action<'a>(nc: &'a NonConformity, action: &str) -> Result<&'a CorrectiveAction> {
    nc.action(&RecordId::new(action)).ok_or_else(|| {
        miette::miette!("Non-conformity {} has no action '{}'", nc.id, action)
    })
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let today = today();

    let ncs: Vec<&NonConformity> =
        search(&state.non_conformities, args.search.as_deref().unwrap_or(""))
            .into_iter()
            .filter(|n| args.sector.map_or(true, |s| n.sector == s))
            .filter(|n| args.status.map_or(true, |s| n.status == s))
            .filter(|n| args.severity.map_or(true, |s| n.severity == s))
            .filter(|n| args.source.map_or(true, |s| n.source == s))
            .filter(|n| !args.open || !n.is_closed())
            .filter(|n| !args.overdue || n.has_overdue_actions(today))
            .collect();

    if args.count {
        println!("{}", ncs.len());
        return Ok(());
    }

    output_list(
        &ncs,
        global.format,
        &["ID", "TITLE", "SEVERITY", "SOURCE", "STATUS", "ACTIONS", "IDENTIFIED"],
        |n| {
            let done = n
                .corrective_actions
                .iter()
                .filter(|a| a.is_completed())
                .count();
            let mut actions = format!("{}/{}", done, n.corrective_actions.len());
            if n.has_overdue_actions(today) {
                actions.push_str(" !");
            }
            vec![
                n.id.to_string(),
                truncate_str(&n.title, 36),
                n.severity.to_string(),
                n.source.to_string(),
                n.status.to_string(),
                actions,
                n.identified_date.to_string(),
            ]
        },
    )
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let identified_by = args.identified_by.unwrap_or_else(|| session.author());

    let mut nc = NonConformity::new(session.new_id(), args.title, identified_by, today());
    if let Some(description) = args.description {
        nc.description = description;
    }
    if let Some(sector) = args.sector {
        nc.sector = sector;
    }
    if let Some(severity) = args.severity {
        nc.severity = severity;
    }
    if let Some(source) = args.source {
        nc.source = source;
    }
    nc.root_cause = args.root_cause;

    report(global, "Created", "non-conformity", &nc.id, &nc.title);
    if !global.quiet && nc.severity.is_critical() {
        println!(
            "   {}",
            tone_style(format!("Severity {}", nc.severity), nc.severity.tone())
        );
    }
    session.dispatch(Action::AddNonConformity(nc));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let nc = load(&session, &args.id)?;
    let today = today();

    output_record(&nc, global.format, |n| {
        println!("{}", style(&n.title).bold());
        println!("{}", "─".repeat(60));
        print_field("ID", &n.id);
        print_field("Status", tone_style(n.status.label(), n.status.tone()));
        print_field("Severity", tone_style(n.severity.label(), n.severity.tone()));
        print_field("Source", n.source);
        print_field("Sector", n.sector);
        print_field("Identified by", &n.identified_by);
        print_field("Identified", n.identified_date);
        if let Some(closed) = n.close_date {
            print_field("Closed", closed);
        }
        if let Some(ref cause) = n.root_cause {
            print_field("Root cause", cause);
        }
        if !n.description.is_empty() {
            println!();
            println!("{}", n.description);
        }

        println!();
        if n.corrective_actions.is_empty() {
            println!("{}", style("No corrective actions").dim());
            return;
        }
        println!("{}", style("Corrective actions").bold());
        for a in &n.corrective_actions {
            let due = if is_action_overdue(a, today) {
                style(format!("due {} (overdue)", a.target_date)).red()
            } else {
                style(format!("due {}", a.target_date)).dim()
            };
            println!(
                "  {} {} {} {}",
                style(format!("[{}]", a.id)).cyan(),
                tone_style(a.status.label(), a.status.tone()),
                a.description,
                due
            );
            println!("      {}", a.responsible);
            if let Some(done) = a.completion_date {
                println!("      completed {}", done);
            }
            if let Some(ref verification) = a.verification {
                println!("      verification: {}", verification);
            }
            if let Some(ref effectiveness) = a.effectiveness {
                println!("      effectiveness: {}", effectiveness);
            }
        }
    })
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let mut nc = load(&session, &args.id)?;

    if let Some(title) = args.title {
        nc.title = title;
    }
    if let Some(description) = args.description {
        nc.description = description;
    }
    if let Some(sector) = args.sector {
        nc.sector = sector;
    }
    if let Some(severity) = args.severity {
        nc.severity = severity;
    }
    if let Some(source) = args.source {
        nc.source = source;
    }
    if let Some(cause) = args.root_cause {
        nc.root_cause = Some(cause);
    }
    if let Some(status) = args.status {
        if status == NonConformityStatus::Cerrada {
            return Err(miette::miette!(
                help = "use `qmt ncr close`",
                "Closing is a separate step"
            ));
        }
        nc.status = status;
    }

    report(global, "Updated", "non-conformity", &nc.id, &nc.title);
    session.dispatch(Action::UpdateNonConformity(nc));
    Ok(())
}

fn run_close(args: CloseArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let nc = load(&session, &args.id)?;

    if nc.is_closed() {
        return Err(miette::miette!("Non-conformity {} is already closed", nc.id));
    }
    let pending = nc
        .corrective_actions
        .iter()
        .filter(|a| !a.is_completed())
        .count();
    if pending > 0 {
        let prompt = format!("{} action(s) are not completed. Close anyway?", pending);
        if !confirm(&prompt, args.yes)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let closed = nc.closed(today());
    if !global.quiet {
        println!(
            "{} Closed non-conformity {} ({})",
            style("✓").green(),
            style(&closed.id).cyan(),
            closed.close_date.map(|d| d.to_string()).unwrap_or_default()
        );
    }
    session.dispatch(Action::UpdateNonConformity(closed));
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let nc = load(&session, &args.id)?;

    let prompt = format!(
        "Delete non-conformity '{}' and its {} action(s)?",
        nc.title,
        nc.corrective_actions.len()
    );
    if !confirm(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    session.dispatch(Action::DeleteNonConformity(nc.id.clone()));
    if !global.quiet {
        println!(
            "{} Deleted non-conformity {}",
            style("✓").green(),
            style(&nc.id).cyan()
        );
    }
    Ok(())
}

fn run_action_add(args: ActionAddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let nc = load(&session, &args.ncr)?;
    if nc.is_closed() {
        return Err(miette::miette!("Non-conformity {} is closed", nc.id));
    }

    let responsible = args.responsible.unwrap_or_else(|| session.author());
    let action = CorrectiveAction::new(next_action_id(&nc), args.description, responsible, args.target);
    let action_id = action.id.clone();
    let updated = nc.with_action_added(action);

    if !global.quiet {
        println!(
            "{} Added action {} to non-conformity {} ({})",
            style("✓").green(),
            style(&action_id).cyan(),
            style(&updated.id).cyan(),
            tone_style(updated.status.label(), updated.status.tone())
        );
    }
    session.dispatch(Action::UpdateNonConformity(updated));
    Ok(())
}

fn run_action_status(args: ActionStatusArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let nc = load(&session, &args.ncr)?;
    let action_id = require_action(&nc, &args.action)?.id.clone();

    let updated = nc.with_action_status(&action_id, args.status, today());
    if !global.quiet {
        println!(
            "{} Action {} → {}",
            style("✓").green(),
            style(&action_id).cyan(),
            tone_style(args.status.label(), args.status.tone())
        );
        if updated.status != nc.status {
            println!(
                "   Non-conformity {} → {}",
                nc.status,
                tone_style(updated.status.label(), updated.status.tone())
            );
        }
    }
    session.dispatch(Action::UpdateNonConformity(updated));
    Ok(())
}

fn run_action_edit(args: ActionEditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let nc = load(&session, &args.ncr)?;
    let mut action = require_action(&nc, &args.action)?.clone();

    if let Some(description) = args.description {
        action.description = description;
    }
    if let Some(responsible) = args.responsible {
        action.responsible = responsible;
    }
    if let Some(target) = args.target {
        action.target_date = target;
    }
    if let Some(verification) = args.verification {
        action.verification = Some(verification);
    }
    if let Some(effectiveness) = args.effectiveness {
        action.effectiveness = Some(effectiveness);
    }

    let action_id = action.id.clone();
    let updated = nc.with_action_edited(action);
    if !global.quiet {
        println!(
            "{} Updated action {} of non-conformity {}",
            style("✓").green(),
            style(&action_id).cyan(),
            style(&updated.id).cyan()
        );
    }
    session.dispatch(Action::UpdateNonConformity(updated));
    Ok(())
}

fn run_action_remove(args: ActionRemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let nc = load(&session, &args.ncr)?;
    let action_id = require_action(&nc, &args.action)?.id.clone();

    let updated = nc.with_action_removed(&action_id);
    if !global.quiet {
        println!(
            "{} Removed action {} from non-conformity {}",
            style("✓").green(),
            style(&action_id).cyan(),
            style(&updated.id).cyan()
        );
    }
    session.dispatch(Action::UpdateNonConformity(updated));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed;

    #[test]
    fn test_next_action_id_skips_used() {
        let state = seed::initial_data();
        let nc = state.non_conformity(&RecordId::new("1")).unwrap();
        assert_eq!(next_action_id(nc), RecordId::new("1-3"));

        let gap = nc.with_action_removed(&RecordId::new("1-1"));
        // one action left, but 1-2 is still taken
        assert_eq!(next_action_id(&gap), RecordId::new("1-3"));
    }
}
