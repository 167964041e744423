//! `qmt risk` command - Risk management

use clap::Subcommand;
use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{
    confirm, output_list, output_record, print_field, report, require, today, tone_style,
    truncate_str, Session,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::{RiskLevel, Sector};
use crate::core::identity::RecordId;
use crate::core::reducer::Action;
use crate::core::stats::{date_status, search, DateStatus};
use crate::entities::risk::{risk_matrix, RiskCategory, RiskStatus};
use crate::entities::Risk;

#[derive(Subcommand, Debug)]
pub enum RiskCommands {
    /// List risks with filtering
    List(ListArgs),

    /// Identify a new risk
    New(NewArgs),

    /// Show a risk's details
    Show(ShowArgs),

    /// Edit risk fields (level is recomputed)
    Edit(EditArgs),

    /// Delete a risk
    Delete(DeleteArgs),

    /// Show the probability × impact matrix with current risk counts
    Matrix,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by sector
    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    /// Filter by computed risk level
    #[arg(long, short = 'l')]
    pub level: Option<RiskLevel>,

    /// Filter by status
    #[arg(long)]
    pub status: Option<RiskStatus>,

    /// Filter by category
    #[arg(long, short = 'c')]
    pub category: Option<RiskCategory>,

    /// Show only Alto and Muy Alto risks
    #[arg(long)]
    pub high: bool,

    /// Search in title and description
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Risk title
    #[arg(long, short = 't')]
    pub title: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long, short = 'c')]
    pub category: Option<RiskCategory>,

    /// Probability (muy-bajo, bajo, medio, alto, muy-alto)
    #[arg(long, short = 'p', default_value = "medio")]
    pub probability: RiskLevel,

    /// Impact (muy-bajo, bajo, medio, alto, muy-alto)
    #[arg(long, short = 'i', default_value = "medio")]
    pub impact: RiskLevel,

    /// Mitigation plan
    #[arg(long, short = 'm')]
    pub mitigation: Option<String>,

    /// Responsible person (default: from config)
    #[arg(long, short = 'r')]
    pub responsible: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Risk ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Risk ID
    pub id: String,

    #[arg(long, short = 't')]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    #[arg(long, short = 'c')]
    pub category: Option<RiskCategory>,

    #[arg(long, short = 'p')]
    pub probability: Option<RiskLevel>,

    #[arg(long, short = 'i')]
    pub impact: Option<RiskLevel>,

    #[arg(long, short = 'm')]
    pub mitigation: Option<String>,

    #[arg(long, short = 'r')]
    pub responsible: Option<String>,

    #[arg(long)]
    pub status: Option<RiskStatus>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Risk ID
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a risk subcommand
pub fn run(cmd: RiskCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RiskCommands::List(args) => run_list(args, global),
        RiskCommands::New(args) => run_new(args, global),
        RiskCommands::Show(args) => run_show(args, global),
        RiskCommands::Edit(args) => run_edit(args, global),
        RiskCommands::Delete(args) => run_delete(args, global),
        RiskCommands::Matrix => run_matrix(global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();

    let mut risks: Vec<&Risk> = search(&state.risks, args.search.as_deref().unwrap_or(""))
        .into_iter()
        .filter(|r| args.sector.map_or(true, |s| r.sector == s))
        .filter(|r| args.level.map_or(true, |l| r.risk_level == l))
        .filter(|r| args.status.map_or(true, |s| r.status == s))
        .filter(|r| args.category.map_or(true, |c| r.category == c))
        .filter(|r| !args.high || r.risk_level.is_high())
        .collect();

    // Highest level first, stable for equal levels
    risks.sort_by(|a, b| b.risk_level.cmp(&a.risk_level));

    if args.count {
        println!("{}", risks.len());
        return Ok(());
    }

    output_list(
        &risks,
        global.format,
        &["ID", "TITLE", "CATEGORY", "P", "I", "LEVEL", "STATUS", "REVIEW"],
        |r| {
            vec![
                r.id.to_string(),
                truncate_str(&r.title, 36),
                r.category.to_string(),
                r.probability.to_string(),
                r.impact.to_string(),
                r.risk_level.to_string(),
                r.status.to_string(),
                r.review_date.to_string(),
            ]
        },
    )
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let responsible = args.responsible.unwrap_or_else(|| session.author());

    let mut risk = Risk::new(
        session.new_id(),
        args.title,
        responsible,
        args.probability,
        args.impact,
        today(),
    );
    if let Some(description) = args.description {
        risk.description = description;
    }
    if let Some(sector) = args.sector {
        risk.sector = sector;
    }
    if let Some(category) = args.category {
        risk.category = category;
    }
    if let Some(mitigation) = args.mitigation {
        risk.mitigation = mitigation;
    }

    report(global, "Created", "risk", &risk.id, &risk.title);
    if !global.quiet {
        println!(
            "   Level: {} ({} × {})",
            tone_style(risk.risk_level.label(), risk.risk_level.tone()),
            risk.probability,
            risk.impact
        );
    }
    session.dispatch(Action::AddRisk(risk));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let risk = require(state.risk(&RecordId::new(&args.id)), &args.id)?;
    let today = today();

    output_record(&risk, global.format, |r| {
        println!("{}", style(&r.title).bold());
        println!("{}", "─".repeat(60));
        print_field("ID", &r.id);
        print_field("Level", tone_style(r.risk_level.label(), r.risk_level.tone()));
        print_field("Probability", r.probability);
        print_field("Impact", r.impact);
        print_field("Category", r.category);
        print_field("Status", tone_style(r.status.label(), r.status.tone()));
        print_field("Sector", r.sector);
        print_field("Responsible", &r.responsible);
        print_field("Identified", r.identified_date);
        let review = match date_status(r.review_date, today) {
            DateStatus::Overdue => style(format!("{} (overdue)", r.review_date)).red(),
            DateStatus::Current | DateStatus::DueSoon => {
                style(format!("{} (due soon)", r.review_date)).yellow()
            }
            DateStatus::Upcoming => style(r.review_date.to_string()),
        };
        print_field("Review", review);
        if r.is_level_stale() {
            println!(
                "{}",
                style("Stored level does not match probability × impact").yellow()
            );
        }
        if !r.description.is_empty() {
            println!();
            println!("{}", r.description);
        }
        if !r.mitigation.is_empty() {
            println!();
            println!("{}", style("Mitigation").bold());
            println!("{}", r.mitigation);
        }
    })
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let mut risk = require(state.risk(&RecordId::new(&args.id)), &args.id)?;
    let previous = risk.risk_level;

    if let Some(title) = args.title {
        risk.title = title;
    }
    if let Some(description) = args.description {
        risk.description = description;
    }
    if let Some(sector) = args.sector {
        risk.sector = sector;
    }
    if let Some(category) = args.category {
        risk.category = category;
    }
    if let Some(probability) = args.probability {
        risk.probability = probability;
    }
    if let Some(impact) = args.impact {
        risk.impact = impact;
    }
    if let Some(mitigation) = args.mitigation {
        risk.mitigation = mitigation;
    }
    if let Some(responsible) = args.responsible {
        risk.responsible = responsible;
    }
    if let Some(status) = args.status {
        risk.status = status;
    }
    let risk = risk.revised(today());

    report(global, "Updated", "risk", &risk.id, &risk.title);
    if !global.quiet && risk.risk_level != previous {
        println!(
            "   Level: {} → {}",
            previous,
            tone_style(risk.risk_level.label(), risk.risk_level.tone())
        );
    }
    session.dispatch(Action::UpdateRisk(risk));
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let risk = require(state.risk(&RecordId::new(&args.id)), &args.id)?;

    if !confirm(&format!("Delete risk '{}'?", risk.title), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    session.dispatch(Action::DeleteRisk(risk.id.clone()));
    if !global.quiet {
        println!("{} Deleted risk {}", style("✓").green(), style(&risk.id).cyan());
    }
    Ok(())
}

fn run_matrix(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let matrix = risk_matrix();
    let levels = RiskLevel::all();

    let mut builder = Builder::default();
    let mut header = vec!["P \\ I".to_string()];
    header.extend(levels.iter().map(|l| l.to_string()));
    builder.push_record(header);

    // Highest probability on top
    for (row, probability) in levels.iter().enumerate().rev() {
        let mut cells = vec![probability.to_string()];
        for (col, impact) in levels.iter().enumerate() {
            let count = state
                .risks
                .iter()
                .filter(|r| r.probability == *probability && r.impact == *impact)
                .count();
            let level = matrix[row][col];
            cells.push(if count > 0 {
                format!("{} ({})", level, count)
            } else {
                level.to_string()
            });
        }
        builder.push_record(cells);
    }

    let mut table = builder.build();
    if global.format == OutputFormat::Md {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    println!("{}", table);
    if !global.quiet {
        println!(
            "{}",
            style("Rows: probability, columns: impact, (n) = risks in cell").dim()
        );
    }
    Ok(())
}
