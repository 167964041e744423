//! `qmt kpi` command - Quality indicators
//!
//! KPIs are a curated set: they can be measured and retargeted but never
//! created or deleted from the command line.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{
    output_list, output_record, print_field, report, require, today, tone_style, truncate_str,
    Session,
};
use crate::cli::GlobalOpts;
use crate::core::entity::Sector;
use crate::core::identity::RecordId;
use crate::core::reducer::Action;
use crate::core::stats::search;
use crate::entities::Kpi;

#[derive(Subcommand, Debug)]
pub enum KpiCommands {
    /// List KPIs with achievement and trend
    List(ListArgs),

    /// Show a KPI's details
    Show(ShowArgs),

    /// Record a new measurement (trend follows the change)
    Set(SetArgs),

    /// Edit KPI target or metadata
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    /// Only KPIs whose achievement bar is below this percentage
    #[arg(long, value_name = "PERCENT")]
    pub below: Option<f64>,

    /// Search in name and description
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// KPI ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// KPI ID
    pub id: String,

    /// Measured value
    #[arg(allow_negative_numbers = true)]
    pub value: f64,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// KPI ID
    pub id: String,

    #[arg(long)]
    pub target: Option<f64>,

    #[arg(long)]
    pub unit: Option<String>,

    #[arg(long)]
    pub frequency: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

/// Run a KPI subcommand
pub fn run(cmd: KpiCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        KpiCommands::List(args) => run_list(args, global),
        KpiCommands::Show(args) => run_show(args, global),
        KpiCommands::Set(args) => run_set(args, global),
        KpiCommands::Edit(args) => run_edit(args, global),
    }
}

/// Value with its unit, e.g. `92 %` or `2.5 horas`
fn with_unit(value: f64, unit: &str) -> String {
    if unit.is_empty() {
        format!("{}", value)
    } else {
        format!("{} {}", value, unit)
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();

    let kpis: Vec<&Kpi> = search(&state.kpis, args.search.as_deref().unwrap_or(""))
        .into_iter()
        .filter(|k| args.sector.map_or(true, |s| k.sector == s))
        .filter(|k| args.below.map_or(true, |limit| k.achievement() < limit))
        .collect();

    output_list(
        &kpis,
        global.format,
        &["ID", "NAME", "CURRENT", "TARGET", "ACHIEVED", "TREND", "UPDATED"],
        |k| {
            vec![
                k.id.to_string(),
                truncate_str(&k.name, 32),
                with_unit(k.current_value, &k.unit),
                with_unit(k.target_value, &k.unit),
                format!("{:.0}%", k.achievement()),
                k.trend.arrow().to_string(),
                k.last_update.to_string(),
            ]
        },
    )
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let kpi = require(state.kpi(&RecordId::new(&args.id)), &args.id)?;

    output_record(&kpi, global.format, |k| {
        println!("{}", style(&k.name).bold());
        println!("{}", "─".repeat(60));
        print_field("ID", &k.id);
        print_field("Sector", k.sector);
        print_field("Current", with_unit(k.current_value, &k.unit));
        print_field("Target", with_unit(k.target_value, &k.unit));
        print_field("Achievement", format!("{:.0}%", k.achievement()));
        print_field(
            "Trend",
            tone_style(format!("{} {}", k.trend.arrow(), k.trend), k.trend.tone()),
        );
        print_field("Frequency", &k.frequency);
        print_field("Last update", k.last_update);
        if !k.description.is_empty() {
            println!();
            println!("{}", k.description);
        }
    })
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let kpi = require(state.kpi(&RecordId::new(&args.id)), &args.id)?;

    let measured = kpi.with_measurement(args.value, today());
    if !global.quiet {
        println!(
            "{} {} {} → {} {}",
            style("✓").green(),
            style(&measured.name).bold(),
            with_unit(kpi.current_value, &kpi.unit),
            with_unit(measured.current_value, &measured.unit),
            tone_style(measured.trend.arrow(), measured.trend.tone())
        );
        println!("   {:.0}% of target", measured.achievement());
    }
    session.dispatch(Action::UpdateKpi(measured));
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let state = session.state();
    let mut kpi = require(state.kpi(&RecordId::new(&args.id)), &args.id)?;

    if let Some(target) = args.target {
        kpi.target_value = target;
    }
    if let Some(unit) = args.unit {
        kpi.unit = unit;
    }
    if let Some(frequency) = args.frequency {
        kpi.frequency = frequency;
    }
    if let Some(description) = args.description {
        kpi.description = description;
    }

    report(global, "Updated", "KPI", &kpi.id, &kpi.name);
    session.dispatch(Action::UpdateKpi(kpi));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_unit() {
        assert_eq!(with_unit(92.0, "%"), "92 %");
        assert_eq!(with_unit(2.5, "horas"), "2.5 horas");
        assert_eq!(with_unit(3.0, ""), "3");
    }
}
