//! `qmt status` command - Quality system dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;

use crate::cli::helpers::{today, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::{Record, RiskLevel, Sector};
use crate::core::state::AppState;
use crate::core::stats::{
    aggregate_counts, days_since, filter_by_sector, percentage, ActionSummary, DashboardSummary,
    NonConformitySummary, PdcaSummary, RiskSummary,
};
use crate::entities::document::DocumentStatus;
use crate::entities::pdca::PdcaPhase;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Restrict every figure to one sector
    #[arg(long, short = 's')]
    pub sector: Option<Sector>,

    /// Show per-status and per-sector breakdowns
    #[arg(long)]
    pub detailed: bool,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let full = session.state();
    let state = scoped(&full, args.sector);
    let today = today();

    let dashboard = DashboardSummary::from_state(&state);
    let risks = RiskSummary::from_state(&state);
    let ncs = NonConformitySummary::from_state(&state, today);
    let actions = ActionSummary::from_state(&state, today);
    let pdca = PdcaSummary::from_state(&state);
    let kpi_achievement = average_achievement(&state);

    match global.format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "sector": args.sector.map(|s| s.label()),
                "dashboard": dashboard,
                "risks": risks,
                "nonConformities": ncs,
                "actions": actions,
                "pdca": pdca,
                "kpis": { "total": state.kpis.len(), "averageAchievement": kpi_achievement },
                "darkMode": full.dark_mode,
            });
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Yaml => {
            let status = serde_json::json!({
                "dashboard": dashboard,
                "risks": risks,
                "nonConformities": ncs,
                "actions": actions,
                "pdca": pdca,
            });
            print!("{}", serde_yml::to_string(&status).into_diagnostic()?);
            return Ok(());
        }
        _ => {}
    }

    let width = 68;
    let title = match args.sector {
        Some(sector) => format!("Quality System Status: {}", sector),
        None => "Quality System Status".to_string(),
    };
    println!("{}", style(title).bold().underlined());
    println!("{}", "═".repeat(width));
    println!();

    print_two_columns(
        "DOCUMENTATION",
        &[
            format!(
                "Documents: {} ({} active, {}%)",
                dashboard.total_documents,
                dashboard.active_documents,
                percentage(dashboard.active_documents, dashboard.total_documents)
            ),
            format!(
                "Processes: {} ({} active)",
                dashboard.total_processes, dashboard.active_processes
            ),
        ],
        "RISKS",
        &[
            format!("Total: {}", risks.total),
            format!("High: {}  Medium: {}  Low: {}", risks.high, risks.medium, risks.low),
        ],
    );
    println!();

    let oldest_open = state
        .non_conformities
        .iter()
        .filter(|nc| !nc.is_closed())
        .map(|nc| days_since(nc.identified_date, today))
        .max();
    let mut nc_lines = vec![
        format!("Total: {} ({} open, {} closed)", ncs.total, ncs.open, ncs.closed),
        format!("Critical: {}  With overdue: {}", ncs.critical, ncs.overdue),
    ];
    if let Some(days) = oldest_open {
        nc_lines.push(format!("Oldest open: {} days", days));
    }
    print_two_columns(
        "NON-CONFORMITIES",
        &nc_lines,
        "CORRECTIVE ACTIONS",
        &[
            format!(
                "Total: {} ({}% completed)",
                actions.total,
                percentage(actions.completed, actions.total)
            ),
            format!(
                "Pending: {}  In progress: {}",
                actions.pending, actions.in_progress
            ),
            format!("Overdue: {}", actions.overdue),
        ],
    );
    println!();

    print_two_columns(
        "PDCA",
        &[
            format!(
                "Total: {} ({}% completed)",
                pdca.total,
                percentage(pdca.completed, pdca.total)
            ),
            format!("In progress: {}  Planned: {}", pdca.in_progress, pdca.planned),
            format!("High priority: {}", pdca.high_priority),
        ],
        "KPIS",
        &[
            format!("Tracked: {}", state.kpis.len()),
            format!("Average achievement: {}%", kpi_achievement),
        ],
    );

    if args.detailed {
        println!();
        print_section(
            "DOCUMENTS BY STATUS",
            &count_lines(&aggregate_counts(&state.documents, |d| d.status), |s: DocumentStatus| {
                s.label()
            }),
        );
        println!();
        print_section(
            "RISKS BY LEVEL",
            &count_lines(&aggregate_counts(&state.risks, |r| r.risk_level), |l: RiskLevel| {
                l.label()
            }),
        );
        println!();
        print_section(
            "PDCA BY PHASE",
            &count_lines(&aggregate_counts(&state.pdca_items, |i| i.phase), |p: PdcaPhase| {
                p.label()
            }),
        );
        if args.sector.is_none() {
            println!();
            print_section("RECORDS BY SECTOR", &sector_lines(&state));
        }
    }

    println!();
    println!("{}", "═".repeat(width));
    if dashboard.alerts.is_empty() {
        println!("{}", style("No alerts").green().bold());
    } else {
        for alert in &dashboard.alerts {
            println!("{} {}", style("⚠").yellow().bold(), style(alert).yellow());
        }
    }
    Ok(())
}

/// A state holding only the records of `sector`; `None` shares everything
fn scoped(state: &Arc<AppState>, sector: Option<Sector>) -> AppState {
    if sector.is_none() {
        return AppState::clone(state);
    }
    fn only<T: Record + Clone>(items: &[T], sector: Option<Sector>) -> Arc<Vec<T>> {
        Arc::new(filter_by_sector(items, sector).into_iter().cloned().collect())
    }
    AppState {
        documents: only(&state.documents, sector),
        processes: only(&state.processes, sector),
        risks: only(&state.risks, sector),
        opportunities: only(&state.opportunities, sector),
        pdca_items: only(&state.pdca_items, sector),
        non_conformities: only(&state.non_conformities, sector),
        kpis: only(&state.kpis, sector),
        dark_mode: state.dark_mode,
    }
}

/// Mean of the capped KPI achievement bars, rounded; 0 with no KPIs
fn average_achievement(state: &AppState) -> u32 {
    if state.kpis.is_empty() {
        return 0;
    }
    let sum: f64 = state.kpis.iter().map(|k| k.achievement()).sum();
    (sum / state.kpis.len() as f64).round() as u32
}

fn count_lines<K: Copy>(counts: &[(K, usize)], label: impl Fn(K) -> &'static str) -> Vec<String> {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    counts
        .iter()
        .map(|(k, n)| format!("{:<20} {:>3} ({}%)", label(*k), n, percentage(*n, total)))
        .collect()
}

fn sector_lines(state: &AppState) -> Vec<String> {
    Sector::all()
        .iter()
        .map(|sector| {
            let some = Some(*sector);
            let count = filter_by_sector(&state.documents, some).len()
                + filter_by_sector(&state.processes, some).len()
                + filter_by_sector(&state.risks, some).len()
                + filter_by_sector(&state.opportunities, some).len()
                + filter_by_sector(&state.pdca_items, some).len()
                + filter_by_sector(&state.non_conformities, some).len()
                + filter_by_sector(&state.kpis, some).len();
            format!("{:<20} {:>3}", sector.label(), count)
        })
        .collect()
}

fn print_two_columns(title1: &str, lines1: &[String], title2: &str, lines2: &[String]) {
    let col_width = 34;

    println!("{:<col_width$} {}", style(title1).bold(), style(title2).bold());
    println!("{:-<col_width$} {:-<col_width$}", "", "");

    let max_lines = lines1.len().max(lines2.len());
    for i in 0..max_lines {
        let l1 = lines1.get(i).map(|s| s.as_str()).unwrap_or("");
        let l2 = lines2.get(i).map(|s| s.as_str()).unwrap_or("");
        println!("  {:<32} {}", l1, l2);
    }
}

fn print_section(title: &str, lines: &[String]) {
    println!("{}", style(title).bold());
    println!("{:-<64}", "");
    for line in lines {
        println!("  {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed;

    #[test]
    fn test_scoped_without_sector_shares_collections() {
        let state = Arc::new(seed::initial_data());
        let scoped = scoped(&state, None);
        assert!(Arc::ptr_eq(&scoped.risks, &state.risks));
    }

    #[test]
    fn test_scoped_keeps_only_sector() {
        let state = Arc::new(seed::initial_data());
        let sector = state.risks[0].sector;
        let scoped = scoped(&state, Some(sector));
        assert!(!scoped.risks.is_empty());
        assert!(scoped.risks.iter().all(|r| r.sector == sector));
        assert!(scoped.documents.iter().all(|d| d.sector == sector));
    }

    #[test]
    fn test_average_achievement_uses_capped_bars() {
        let state = seed::initial_data();
        // 100 + 100 + 96.8 + 100 + 91.8 + 94.4
        assert_eq!(average_achievement(&state), 97);
        assert_eq!(average_achievement(&AppState::default()), 0);
    }

    #[test]
    fn test_count_lines_include_percentages() {
        let lines = count_lines(&[(PdcaPhase::Plan, 1), (PdcaPhase::Do, 3)], |p| p.label());
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("25%"));
        assert!(lines[1].contains("75%"));
    }
}
