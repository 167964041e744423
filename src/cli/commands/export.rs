//! `qmt export` command - Write a collection as CSV

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli::helpers::Session;
use crate::cli::GlobalOpts;
use crate::core::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Documents,
    Processes,
    Risks,
    Opportunities,
    Pdca,
    Ncrs,
    /// Corrective actions of every non-conformity, one row each
    Actions,
    Kpis,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Collection to export
    #[arg(value_enum)]
    pub collection: Collection,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let state = session.state();
    let (headers, rows) = table(&state, args.collection);

    let sink: Box<dyn Write> = match args.output {
        Some(ref path) => Box::new(std::fs::File::create(path).into_diagnostic()?),
        None => Box::new(io::stdout()),
    };
    let mut wtr = csv::Writer::from_writer(sink);
    wtr.write_record(&headers).into_diagnostic()?;
    for row in &rows {
        wtr.write_record(row).into_diagnostic()?;
    }
    wtr.flush().into_diagnostic()?;

    if let Some(path) = args.output {
        if !global.quiet {
            eprintln!(
                "{} Exported {} row(s) to {}",
                style("✓").green(),
                rows.len(),
                style(path.display()).cyan()
            );
        }
    }
    Ok(())
}

/// Header row and data rows for one collection
fn table(state: &AppState, collection: Collection) -> (Vec<&'static str>, Vec<Vec<String>>) {
    match collection {
        Collection::Documents => (
            vec![
                "id", "title", "type", "sector", "status", "version", "author", "fileName",
                "fileSize", "uploadDate", "lastModified",
            ],
            state
                .documents
                .iter()
                .map(|d| {
                    vec![
                        d.id.to_string(),
                        d.title.clone(),
                        d.doc_type.to_string(),
                        d.sector.to_string(),
                        d.status.to_string(),
                        d.version.clone(),
                        d.author.clone(),
                        d.file_name.clone(),
                        d.file_size.clone(),
                        d.upload_date.to_string(),
                        d.last_modified.to_string(),
                    ]
                })
                .collect(),
        ),
        Collection::Processes => (
            vec![
                "id", "name", "sector", "owner", "status", "version", "steps", "lastReview",
                "nextReview",
            ],
            state
                .processes
                .iter()
                .map(|p| {
                    vec![
                        p.id.to_string(),
                        p.name.clone(),
                        p.sector.to_string(),
                        p.owner.clone(),
                        p.status.to_string(),
                        p.version.clone(),
                        p.steps.len().to_string(),
                        p.last_review.to_string(),
                        p.next_review.to_string(),
                    ]
                })
                .collect(),
        ),
        Collection::Risks => (
            vec![
                "id", "title", "sector", "category", "probability", "impact", "riskLevel",
                "status", "responsible", "identifiedDate", "reviewDate",
            ],
            state
                .risks
                .iter()
                .map(|r| {
                    vec![
                        r.id.to_string(),
                        r.title.clone(),
                        r.sector.to_string(),
                        r.category.to_string(),
                        r.probability.to_string(),
                        r.impact.to_string(),
                        r.risk_level.to_string(),
                        r.status.to_string(),
                        r.responsible.clone(),
                        r.identified_date.to_string(),
                        r.review_date.to_string(),
                    ]
                })
                .collect(),
        ),
        Collection::Opportunities => (
            vec![
                "id", "title", "sector", "category", "priority", "status", "responsible",
                "expectedBenefit", "identifiedDate", "targetDate",
            ],
            state
                .opportunities
                .iter()
                .map(|o| {
                    vec![
                        o.id.to_string(),
                        o.title.clone(),
                        o.sector.to_string(),
                        o.category.to_string(),
                        o.priority.to_string(),
                        o.status.to_string(),
                        o.responsible.clone(),
                        o.expected_benefit.clone(),
                        o.identified_date.to_string(),
                        o.target_date.to_string(),
                    ]
                })
                .collect(),
        ),
        Collection::Pdca => (
            vec![
                "id", "title", "sector", "phase", "status", "priority", "progress",
                "responsible", "targetDate", "completionDate",
            ],
            state
                .pdca_items
                .iter()
                .map(|i| {
                    vec![
                        i.id.to_string(),
                        i.title.clone(),
                        i.sector.to_string(),
                        i.phase.to_string(),
                        i.status.to_string(),
                        i.priority.to_string(),
                        i.progress().to_string(),
                        i.responsible.clone(),
                        i.target_date.to_string(),
                        i.completion_date.map(|d| d.to_string()).unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
        Collection::Ncrs => (
            vec![
                "id", "title", "sector", "severity", "source", "status", "identifiedBy",
                "identifiedDate", "actions", "closeDate",
            ],
            state
                .non_conformities
                .iter()
                .map(|n| {
                    vec![
                        n.id.to_string(),
                        n.title.clone(),
                        n.sector.to_string(),
                        n.severity.to_string(),
                        n.source.to_string(),
                        n.status.to_string(),
                        n.identified_by.clone(),
                        n.identified_date.to_string(),
                        n.corrective_actions.len().to_string(),
                        n.close_date.map(|d| d.to_string()).unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
        Collection::Actions => (
            vec![
                "ncr", "id", "description", "responsible", "status", "targetDate",
                "completionDate",
            ],
            state
                .non_conformities
                .iter()
                .flat_map(|n| n.corrective_actions.iter().map(move |a| (n, a)))
                .map(|(n, a)| {
                    vec![
                        n.id.to_string(),
                        a.id.to_string(),
                        a.description.clone(),
                        a.responsible.clone(),
                        a.status.to_string(),
                        a.target_date.to_string(),
                        a.completion_date.map(|d| d.to_string()).unwrap_or_default(),
                    ]
                })
                .collect(),
        ),
        Collection::Kpis => (
            vec![
                "id", "name", "sector", "currentValue", "targetValue", "unit", "frequency",
                "trend", "lastUpdate",
            ],
            state
                .kpis
                .iter()
                .map(|k| {
                    vec![
                        k.id.to_string(),
                        k.name.clone(),
                        k.sector.to_string(),
                        k.current_value.to_string(),
                        k.target_value.to_string(),
                        k.unit.clone(),
                        k.frequency.clone(),
                        k.trend.to_string(),
                        k.last_update.to_string(),
                    ]
                })
                .collect(),
        ),
    }
}
