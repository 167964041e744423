//! `qmt dispatch` command - Apply a serialized action to the store
//!
//! Accepts the wire form `{"type": "ADD_RISK", "payload": {...}}`.
//! Unknown or malformed actions leave the state untouched.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::Read;
use std::sync::Arc;

use crate::cli::helpers::Session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::state::AppState;

#[derive(clap::Args, Debug)]
pub struct DispatchArgs {
    /// Action JSON, or "-" to read it from stdin
    pub action: String,
}

/// Names of the parts of the state that differ between two snapshots
fn changed_parts(before: &AppState, after: &AppState) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if !Arc::ptr_eq(&before.documents, &after.documents) {
        changed.push("documents");
    }
    if !Arc::ptr_eq(&before.processes, &after.processes) {
        changed.push("processes");
    }
    if !Arc::ptr_eq(&before.risks, &after.risks) {
        changed.push("risks");
    }
    if !Arc::ptr_eq(&before.opportunities, &after.opportunities) {
        changed.push("opportunities");
    }
    if !Arc::ptr_eq(&before.pdca_items, &after.pdca_items) {
        changed.push("pdcaItems");
    }
    if !Arc::ptr_eq(&before.non_conformities, &after.non_conformities) {
        changed.push("nonConformities");
    }
    if !Arc::ptr_eq(&before.kpis, &after.kpis) {
        changed.push("kpis");
    }
    if before.dark_mode != after.dark_mode {
        changed.push("darkMode");
    }
    changed
}

pub fn run(args: DispatchArgs, global: &GlobalOpts) -> Result<()> {
    let raw = if args.action == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).into_diagnostic()?;
        buf
    } else {
        args.action
    };

    let mut session = Session::open(global)?;
    let before = session.state();
    let after = session.store.dispatch_json(&raw);
    let changed = if Arc::ptr_eq(&before, &after) {
        None
    } else {
        Some(changed_parts(&before, &after))
    };

    match global.format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "applied": changed.is_some(),
                "changed": changed.clone().unwrap_or_default(),
            });
            println!("{}", out);
        }
        _ if global.quiet => {}
        _ => match changed {
            None => println!("{}", style("Action ignored (unknown or malformed)").yellow()),
            Some(parts) if parts.is_empty() => {
                println!("{} Action applied, nothing changed", style("✓").green())
            }
            Some(parts) => println!(
                "{} Action applied: {}",
                style("✓").green(),
                parts.join(", ")
            ),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::RecordId;
    use crate::core::reducer::{reduce, Action};
    use crate::core::seed;

    #[test]
    fn test_changed_parts_names_touched_collection() {
        let state = seed::initial_data();
        let next = reduce(&state, Action::DeleteRisk(RecordId::new("1")));
        assert_eq!(changed_parts(&state, &next), vec!["risks"]);

        let toggled = reduce(&state, Action::ToggleDarkMode);
        assert_eq!(changed_parts(&state, &toggled), vec!["darkMode"]);
    }

    #[test]
    fn test_changed_parts_empty_for_missing_id() {
        let state = seed::initial_data();
        let next = reduce(&state, Action::DeleteRisk(RecordId::new("99")));
        assert!(changed_parts(&state, &next).is_empty());
    }
}
