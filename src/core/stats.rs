//! Derived aggregates: counts, percentages, date buckets and dashboard summaries
//!
//! Everything here is computed on demand from an [`AppState`] and never stored.

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::entity::{Labeled, Record, RiskLevel, Sector};
use crate::core::state::AppState;
use crate::entities::document::DocumentStatus;
use crate::entities::ncr::{is_action_overdue, ActionStatus, NonConformityStatus};
use crate::entities::pdca::PdcaStatus;
use crate::entities::process::ProcessStatus;

/// Open non-conformities above which the dashboard raises an alert
pub const OPEN_NC_ALERT_THRESHOLD: usize = 5;

/// `value / total` as a whole percentage, rounded half up; 0 when `total` is 0
pub fn percentage(value: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (200 * value + total) / (2 * total)
}

/// Count items per label, in the label's declaration order
///
/// Every label appears, including those with no items.
pub fn aggregate_counts<T, K, F>(items: &[T], key_fn: F) -> Vec<(K, usize)>
where
    K: Labeled,
    F: Fn(&T) -> K,
{
    let mut counts: Vec<(K, usize)> = K::all().iter().map(|k| (*k, 0)).collect();
    for item in items {
        let key = key_fn(item);
        if let Some(slot) = counts.iter_mut().find(|(k, _)| *k == key) {
            slot.1 += 1;
        }
    }
    counts
}

/// Where a date falls relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateStatus {
    Overdue,
    Current,
    DueSoon,
    Upcoming,
}

impl DateStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DateStatus::Overdue => "Vencido",
            DateStatus::Current => "Hoy",
            DateStatus::DueSoon => "Próximo",
            DateStatus::Upcoming => "Pendiente",
        }
    }
}

/// Signed number of days from `today` until `target`
pub fn days_until(target: NaiveDate, today: NaiveDate) -> i64 {
    (target - today).num_days()
}

/// Days elapsed since `date`, zero for future dates
pub fn days_since(date: NaiveDate, today: NaiveDate) -> i64 {
    (today - date).num_days().max(0)
}

/// Overdue before today, Current today, DueSoon within a week, else Upcoming
pub fn date_status(target: NaiveDate, today: NaiveDate) -> DateStatus {
    match days_until(target, today) {
        d if d < 0 => DateStatus::Overdue,
        0 => DateStatus::Current,
        1..=7 => DateStatus::DueSoon,
        _ => DateStatus::Upcoming,
    }
}

/// Records belonging to `sector`; `None` keeps everything
pub fn filter_by_sector<T: Record>(items: &[T], sector: Option<Sector>) -> Vec<&T> {
    items
        .iter()
        .filter(|item| sector.map_or(true, |s| item.sector() == s))
        .collect()
}

/// Case-insensitive substring search over title and description
///
/// A blank term matches every record.
pub fn search<'a, T: Record>(items: &'a [T], term: &str) -> Vec<&'a T> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| {
            item.title().to_lowercase().contains(&needle)
                || item.description().to_lowercase().contains(&needle)
        })
        .collect()
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_documents: usize,
    pub active_documents: usize,
    pub total_processes: usize,
    pub active_processes: usize,
    pub open_non_conformities: usize,
    pub high_risks: usize,
    pub alerts: Vec<String>,
}

impl DashboardSummary {
    pub fn from_state(state: &AppState) -> Self {
        let open_non_conformities = state
            .non_conformities
            .iter()
            .filter(|nc| !nc.is_closed())
            .count();
        let high_risks = state.risks.iter().filter(|r| r.risk_level.is_high()).count();

        let mut alerts = Vec::new();
        if high_risks > 0 {
            alerts.push(format!("{} riesgo(s) de nivel alto requieren atención", high_risks));
        }
        if open_non_conformities > OPEN_NC_ALERT_THRESHOLD {
            alerts.push(format!(
                "{} no conformidades abiertas superan el umbral de {}",
                open_non_conformities, OPEN_NC_ALERT_THRESHOLD
            ));
        }

        Self {
            total_documents: state.documents.len(),
            active_documents: state
                .documents
                .iter()
                .filter(|d| d.status == DocumentStatus::Activo)
                .count(),
            total_processes: state.processes.len(),
            active_processes: state
                .processes
                .iter()
                .filter(|p| p.status == ProcessStatus::Activo)
                .count(),
            open_non_conformities,
            high_risks,
            alerts,
        }
    }
}

/// Risks bucketed into three bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskSummary {
    pub fn from_state(state: &AppState) -> Self {
        let mut summary = Self {
            total: state.risks.len(),
            high: 0,
            medium: 0,
            low: 0,
        };
        for risk in state.risks.iter() {
            match risk.risk_level {
                RiskLevel::Alto | RiskLevel::MuyAlto => summary.high += 1,
                RiskLevel::Medio => summary.medium += 1,
                RiskLevel::Bajo | RiskLevel::MuyBajo => summary.low += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonConformitySummary {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub critical: usize,
    /// Open records with at least one overdue action
    pub overdue: usize,
}

impl NonConformitySummary {
    pub fn from_state(state: &AppState, today: NaiveDate) -> Self {
        let ncs = &state.non_conformities;
        let closed = ncs
            .iter()
            .filter(|nc| nc.status == NonConformityStatus::Cerrada)
            .count();
        Self {
            total: ncs.len(),
            open: ncs.len() - closed,
            closed,
            critical: ncs.iter().filter(|nc| nc.severity.is_critical()).count(),
            overdue: ncs.iter().filter(|nc| nc.has_overdue_actions(today)).count(),
        }
    }
}

/// Corrective actions across every non-conformity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl ActionSummary {
    pub fn from_state(state: &AppState, today: NaiveDate) -> Self {
        let mut summary = Self {
            total: 0,
            pending: 0,
            in_progress: 0,
            completed: 0,
            overdue: 0,
        };
        let actions = state
            .non_conformities
            .iter()
            .flat_map(|nc| nc.corrective_actions.iter());
        for action in actions {
            summary.total += 1;
            match action.status {
                ActionStatus::Pendiente => summary.pending += 1,
                ActionStatus::EnProgreso => summary.in_progress += 1,
                ActionStatus::Completada => summary.completed += 1,
                ActionStatus::Vencida => {}
            }
            if is_action_overdue(action, today) {
                summary.overdue += 1;
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdcaSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Planificado or Pendiente
    pub planned: usize,
    pub high_priority: usize,
}

impl PdcaSummary {
    pub fn from_state(state: &AppState) -> Self {
        let items = &state.pdca_items;
        let with_status = |wanted: &[PdcaStatus]| {
            items.iter().filter(|i| wanted.contains(&i.status)).count()
        };
        Self {
            total: items.len(),
            completed: with_status(&[PdcaStatus::Completado]),
            in_progress: with_status(&[PdcaStatus::EnProgreso]),
            planned: with_status(&[PdcaStatus::Planificado, PdcaStatus::Pendiente]),
            high_priority: items.iter().filter(|i| i.is_high_priority()).count(),
        }
    }
}
