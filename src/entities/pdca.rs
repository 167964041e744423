//! PDCA entity type - Plan-Do-Check-Act improvement cycles

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::entity::{label_enum, Priority, Record, Sector, Tone};
use crate::core::identity::RecordId;

label_enum! {
    /// Cycle phase, in execution order
    #[derive(Default)]
    pub enum PdcaPhase {
        #[default]
        Plan => ("plan", "Plan"),
        Do => ("do", "Do"),
        Check => ("check", "Check"),
        Act => ("act", "Act"),
    }
}

impl PdcaPhase {
    /// Progress credited for reaching this phase
    pub fn base_progress(&self) -> u8 {
        match self {
            PdcaPhase::Plan => 25,
            PdcaPhase::Do => 50,
            PdcaPhase::Check => 75,
            PdcaPhase::Act => 100,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            PdcaPhase::Plan => Tone::Info,
            PdcaPhase::Do => Tone::Warning,
            PdcaPhase::Check => Tone::Neutral,
            PdcaPhase::Act => Tone::Success,
        }
    }

    /// Following phase; Act wraps around to Plan for the next cycle
    pub fn next(&self) -> PdcaPhase {
        match self {
            PdcaPhase::Plan => PdcaPhase::Do,
            PdcaPhase::Do => PdcaPhase::Check,
            PdcaPhase::Check => PdcaPhase::Act,
            PdcaPhase::Act => PdcaPhase::Plan,
        }
    }
}

label_enum! {
    /// Status of a PDCA item within its current phase
    #[derive(Default)]
    pub enum PdcaStatus {
        Pendiente => ("pendiente", "Pendiente"),
        EnProgreso => ("en-progreso", "En Progreso"),
        Completado => ("completado", "Completado"),
        Bloqueado => ("bloqueado", "Bloqueado"),
        #[default]
        Planificado => ("planificado", "Planificado"),
    }
}

impl PdcaStatus {
    pub fn tone(&self) -> Tone {
        match self {
            PdcaStatus::Completado => Tone::Success,
            PdcaStatus::EnProgreso => Tone::Warning,
            PdcaStatus::Bloqueado => Tone::Danger,
            PdcaStatus::Pendiente | PdcaStatus::Planificado => Tone::Neutral,
        }
    }
}

/// Progress percentage (0-100) of a PDCA item
///
/// The phase sets a base (Plan 25, Do 50, Check 75, Act 100). Completado is
/// always 100; En Progreso takes 10 off the base; Planificado and Pendiente
/// take 20 off, floored at 0. Bloqueado keeps the base.
pub fn pdca_progress(phase: PdcaPhase, status: PdcaStatus) -> u8 {
    let base = phase.base_progress();
    match status {
        PdcaStatus::Completado => 100,
        PdcaStatus::EnProgreso => base.saturating_sub(10),
        PdcaStatus::Planificado | PdcaStatus::Pendiente => base.saturating_sub(20),
        PdcaStatus::Bloqueado => base,
    }
}

/// A PDCA improvement item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdcaItem {
    pub id: RecordId,

    pub title: String,

    pub description: String,

    pub phase: PdcaPhase,

    pub sector: Sector,

    pub priority: Priority,

    pub responsible: String,

    pub status: PdcaStatus,

    #[serde(default)]
    pub planned_actions: String,

    #[serde(default)]
    pub actual_results: String,

    #[serde(default)]
    pub lessons: String,

    #[serde(default)]
    pub next_steps: String,

    pub created_date: NaiveDate,

    pub last_updated: NaiveDate,

    pub target_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<NaiveDate>,
}

impl Record for PdcaItem {
    const KIND: &'static str = "PDCA item";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn sector(&self) -> Sector {
        self.sector
    }

    fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

impl PdcaItem {
    /// Create a new planned item in the Plan phase
    pub fn new(
        id: RecordId,
        title: String,
        responsible: String,
        today: NaiveDate,
        target_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            phase: PdcaPhase::default(),
            sector: Sector::default(),
            priority: Priority::default(),
            responsible,
            status: PdcaStatus::default(),
            planned_actions: String::new(),
            actual_results: String::new(),
            lessons: String::new(),
            next_steps: String::new(),
            created_date: today,
            last_updated: today,
            target_date,
            completion_date: None,
        }
    }

    /// Derived progress; never stored
    pub fn progress(&self) -> u8 {
        pdca_progress(self.phase, self.status)
    }

    /// Copy with a new phase/status as of `today`
    ///
    /// Completing the item stamps `completion_date`; leaving Completado clears it.
    pub fn with_state(&self, phase: PdcaPhase, status: PdcaStatus, today: NaiveDate) -> Self {
        let mut next = self.clone();
        next.phase = phase;
        next.status = status;
        next.last_updated = today;
        next.completion_date = match status {
            PdcaStatus::Completado => Some(self.completion_date.unwrap_or(today)),
            _ => None,
        };
        next
    }

    /// Alta or Crítica priority
    pub fn is_high_priority(&self) -> bool {
        self.priority >= Priority::Alta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_progress_documented_cases() {
        assert_eq!(pdca_progress(PdcaPhase::Plan, PdcaStatus::Pendiente), 5);
        assert_eq!(pdca_progress(PdcaPhase::Do, PdcaStatus::EnProgreso), 40);
        assert_eq!(pdca_progress(PdcaPhase::Plan, PdcaStatus::Planificado), 5);
        assert_eq!(pdca_progress(PdcaPhase::Check, PdcaStatus::Bloqueado), 75);
    }

    #[test]
    fn test_progress_completed_is_always_full() {
        for phase in PdcaPhase::all() {
            assert_eq!(pdca_progress(*phase, PdcaStatus::Completado), 100);
        }
    }

    #[test]
    fn test_progress_act_not_completed() {
        assert_eq!(pdca_progress(PdcaPhase::Act, PdcaStatus::Bloqueado), 100);
        assert_eq!(pdca_progress(PdcaPhase::Act, PdcaStatus::EnProgreso), 90);
        assert_eq!(pdca_progress(PdcaPhase::Act, PdcaStatus::Planificado), 80);
    }

    #[test]
    fn test_progress_stays_in_range() {
        for phase in PdcaPhase::all() {
            for status in PdcaStatus::all() {
                assert!(pdca_progress(*phase, *status) <= 100);
            }
        }
    }

    #[test]
    fn test_with_state_stamps_completion() {
        let item = PdcaItem::new(
            RecordId::new("1"),
            "Mejora".to_string(),
            "Ana".to_string(),
            date("2024-01-15"),
            date("2024-06-15"),
        );
        assert_eq!(item.progress(), 5);

        let done = item.with_state(PdcaPhase::Check, PdcaStatus::Completado, date("2024-03-25"));
        assert_eq!(done.completion_date, Some(date("2024-03-25")));
        assert_eq!(done.last_updated, date("2024-03-25"));
        assert_eq!(done.progress(), 100);

        let reopened = done.with_state(PdcaPhase::Act, PdcaStatus::EnProgreso, date("2024-04-01"));
        assert_eq!(reopened.completion_date, None);
        assert_eq!(reopened.progress(), 90);
    }

    #[test]
    fn test_phase_order_and_next() {
        assert!(PdcaPhase::Plan < PdcaPhase::Do);
        assert!(PdcaPhase::Check < PdcaPhase::Act);
        assert_eq!(PdcaPhase::Act.next(), PdcaPhase::Plan);
    }
}
