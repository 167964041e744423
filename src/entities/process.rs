//! Process entity type - documented business processes and their steps

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::entity::{label_enum, Record, Sector, Tone};
use crate::core::identity::RecordId;

label_enum! {
    /// Process lifecycle status
    #[derive(Default)]
    pub enum ProcessStatus {
        #[default]
        Activo => ("activo", "Activo"),
        EnRevision => ("en-revision", "En Revisión"),
        Obsoleto => ("obsoleto", "Obsoleto"),
        Suspendido => ("suspendido", "Suspendido"),
    }
}

impl ProcessStatus {
    pub fn tone(&self) -> Tone {
        match self {
            ProcessStatus::Activo => Tone::Success,
            ProcessStatus::EnRevision => Tone::Warning,
            ProcessStatus::Obsoleto => Tone::Danger,
            ProcessStatus::Suspendido => Tone::Neutral,
        }
    }
}

/// One step of a process, owned by its parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStep {
    /// Identifier, unique within the parent process only
    pub id: RecordId,

    pub name: String,

    pub description: String,

    /// Role or person carrying out the step
    pub responsible: String,

    /// Free-text duration estimate (e.g., "2-3 días")
    pub estimated_time: String,

    #[serde(default)]
    pub resources: Vec<String>,
}

/// A documented process with an ordered list of steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: RecordId,

    pub name: String,

    pub description: String,

    pub sector: Sector,

    pub owner: String,

    pub status: ProcessStatus,

    pub last_review: NaiveDate,

    pub next_review: NaiveDate,

    pub version: String,

    /// Ordered steps; empty is valid but flagged as incomplete
    #[serde(default)]
    pub steps: Vec<ProcessStep>,
}

impl Record for Process {
    const KIND: &'static str = "process";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
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

impl Process {
    /// Create a new active process reviewed today, next review in six months
    pub fn new(id: RecordId, name: String, owner: String, today: NaiveDate) -> Self {
        Self {
            id,
            name,
            description: String::new(),
            sector: Sector::default(),
            owner,
            status: ProcessStatus::default(),
            last_review: today,
            next_review: today
                .checked_add_months(chrono::Months::new(6))
                .unwrap_or(today),
            version: "1.0".to_string(),
            steps: Vec::new(),
        }
    }

    /// A process without steps is allowed but incomplete
    pub fn is_incomplete(&self) -> bool {
        self.steps.is_empty()
    }

    /// True when the next review date has passed
    pub fn is_review_due(&self, today: NaiveDate) -> bool {
        self.next_review < today
    }

    /// Copy with a step appended
    pub fn with_step(&self, step: ProcessStep) -> Self {
        let mut next = self.clone();
        next.steps.push(step);
        next
    }

    /// Copy with the step of the given id removed (unchanged if absent)
    pub fn without_step(&self, step_id: &RecordId) -> Self {
        let mut next = self.clone();
        next.steps.retain(|s| &s.id != step_id);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn step(id: &str) -> ProcessStep {
        ProcessStep {
            id: RecordId::new(id),
            name: "Implementación".to_string(),
            description: "Codificación".to_string(),
            responsible: "Desarrollador".to_string(),
            estimated_time: "5-10 días".to_string(),
            resources: vec!["IDE".to_string()],
        }
    }

    #[test]
    fn test_new_process_is_incomplete() {
        let p = Process::new(
            RecordId::new("1"),
            "Desarrollo".to_string(),
            "Carlos".to_string(),
            date("2024-01-15"),
        );
        assert!(p.is_incomplete());
        assert_eq!(p.next_review, date("2024-07-15"));
    }

    #[test]
    fn test_step_edits_return_new_parent() {
        let p = Process::new(
            RecordId::new("1"),
            "Desarrollo".to_string(),
            "Carlos".to_string(),
            date("2024-01-15"),
        );
        let with = p.with_step(step("1-1")).with_step(step("1-2"));
        assert!(p.steps.is_empty());
        assert_eq!(with.steps.len(), 2);

        let without = with.without_step(&RecordId::new("1-1"));
        assert_eq!(without.steps.len(), 1);
        assert_eq!(without.steps[0].id, "1-2");

        let unchanged = with.without_step(&RecordId::new("9-9"));
        assert_eq!(unchanged, with);
    }

    #[test]
    fn test_review_due() {
        let p = Process::new(
            RecordId::new("1"),
            "QA".to_string(),
            "Ana".to_string(),
            date("2024-01-01"),
        );
        assert!(!p.is_review_due(date("2024-07-01")));
        assert!(p.is_review_due(date("2024-07-02")));
    }

    #[test]
    fn test_process_serializes_steps() {
        let p = Process::new(
            RecordId::new("1"),
            "QA".to_string(),
            "Ana".to_string(),
            date("2024-01-01"),
        )
        .with_step(step("1-1"));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["steps"][0]["estimatedTime"], "5-10 días");
        assert_eq!(json["lastReview"], "2024-01-01");
    }
}
