//! Opportunity entity type - improvement opportunities tracked alongside risks

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::entity::{label_enum, Priority, Record, Sector, Tone};
use crate::core::identity::RecordId;

label_enum! {
    /// Opportunity category
    #[derive(Default)]
    pub enum OpportunityCategory {
        #[default]
        MejoraProceso => ("mejora-proceso", "Mejora de Proceso"),
        Innovacion => ("innovacion", "Innovación"),
        Expansion => ("expansion", "Expansión"),
        Eficiencia => ("eficiencia", "Eficiencia"),
        Cliente => ("cliente", "Cliente"),
        Talento => ("talento", "Talento"),
    }
}

label_enum! {
    /// Opportunity status
    #[derive(Default)]
    pub enum OpportunityStatus {
        #[default]
        Identificada => ("identificada", "Identificada"),
        EnEvaluacion => ("en-evaluacion", "En Evaluación"),
        EnImplementacion => ("en-implementacion", "En Implementación"),
        Implementada => ("implementada", "Implementada"),
        Cancelada => ("cancelada", "Cancelada"),
    }
}

impl OpportunityStatus {
    pub fn tone(&self) -> Tone {
        match self {
            OpportunityStatus::Identificada => Tone::Neutral,
            OpportunityStatus::EnEvaluacion | OpportunityStatus::EnImplementacion => Tone::Warning,
            OpportunityStatus::Implementada => Tone::Success,
            OpportunityStatus::Cancelada => Tone::Danger,
        }
    }

    /// Implemented or cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OpportunityStatus::Implementada | OpportunityStatus::Cancelada
        )
    }
}

/// An improvement opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: RecordId,

    pub title: String,

    pub description: String,

    pub sector: Sector,

    pub category: OpportunityCategory,

    pub priority: Priority,

    /// Expected benefit (free text)
    pub expected_benefit: String,

    pub responsible: String,

    pub status: OpportunityStatus,

    pub identified_date: NaiveDate,

    pub target_date: NaiveDate,
}

impl Record for Opportunity {
    const KIND: &'static str = "opportunity";

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

impl Opportunity {
    /// Create a newly identified opportunity
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
            sector: Sector::default(),
            category: OpportunityCategory::default(),
            priority: Priority::default(),
            expected_benefit: String::new(),
            responsible,
            status: OpportunityStatus::default(),
            identified_date: today,
            target_date,
        }
    }

    /// Past its target date and not yet implemented or cancelled
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.target_date < today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_opportunity_defaults() {
        let opp = Opportunity::new(
            RecordId::new("1"),
            "Automatización".to_string(),
            "Ana".to_string(),
            date("2024-01-15"),
            date("2024-06-30"),
        );
        assert_eq!(opp.status, OpportunityStatus::Identificada);
        assert_eq!(opp.priority, Priority::Media);
    }

    #[test]
    fn test_opportunity_overdue() {
        let mut opp = Opportunity::new(
            RecordId::new("1"),
            "Automatización".to_string(),
            "Ana".to_string(),
            date("2024-01-15"),
            date("2024-06-30"),
        );
        assert!(!opp.is_overdue(date("2024-06-30")));
        assert!(opp.is_overdue(date("2024-07-01")));

        opp.status = OpportunityStatus::Implementada;
        assert!(!opp.is_overdue(date("2024-07-01")));
    }

    #[test]
    fn test_category_label_roundtrip() {
        let json = serde_json::to_string(&OpportunityCategory::MejoraProceso).unwrap();
        assert_eq!(json, "\"Mejora de Proceso\"");
        assert_eq!(
            "mejora de proceso".parse::<OpportunityCategory>().unwrap(),
            OpportunityCategory::MejoraProceso
        );
    }
}
