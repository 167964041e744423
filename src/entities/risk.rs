//! Risk entity type (probability × impact risk matrix)

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::entity::{label_enum, Record, RiskLevel, Sector, Tone};
use crate::core::identity::RecordId;

/// Days between identification (or edit) and the next scheduled review
pub const REVIEW_INTERVAL_DAYS: u64 = 90;

label_enum! {
    /// Risk category
    #[derive(Default)]
    pub enum RiskCategory {
        #[default]
        Operacional => ("operacional", "Operacional"),
        Financiero => ("financiero", "Financiero"),
        Tecnologico => ("tecnologico", "Tecnológico"),
        Reputacional => ("reputacional", "Reputacional"),
        Legal => ("legal", "Legal"),
        Ambiental => ("ambiental", "Ambiental"),
    }
}

label_enum! {
    /// Treatment status of a risk
    #[derive(Default)]
    pub enum RiskStatus {
        #[default]
        Identificado => ("identificado", "Identificado"),
        EnTratamiento => ("en-tratamiento", "En Tratamiento"),
        Mitigado => ("mitigado", "Mitigado"),
        Cerrado => ("cerrado", "Cerrado"),
    }
}

impl RiskStatus {
    pub fn tone(&self) -> Tone {
        match self {
            RiskStatus::Identificado => Tone::Neutral,
            RiskStatus::EnTratamiento => Tone::Warning,
            RiskStatus::Mitigado | RiskStatus::Cerrado => Tone::Success,
        }
    }
}

/// Classify a risk from its probability and impact
///
/// score = rank(probability) × rank(impact); ≥20 Muy Alto, ≥15 Alto,
/// ≥9 Medio, ≥4 Bajo, otherwise Muy Bajo.
pub fn risk_level_from_factors(probability: RiskLevel, impact: RiskLevel) -> RiskLevel {
    match probability.rank() * impact.rank() {
        20.. => RiskLevel::MuyAlto,
        15..=19 => RiskLevel::Alto,
        9..=14 => RiskLevel::Medio,
        4..=8 => RiskLevel::Bajo,
        _ => RiskLevel::MuyBajo,
    }
}

/// The full 5×5 classification table, rows by probability, columns by impact
pub fn risk_matrix() -> [[RiskLevel; 5]; 5] {
    let levels = RiskLevel::all();
    let mut matrix = [[RiskLevel::MuyBajo; 5]; 5];
    for (row, probability) in levels.iter().enumerate() {
        for (col, impact) in levels.iter().enumerate() {
            matrix[row][col] = risk_level_from_factors(*probability, *impact);
        }
    }
    matrix
}

impl RiskLevel {
    /// See [`risk_level_from_factors`]
    pub fn from_factors(probability: RiskLevel, impact: RiskLevel) -> RiskLevel {
        risk_level_from_factors(probability, impact)
    }
}

/// A risk entity
///
/// `risk_level` is stored, not derived on read. Callers recompute it with
/// [`Risk::recompute_level`] before dispatching an add or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub id: RecordId,

    pub title: String,

    pub description: String,

    pub sector: Sector,

    pub category: RiskCategory,

    pub probability: RiskLevel,

    pub impact: RiskLevel,

    /// Level derived from probability and impact at save time
    pub risk_level: RiskLevel,

    /// Mitigation plan (free text)
    pub mitigation: String,

    pub responsible: String,

    pub status: RiskStatus,

    pub identified_date: NaiveDate,

    pub review_date: NaiveDate,
}

impl Record for Risk {
    const KIND: &'static str = "risk";

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

impl Risk {
    /// Create a newly identified risk with its level computed
    pub fn new(
        id: RecordId,
        title: String,
        responsible: String,
        probability: RiskLevel,
        impact: RiskLevel,
        today: NaiveDate,
    ) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            sector: Sector::default(),
            category: RiskCategory::default(),
            probability,
            impact,
            risk_level: risk_level_from_factors(probability, impact),
            mitigation: String::new(),
            responsible,
            status: RiskStatus::default(),
            identified_date: today,
            review_date: next_review_date(today),
        }
    }

    /// Recompute the stored level from the current probability and impact
    pub fn recompute_level(mut self) -> Self {
        self.risk_level = risk_level_from_factors(self.probability, self.impact);
        self
    }

    /// Apply an edit made on `today`: recompute the level and push the review date
    pub fn revised(self, today: NaiveDate) -> Self {
        let mut next = self.recompute_level();
        next.review_date = next_review_date(today);
        next
    }

    /// Check if the stored level disagrees with probability × impact
    pub fn is_level_stale(&self) -> bool {
        self.risk_level != risk_level_from_factors(self.probability, self.impact)
    }
}

fn next_review_date(from: NaiveDate) -> NaiveDate {
    from.checked_add_days(Days::new(REVIEW_INTERVAL_DAYS))
        .unwrap_or(from)
}
