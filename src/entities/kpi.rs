//! KPI entity type - curated quality indicators
//!
//! KPIs are a fixed set: they are seeded once and only ever updated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::entity::{label_enum, Record, Sector, Tone};
use crate::core::identity::RecordId;

label_enum! {
    /// Direction a KPI has been moving
    #[derive(Default)]
    pub enum Trend {
        Up => ("up", "up"),
        Down => ("down", "down"),
        #[default]
        Stable => ("stable", "stable"),
    }
}

impl Trend {
    pub fn tone(&self) -> Tone {
        match self {
            Trend::Up => Tone::Success,
            Trend::Down => Tone::Danger,
            Trend::Stable => Tone::Warning,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Stable => "→",
        }
    }
}

/// A tracked metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub id: RecordId,

    pub name: String,

    pub description: String,

    pub sector: Sector,

    pub current_value: f64,

    pub target_value: f64,

    /// Unit label (e.g., "%", "horas")
    pub unit: String,

    /// Measurement frequency label (e.g., "Mensual")
    pub frequency: String,

    pub trend: Trend,

    pub last_update: NaiveDate,
}

impl Record for Kpi {
    const KIND: &'static str = "KPI";

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
        self.trend.label()
    }
}

impl Kpi {
    /// Current value as a percentage of target, capped at 100
    ///
    /// A zero target counts as achieved.
    pub fn achievement(&self) -> f64 {
        if self.target_value == 0.0 {
            return 100.0;
        }
        (self.current_value / self.target_value * 100.0).min(100.0)
    }

    /// Copy with a new measurement; trend follows the direction of change
    pub fn with_measurement(&self, value: f64, today: NaiveDate) -> Self {
        let mut next = self.clone();
        next.trend = if value > self.current_value {
            Trend::Up
        } else if value < self.current_value {
            Trend::Down
        } else {
            Trend::Stable
        };
        next.current_value = value;
        next.last_update = today;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn kpi(current: f64, target: f64) -> Kpi {
        Kpi {
            id: RecordId::new("3"),
            name: "Satisfacción del Cliente".to_string(),
            description: String::new(),
            sector: Sector::Comercial,
            current_value: current,
            target_value: target,
            unit: "%".to_string(),
            frequency: "Mensual".to_string(),
            trend: Trend::Up,
            last_update: date("2024-03-01"),
        }
    }

    #[test]
    fn test_achievement_caps_at_100() {
        assert_eq!(kpi(92.0, 95.0).achievement().round(), 97.0);
        assert_eq!(kpi(120.0, 95.0).achievement(), 100.0);
        assert_eq!(kpi(1.0, 0.0).achievement(), 100.0);
    }

    #[test]
    fn test_seed_kpis_report_only_achievement() {
        let state = crate::core::seed::initial_data();
        let defects = state
            .kpis
            .iter()
            .find(|k| k.name == "Defectos por Release")
            .unwrap();
        assert_eq!(defects.achievement(), 100.0);
        assert_eq!(defects.status_label(), defects.trend.label());

        let json = serde_json::to_value(defects).unwrap();
        assert!(json.get("onTarget").is_none());
        assert_eq!(kpi(92.0, 95.0).status_label(), "up");
    }

    #[test]
    fn test_measurement_sets_trend() {
        let k = kpi(92.0, 95.0);
        let up = k.with_measurement(93.5, date("2024-04-01"));
        assert_eq!(up.trend, Trend::Up);
        assert_eq!(up.last_update, date("2024-04-01"));
        assert_eq!(up.with_measurement(90.0, date("2024-05-01")).trend, Trend::Down);
        assert_eq!(up.with_measurement(93.5, date("2024-05-01")).trend, Trend::Stable);
    }

    #[test]
    fn test_trend_serializes_lowercase() {
        let json = serde_json::to_value(kpi(1.0, 2.0)).unwrap();
        assert_eq!(json["trend"], "up");
        assert_eq!(json["currentValue"], 1.0);
    }
}
