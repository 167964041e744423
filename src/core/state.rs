//! Aggregate state: the seven record collections plus UI preferences

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::entity::Record;
use crate::core::identity::RecordId;
use crate::entities::{Document, Kpi, NonConformity, Opportunity, PdcaItem, Process, Risk};

/// The aggregate root and the only unit of persistence
///
/// Collections are shared handles: cloning a state is cheap, and a
/// collection no transition touched is the very same allocation in both
/// states (`Arc::ptr_eq`), which makes change detection trivial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub documents: Arc<Vec<Document>>,
    pub processes: Arc<Vec<Process>>,
    pub risks: Arc<Vec<Risk>>,
    pub opportunities: Arc<Vec<Opportunity>>,
    pub pdca_items: Arc<Vec<PdcaItem>>,
    pub non_conformities: Arc<Vec<NonConformity>>,
    pub kpis: Arc<Vec<Kpi>>,
    pub dark_mode: bool,
}

impl AppState {
    pub fn document(&self, id: &RecordId) -> Option<&Document> {
        find(&self.documents, id)
    }

    pub fn process(&self, id: &RecordId) -> Option<&Process> {
        find(&self.processes, id)
    }

    pub fn risk(&self, id: &RecordId) -> Option<&Risk> {
        find(&self.risks, id)
    }

    pub fn opportunity(&self, id: &RecordId) -> Option<&Opportunity> {
        find(&self.opportunities, id)
    }

    pub fn pdca_item(&self, id: &RecordId) -> Option<&PdcaItem> {
        find(&self.pdca_items, id)
    }

    pub fn non_conformity(&self, id: &RecordId) -> Option<&NonConformity> {
        find(&self.non_conformities, id)
    }

    pub fn kpi(&self, id: &RecordId) -> Option<&Kpi> {
        find(&self.kpis, id)
    }
}

/// First record with the given id
pub fn find<'a, T: Record>(items: &'a [T], id: &RecordId) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

/// A state with any subset of its top-level fields
///
/// This is both the persisted snapshot format (a full snapshot has every
/// field) and the payload of `LOAD_DATA`. Merging replaces whole
/// collections, never individual records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Arc<Vec<Document>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processes: Option<Arc<Vec<Process>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risks: Option<Arc<Vec<Risk>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<Arc<Vec<Opportunity>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdca_items: Option<Arc<Vec<PdcaItem>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_conformities: Option<Arc<Vec<NonConformity>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpis: Option<Arc<Vec<Kpi>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
}

impl PartialState {
    /// Shallow merge: every present field replaces the one in `state`
    pub fn merge_into(self, state: &mut AppState) {
        if let Some(documents) = self.documents {
            state.documents = documents;
        }
        if let Some(processes) = self.processes {
            state.processes = processes;
        }
        if let Some(risks) = self.risks {
            state.risks = risks;
        }
        if let Some(opportunities) = self.opportunities {
            state.opportunities = opportunities;
        }
        if let Some(pdca_items) = self.pdca_items {
            state.pdca_items = pdca_items;
        }
        if let Some(non_conformities) = self.non_conformities {
            state.non_conformities = non_conformities;
        }
        if let Some(kpis) = self.kpis {
            state.kpis = kpis;
        }
        if let Some(dark_mode) = self.dark_mode {
            state.dark_mode = dark_mode;
        }
    }

    /// Names of the fields present, in declaration order
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.documents.is_some() {
            fields.push("documents");
        }
        if self.processes.is_some() {
            fields.push("processes");
        }
        if self.risks.is_some() {
            fields.push("risks");
        }
        if self.opportunities.is_some() {
            fields.push("opportunities");
        }
        if self.pdca_items.is_some() {
            fields.push("pdcaItems");
        }
        if self.non_conformities.is_some() {
            fields.push("nonConformities");
        }
        if self.kpis.is_some() {
            fields.push("kpis");
        }
        if self.dark_mode.is_some() {
            fields.push("darkMode");
        }
        fields
    }
}

impl From<AppState> for PartialState {
    fn from(state: AppState) -> Self {
        Self {
            documents: Some(state.documents),
            processes: Some(state.processes),
            risks: Some(state.risks),
            opportunities: Some(state.opportunities),
            pdca_items: Some(state.pdca_items),
            non_conformities: Some(state.non_conformities),
            kpis: Some(state.kpis),
            dark_mode: Some(state.dark_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::seed;

    #[test]
    fn test_state_serializes_camel_case_keys() {
        let json = serde_json::to_value(AppState::default()).unwrap();
        for key in [
            "documents",
            "processes",
            "risks",
            "opportunities",
            "pdcaItems",
            "nonConformities",
            "kpis",
            "darkMode",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn test_partial_state_parses_subset() {
        let partial: PartialState =
            serde_json::from_str(r#"{"darkMode": true, "risks": [], "unknown": 1}"#).unwrap();
        assert_eq!(partial.dark_mode, Some(true));
        assert_eq!(partial.risks.as_deref().map(Vec::len), Some(0));
        assert!(partial.documents.is_none());
        assert_eq!(partial.present_fields(), vec!["risks", "darkMode"]);
    }

    #[test]
    fn test_merge_is_shallow() {
        let seed = seed::initial_data();
        let mut state = seed.clone();
        let partial = PartialState {
            risks: Some(Arc::new(Vec::new())),
            ..Default::default()
        };
        partial.merge_into(&mut state);

        assert!(state.risks.is_empty());
        assert!(Arc::ptr_eq(&state.documents, &seed.documents));
        assert_eq!(state.dark_mode, seed.dark_mode);
    }

    #[test]
    fn test_full_snapshot_roundtrip() {
        let seed = seed::initial_data();
        let json = serde_json::to_string(&seed).unwrap();
        let partial: PartialState = serde_json::from_str(&json).unwrap();
        assert_eq!(partial.present_fields().len(), 8);

        let mut restored = AppState::default();
        partial.merge_into(&mut restored);
        assert_eq!(restored, seed);
    }

    #[test]
    fn test_lookup_by_id() {
        let seed = seed::initial_data();
        assert_eq!(
            seed.risk(&RecordId::new("2")).map(|r| r.title.as_str()),
            Some("Rotación de Personal Clave")
        );
        assert!(seed.document(&RecordId::new("999")).is_none());
    }
}
