//! Non-conformity entity type - recorded deviations and their corrective actions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::entity::{label_enum, Record, Sector, Tone};
use crate::core::identity::RecordId;

label_enum! {
    /// Severity of a non-conformity, ordinal
    #[derive(Default)]
    pub enum Severity {
        Menor => ("menor", "Menor"),
        #[default]
        Moderada => ("moderada", "Moderada"),
        Mayor => ("mayor", "Mayor"),
        Critica => ("critica", "Crítica"),
    }
}

impl Severity {
    pub fn tone(&self) -> Tone {
        match self {
            Severity::Menor => Tone::Info,
            Severity::Moderada => Tone::Warning,
            Severity::Mayor => Tone::Danger,
            Severity::Critica => Tone::Critical,
        }
    }

    /// Mayor or Crítica
    pub fn is_critical(&self) -> bool {
        *self >= Severity::Mayor
    }
}

label_enum! {
    /// Channel through which a non-conformity was detected
    #[derive(Default)]
    pub enum NonConformitySource {
        AuditoriaInterna => ("auditoria-interna", "Auditoría Interna"),
        AuditoriaExterna => ("auditoria-externa", "Auditoría Externa"),
        RevisionDireccion => ("revision-direccion", "Revisión por la Dirección"),
        QuejaCliente => ("queja-cliente", "Queja de Cliente"),
        #[default]
        Autodeteccion => ("autodeteccion", "Autodetección"),
        MejoraContinua => ("mejora-continua", "Mejora Continua"),
    }
}

label_enum! {
    /// Non-conformity lifecycle status
    #[derive(Default)]
    pub enum NonConformityStatus {
        #[default]
        Abierta => ("abierta", "Abierta"),
        EnAnalisis => ("en-analisis", "En Análisis"),
        EnTratamiento => ("en-tratamiento", "En Tratamiento"),
        EnVerificacion => ("en-verificacion", "En Verificación"),
        Cerrada => ("cerrada", "Cerrada"),
    }
}

impl NonConformityStatus {
    pub fn tone(&self) -> Tone {
        match self {
            NonConformityStatus::Abierta => Tone::Danger,
            NonConformityStatus::EnAnalisis | NonConformityStatus::EnTratamiento => Tone::Warning,
            NonConformityStatus::EnVerificacion => Tone::Info,
            NonConformityStatus::Cerrada => Tone::Success,
        }
    }
}

label_enum! {
    /// Corrective action status
    #[derive(Default)]
    pub enum ActionStatus {
        #[default]
        Pendiente => ("pendiente", "Pendiente"),
        EnProgreso => ("en-progreso", "En Progreso"),
        Completada => ("completada", "Completada"),
        Vencida => ("vencida", "Vencida"),
    }
}

impl ActionStatus {
    pub fn tone(&self) -> Tone {
        match self {
            ActionStatus::Pendiente => Tone::Neutral,
            ActionStatus::EnProgreso => Tone::Warning,
            ActionStatus::Completada => Tone::Success,
            ActionStatus::Vencida => Tone::Danger,
        }
    }
}

/// A remediation task owned by a non-conformity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectiveAction {
    /// Identifier, unique within the parent only
    pub id: RecordId,

    pub description: String,

    pub responsible: String,

    pub target_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<NaiveDate>,

    pub status: ActionStatus,

    /// How completion was verified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<String>,

    /// Observed effectiveness of the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effectiveness: Option<String>,
}

impl CorrectiveAction {
    /// Create a pending action
    pub fn new(
        id: RecordId,
        description: String,
        responsible: String,
        target_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            description,
            responsible,
            target_date,
            completion_date: None,
            status: ActionStatus::default(),
            verification: None,
            effectiveness: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ActionStatus::Completada
    }
}

/// An action is overdue when it is not completed and its target date is
/// before `today` (calendar dates, no time of day).
pub fn is_action_overdue(action: &CorrectiveAction, today: NaiveDate) -> bool {
    !action.is_completed() && action.target_date < today
}

/// A recorded deviation from a quality requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonConformity {
    pub id: RecordId,

    pub title: String,

    pub description: String,

    pub sector: Sector,

    pub severity: Severity,

    pub source: NonConformitySource,

    pub identified_by: String,

    pub identified_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<String>,

    /// Owned corrective actions, in creation order
    #[serde(default)]
    pub corrective_actions: Vec<CorrectiveAction>,

    pub status: NonConformityStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<NaiveDate>,
}

impl Record for NonConformity {
    const KIND: &'static str = "non-conformity";

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

impl NonConformity {
    /// Create an open non-conformity identified today
    pub fn new(id: RecordId, title: String, identified_by: String, today: NaiveDate) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            sector: Sector::default(),
            severity: Severity::default(),
            source: NonConformitySource::default(),
            identified_by,
            identified_date: today,
            root_cause: None,
            corrective_actions: Vec::new(),
            status: NonConformityStatus::default(),
            close_date: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == NonConformityStatus::Cerrada
    }

    /// True when there is at least one action and every action is completed
    pub fn all_actions_completed(&self) -> bool {
        !self.corrective_actions.is_empty()
            && self.corrective_actions.iter().all(CorrectiveAction::is_completed)
    }

    /// Still open and carrying at least one overdue action
    pub fn has_overdue_actions(&self, today: NaiveDate) -> bool {
        !self.is_closed()
            && self
                .corrective_actions
                .iter()
                .any(|a| is_action_overdue(a, today))
    }

    pub fn action(&self, action_id: &RecordId) -> Option<&CorrectiveAction> {
        self.corrective_actions.iter().find(|a| &a.id == action_id)
    }

    /// Copy with a new action appended; the record moves to En Tratamiento
    pub fn with_action_added(&self, action: CorrectiveAction) -> Self {
        let mut next = self.clone();
        next.corrective_actions.push(action);
        next.status = NonConformityStatus::EnTratamiento;
        next
    }

    /// Copy with the action's fields replaced (matched by id, status untouched)
    pub fn with_action_edited(&self, action: CorrectiveAction) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.corrective_actions.iter_mut().find(|a| a.id == action.id) {
            let status = slot.status;
            let completion_date = slot.completion_date;
            *slot = CorrectiveAction {
                status,
                completion_date,
                ..action
            };
        }
        next
    }

    /// Copy with one action's status changed as of `today`
    ///
    /// Completing an action stamps its completion date. When every action is
    /// then completed the record moves to En Verificación and `close_date`
    /// is stamped; otherwise the record status is left alone. Closing for
    /// good is a separate manual step, see [`NonConformity::closed`].
    pub fn with_action_status(
        &self,
        action_id: &RecordId,
        status: ActionStatus,
        today: NaiveDate,
    ) -> Self {
        let mut next = self.clone();
        for action in next.corrective_actions.iter_mut().filter(|a| &a.id == action_id) {
            action.status = status;
            if status == ActionStatus::Completada {
                action.completion_date = Some(today);
            }
        }

        if next.all_actions_completed() {
            next.status = NonConformityStatus::EnVerificacion;
            next.close_date = Some(today);
        }
        next
    }

    /// Copy with the action removed (unchanged if absent)
    pub fn with_action_removed(&self, action_id: &RecordId) -> Self {
        let mut next = self.clone();
        next.corrective_actions.retain(|a| &a.id != action_id);
        next
    }

    /// Manual close, allowed whatever state the actions are in
    pub fn closed(&self, today: NaiveDate) -> Self {
        let mut next = self.clone();
        next.status = NonConformityStatus::Cerrada;
        next.close_date = Some(today);
        next
    }
}
