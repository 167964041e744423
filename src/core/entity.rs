//! Record trait and the closed label sets shared across record types

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::core::identity::RecordId;

/// Common trait for all quality records held in the store
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Human-readable kind name (e.g., "document", "risk")
    const KIND: &'static str;

    /// Get the record's unique ID
    fn id(&self) -> &RecordId;

    /// Get the record's title (or name)
    fn title(&self) -> &str;

    /// Get the record's free-text description
    fn description(&self) -> &str;

    /// Get the organizational unit the record belongs to
    fn sector(&self) -> Sector;

    /// Get the persisted label of the record's status
    fn status_label(&self) -> &'static str;
}

/// A closed set of values with a stable persisted label and a short CLI key
pub trait Labeled: Copy + Eq + 'static {
    /// Every value in declaration order
    fn all() -> &'static [Self];

    /// Persisted/display label (e.g., "En Revisión")
    fn label(&self) -> &'static str;

    /// ASCII key accepted on the command line (e.g., "en-revision")
    fn key(&self) -> &'static str;
}

/// Error returned when a string matches neither a label nor a key
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {kind} '{value}' (valid: {expected})")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Parse a label or key against all values of `T`, ignoring case
pub fn parse_label<T: Labeled>(kind: &'static str, s: &str) -> Result<T, ParseLabelError> {
    let wanted = s.trim().to_lowercase();
    T::all()
        .iter()
        .copied()
        .find(|v| v.label().to_lowercase() == wanted || v.key() == wanted)
        .ok_or_else(|| ParseLabelError {
            kind,
            value: s.to_string(),
            expected: T::all()
                .iter()
                .map(|v| v.key())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Declares a label enum: serde uses the label, `Display` prints it,
/// `FromStr` accepts label or key.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($key:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            /// Every value in declaration order
            pub fn all() -> &'static [$name] {
                &[ $( $name::$variant, )+ ]
            }

            /// Persisted/display label
            pub fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Short ASCII key for command-line use
            pub fn key(&self) -> &'static str {
                match self {
                    $( $name::$variant => $key, )+
                }
            }
        }

        impl $crate::core::entity::Labeled for $name {
            fn all() -> &'static [Self] {
                $name::all()
            }

            fn label(&self) -> &'static str {
                $name::label(self)
            }

            fn key(&self) -> &'static str {
                $name::key(self)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::core::entity::ParseLabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $crate::core::entity::parse_label(stringify!($name), s)
            }
        }
    };
}

pub(crate) use label_enum;

/// Semantic colour class used by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Success,
    Info,
    Warning,
    Danger,
    Critical,
    Neutral,
}

label_enum! {
    /// Organizational unit a record belongs to
    #[derive(Default)]
    pub enum Sector {
        #[default]
        Desarrollo => ("desarrollo", "Desarrollo"),
        Qa => ("qa", "QA"),
        Administracion => ("administracion", "Administración"),
        Rrhh => ("rrhh", "RRHH"),
        Direccion => ("direccion", "Dirección"),
        Comercial => ("comercial", "Comercial"),
    }
}

label_enum! {
    /// Five-point ordinal scale used for probability, impact and risk level
    #[derive(Default)]
    pub enum RiskLevel {
        MuyBajo => ("muy-bajo", "Muy Bajo"),
        Bajo => ("bajo", "Bajo"),
        #[default]
        Medio => ("medio", "Medio"),
        Alto => ("alto", "Alto"),
        MuyAlto => ("muy-alto", "Muy Alto"),
    }
}

impl RiskLevel {
    /// Ordinal rank 1 (Muy Bajo) through 5 (Muy Alto)
    pub fn rank(&self) -> u8 {
        match self {
            RiskLevel::MuyBajo => 1,
            RiskLevel::Bajo => 2,
            RiskLevel::Medio => 3,
            RiskLevel::Alto => 4,
            RiskLevel::MuyAlto => 5,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            RiskLevel::MuyBajo => Tone::Success,
            RiskLevel::Bajo => Tone::Info,
            RiskLevel::Medio => Tone::Warning,
            RiskLevel::Alto => Tone::Danger,
            RiskLevel::MuyAlto => Tone::Critical,
        }
    }

    /// Alto or Muy Alto
    pub fn is_high(&self) -> bool {
        *self >= RiskLevel::Alto
    }
}

label_enum! {
    /// Ordinal priority for opportunities and PDCA items
    #[derive(Default)]
    pub enum Priority {
        Baja => ("baja", "Baja"),
        #[default]
        Media => ("media", "Media"),
        Alta => ("alta", "Alta"),
        Critica => ("critica", "Crítica"),
    }
}

impl Priority {
    pub fn tone(&self) -> Tone {
        match self {
            Priority::Baja => Tone::Success,
            Priority::Media => Tone::Warning,
            Priority::Alta => Tone::Danger,
            Priority::Critica => Tone::Critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_persisted_form() {
        let json = serde_json::to_string(&Sector::Administracion).unwrap();
        assert_eq!(json, "\"Administración\"");
        let parsed: RiskLevel = serde_json::from_str("\"Muy Alto\"").unwrap();
        assert_eq!(parsed, RiskLevel::MuyAlto);
    }

    #[test]
    fn test_from_str_accepts_label_or_key() {
        assert_eq!("muy-bajo".parse::<RiskLevel>().unwrap(), RiskLevel::MuyBajo);
        assert_eq!("Muy Bajo".parse::<RiskLevel>().unwrap(), RiskLevel::MuyBajo);
        assert_eq!("crítica".parse::<Priority>().unwrap(), Priority::Critica);
        assert_eq!("QA".parse::<Sector>().unwrap(), Sector::Qa);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "extreme".parse::<RiskLevel>().unwrap_err();
        assert_eq!(err.kind, "RiskLevel");
        assert!(err.to_string().contains("muy-alto"));
    }

    #[test]
    fn test_risk_level_ordinal() {
        let ranks: Vec<u8> = RiskLevel::all().iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert!(RiskLevel::Alto.is_high());
        assert!(!RiskLevel::Medio.is_high());
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(Sector::Direccion.to_string(), "Dirección");
        assert_eq!(Priority::Critica.to_string(), "Crítica");
    }
}
