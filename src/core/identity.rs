//! Record identity: opaque string ids and the strategies that generate them

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Opaque record identifier
///
/// Ids are compared as plain strings. Seed data uses small integers
/// (`"1"`, `"2"`), records created later use whatever [`IdStrategy`] is
/// configured. Uniqueness within a collection is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id with the given strategy
    pub fn generate(strategy: IdStrategy) -> Self {
        match strategy {
            IdStrategy::Ulid => Self(Ulid::new().to_string()),
            IdStrategy::Timestamp => Self(Utc::now().timestamp_millis().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// How new record ids are produced
///
/// `Timestamp` is the legacy millisecond-string scheme. Two creates within
/// the same millisecond collide, and nothing downstream detects it.
/// `Ulid` is collision resistant and is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Ulid,
    Timestamp,
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ulid" => Ok(IdStrategy::Ulid),
            "timestamp" => Ok(IdStrategy::Timestamp),
            _ => Err(format!("Unknown id strategy: {}. Use ulid or timestamp", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ulid_ids_are_unique() {
        let a = RecordId::generate(IdStrategy::Ulid);
        let b = RecordId::generate(IdStrategy::Ulid);
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 26);
    }

    #[test]
    fn test_timestamp_ids_are_numeric() {
        let id = RecordId::generate(IdStrategy::Timestamp);
        assert!(id.as_str().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_record_id_serializes_as_plain_string() {
        let id = RecordId::new("42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
        let parsed: RecordId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(parsed, id);
        assert!(parsed == "42");
    }

    #[test]
    fn test_id_strategy_parse() {
        assert_eq!("ULID".parse::<IdStrategy>().unwrap(), IdStrategy::Ulid);
        assert_eq!("timestamp".parse::<IdStrategy>().unwrap(), IdStrategy::Timestamp);
        assert!("uuid".parse::<IdStrategy>().is_err());
    }
}
