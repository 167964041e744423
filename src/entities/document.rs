//! Document entity type - controlled documents of the quality system

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::entity::{label_enum, Record, Sector, Tone};
use crate::core::identity::RecordId;

label_enum! {
    /// Kind of controlled document
    #[derive(Default)]
    pub enum DocumentType {
        #[default]
        Procedimiento => ("procedimiento", "Procedimiento"),
        Politica => ("politica", "Política"),
        Manual => ("manual", "Manual"),
        Instructivo => ("instructivo", "Instructivo"),
        Formato => ("formato", "Formato"),
        Registro => ("registro", "Registro"),
    }
}

label_enum! {
    /// Document lifecycle status
    #[derive(Default)]
    pub enum DocumentStatus {
        Activo => ("activo", "Activo"),
        EnRevision => ("en-revision", "En Revisión"),
        Obsoleto => ("obsoleto", "Obsoleto"),
        #[default]
        Borrador => ("borrador", "Borrador"),
    }
}

impl DocumentStatus {
    pub fn tone(&self) -> Tone {
        match self {
            DocumentStatus::Activo => Tone::Success,
            DocumentStatus::EnRevision => Tone::Warning,
            DocumentStatus::Obsoleto => Tone::Danger,
            DocumentStatus::Borrador => Tone::Neutral,
        }
    }
}

/// A controlled document
///
/// Only file metadata is kept; uploads are simulated and no content is stored.
/// Editing overwrites fields in place, `last_modified` is the only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier
    pub id: RecordId,

    pub title: String,

    pub description: String,

    /// Name of the attached file
    pub file_name: String,

    /// Human-readable size of the attached file (e.g., "2.4 MB")
    pub file_size: String,

    pub upload_date: NaiveDate,

    pub sector: Sector,

    #[serde(rename = "type")]
    pub doc_type: DocumentType,

    pub status: DocumentStatus,

    /// Free-form version label (e.g., "3.1")
    pub version: String,

    pub author: String,

    pub last_modified: NaiveDate,
}

impl Record for Document {
    const KIND: &'static str = "document";

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

impl Document {
    /// Create a new draft document uploaded today
    pub fn new(id: RecordId, title: String, author: String, today: NaiveDate) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            file_name: String::new(),
            file_size: format_file_size(0),
            upload_date: today,
            sector: Sector::default(),
            doc_type: DocumentType::default(),
            status: DocumentStatus::default(),
            version: "1.0".to_string(),
            author,
            last_modified: today,
        }
    }

    /// Apply an edit made on `today`, advancing `last_modified`
    pub fn touched(mut self, today: NaiveDate) -> Self {
        self.last_modified = today;
        self
    }

    /// Required fields that are blank, as user-facing messages
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title is required");
        }
        if self.author.trim().is_empty() {
            missing.push("author is required");
        }
        if self.file_name.trim().is_empty() {
            missing.push("file name is required");
        }
        if self.version.trim().is_empty() {
            missing.push("version is required");
        }
        missing
    }
}

/// Format a byte count as a readable size ("0 Bytes", "850 KB", "2.4 MB")
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // Two decimals at most, trailing zeros dropped
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_document_creation_defaults_to_draft() {
        let doc = Document::new(
            RecordId::new("10"),
            "Manual".to_string(),
            "María".to_string(),
            date("2024-05-01"),
        );
        assert_eq!(doc.status, DocumentStatus::Borrador);
        assert_eq!(doc.upload_date, doc.last_modified);
    }

    #[test]
    fn test_document_serializes_camel_case() {
        let mut doc = Document::new(
            RecordId::new("1"),
            "Manual de Calidad".to_string(),
            "María".to_string(),
            date("2024-01-15"),
        );
        doc.doc_type = DocumentType::Manual;
        doc.status = DocumentStatus::EnRevision;

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "Manual");
        assert_eq!(json["status"], "En Revisión");
        assert_eq!(json["lastModified"], "2024-01-15");
        assert!(json.get("fileName").is_some());
    }

    #[test]
    fn test_touched_advances_last_modified_only() {
        let doc = Document::new(
            RecordId::new("1"),
            "Doc".to_string(),
            "Ana".to_string(),
            date("2024-01-15"),
        );
        let edited = doc.clone().touched(date("2024-02-01"));
        assert_eq!(edited.upload_date, doc.upload_date);
        assert_eq!(edited.last_modified, date("2024-02-01"));
    }

    #[test]
    fn test_missing_fields() {
        let mut doc = Document::new(
            RecordId::new("1"),
            " ".to_string(),
            "Ana".to_string(),
            date("2024-01-15"),
        );
        doc.file_name = "a.pdf".to_string();
        assert_eq!(doc.missing_fields(), vec!["title is required"]);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2_516_582), "2.4 MB");
    }
}
