use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text produced by one OCR call. Possibly empty, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawText(String);

impl RawText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for RawText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl std::fmt::Display for RawText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structured fields pulled out of a prescription.
///
/// Every field is an ordered sequence and may be empty. `patient_name` and
/// `doctor_name` hold at most one candidate with the current rules.
/// `drug_name` only ever contains canonical Drug Vocabulary entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub patient_name: Vec<String>,
    pub doctor_name: Vec<String>,
    pub drug_name: Vec<String>,
    pub quantity: Vec<String>,
}

impl EntityRecord {
    pub fn is_empty(&self) -> bool {
        self.patient_name.is_empty()
            && self.doctor_name.is_empty()
            && self.drug_name.is_empty()
            && self.quantity.is_empty()
    }
}

/// A record as persisted by a [`crate::db::RecordSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    #[serde(flatten)]
    pub record: EntityRecord,
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
}

/// How the OCR step of a scan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OcrStatus {
    /// Text was recognized.
    Recognized,
    /// The engine ran but found no characters.
    Empty,
    /// The engine could not run; extraction proceeded on empty text.
    Failed { reason: String },
    /// Text was supplied directly, OCR was not involved.
    Skipped,
}

impl OcrStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// How the optional persistence step of a scan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StorageStatus {
    #[default]
    Skipped,
    Stored { id: String },
    Failed { reason: String },
}

/// Full outcome of one pipeline call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionScan {
    pub record: EntityRecord,
    pub raw_text: String,
    pub ocr: OcrStatus,
    /// Person names proposed by the name finder. Kept apart from `record`,
    /// which only carries rule-based fields.
    pub person_names: Vec<String>,
    pub catalog_matches: Vec<super::CatalogMatch>,
    pub storage: StorageStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_whitespace_is_empty() {
        assert!(RawText::new("  \n\t ").is_empty());
        assert!(RawText::empty().is_empty());
        assert!(!RawText::new("Tot: 5").is_empty());
    }

    #[test]
    fn test_entity_record_serializes_all_fields_as_arrays() {
        let record = EntityRecord {
            patient_name: vec!["Jane Doe".to_string()],
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["patient_name"], serde_json::json!(["Jane Doe"]));
        assert_eq!(json["doctor_name"], serde_json::json!([]));
        assert_eq!(json["drug_name"], serde_json::json!([]));
        assert_eq!(json["quantity"], serde_json::json!([]));
    }

    #[test]
    fn test_ocr_status_tagged_serialization() {
        let json = serde_json::to_value(OcrStatus::Failed {
            reason: "engine missing".to_string(),
        })
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "engine missing");

        let json = serde_json::to_value(OcrStatus::Empty).unwrap();
        assert_eq!(json["status"], "empty");
    }

    #[test]
    fn test_stored_record_flattens_entity_fields() {
        let stored = StoredRecord {
            id: "abc".to_string(),
            record: EntityRecord {
                quantity: vec!["10".to_string()],
                ..Default::default()
            },
            raw_text: "Tot: 10".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["quantity"], serde_json::json!(["10"]));
        assert!(json.get("record").is_none());
    }
}
