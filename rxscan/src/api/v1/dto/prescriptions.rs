//! Prescription request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    CatalogEntry, CatalogMatch, EntityRecord, OcrStatus, PrescriptionScan, StorageStatus,
    StoredRecord,
};

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /api/v1/prescriptions:extract`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTextRequest {
    /// Already-recognized prescription text. May be empty.
    pub text: String,
    /// Persist the extracted record. Defaults to `false`.
    #[serde(default)]
    pub store: Option<bool>,
}

/// Query parameters for `GET /api/v1/prescriptions`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListPrescriptionsQuery {
    /// Maximum records to return (default 20, clamped to 1..=100).
    pub limit: Option<u32>,
}

impl ListPrescriptionsQuery {
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// The four extracted entity fields. Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecordResponse {
    pub patient_name: Vec<String>,
    pub doctor_name: Vec<String>,
    pub drug_name: Vec<String>,
    pub quantity: Vec<String>,
}

impl From<EntityRecord> for EntityRecordResponse {
    fn from(record: EntityRecord) -> Self {
        Self {
            patient_name: record.patient_name,
            doctor_name: record.doctor_name,
            drug_name: record.drug_name,
            quantity: record.quantity,
        }
    }
}

/// Wire format: `"recognized"`, `"empty"`, `"failed"`, or `"skipped"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum OcrOutcome {
    Recognized,
    Empty,
    Failed,
    /// Text was supplied by the caller.
    Skipped,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OcrResultResponse {
    pub status: OcrOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<OcrStatus> for OcrResultResponse {
    fn from(status: OcrStatus) -> Self {
        let (status, reason) = match status {
            OcrStatus::Recognized => (OcrOutcome::Recognized, None),
            OcrStatus::Empty => (OcrOutcome::Empty, None),
            OcrStatus::Failed { reason } => (OcrOutcome::Failed, Some(reason)),
            OcrStatus::Skipped => (OcrOutcome::Skipped, None),
        };
        Self { status, reason }
    }
}

/// Wire format: `"skipped"`, `"stored"`, or `"failed"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum StorageOutcome {
    Skipped,
    Stored,
    Failed,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageResultResponse {
    pub status: StorageOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    /// Failure details are not exposed; see server logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<StorageStatus> for StorageResultResponse {
    fn from(status: StorageStatus) -> Self {
        match status {
            StorageStatus::Skipped => Self {
                status: StorageOutcome::Skipped,
                record_id: None,
                message: None,
            },
            StorageStatus::Stored { id } => Self {
                status: StorageOutcome::Stored,
                record_id: Some(id),
                message: None,
            },
            StorageStatus::Failed { .. } => Self {
                status: StorageOutcome::Failed,
                record_id: None,
                message: Some("Record could not be stored".to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryResponse {
    pub medicine_id: i64,
    pub name: String,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    pub price: f64,
}

impl From<CatalogEntry> for CatalogEntryResponse {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            medicine_id: entry.medicine_id,
            name: entry.name,
            stock: entry.stock,
            expiry: entry.expiry,
            price: entry.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMatchResponse {
    pub drug_name: String,
    pub in_stock: bool,
    pub entries: Vec<CatalogEntryResponse>,
}

impl From<CatalogMatch> for CatalogMatchResponse {
    fn from(m: CatalogMatch) -> Self {
        Self {
            in_stock: m.in_stock(),
            drug_name: m.drug_name,
            entries: m.entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response body for the scan and extract endpoints.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionScanResponse {
    pub record: EntityRecordResponse,
    /// Text the record was extracted from (empty when OCR failed).
    pub raw_text: String,
    pub ocr: OcrResultResponse,
    /// Person names from the name finder, independent of `record`.
    pub person_names: Vec<String>,
    /// Present only when a drug catalog is configured.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub catalog_matches: Vec<CatalogMatchResponse>,
    pub storage: StorageResultResponse,
}

impl From<PrescriptionScan> for PrescriptionScanResponse {
    fn from(scan: PrescriptionScan) -> Self {
        Self {
            record: scan.record.into(),
            raw_text: scan.raw_text,
            ocr: scan.ocr.into(),
            person_names: scan.person_names,
            catalog_matches: scan.catalog_matches.into_iter().map(Into::into).collect(),
            storage: scan.storage.into(),
        }
    }
}

/// A persisted record.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecordResponse {
    pub record_id: String,
    pub record: EntityRecordResponse,
    pub raw_text: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<StoredRecord> for StoredRecordResponse {
    fn from(stored: StoredRecord) -> Self {
        Self {
            record_id: stored.id,
            record: stored.record.into(),
            raw_text: stored.raw_text,
            created_at: stored.created_at,
        }
    }
}

/// Response body for `GET /api/v1/prescriptions`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPrescriptionsResponse {
    pub records: Vec<StoredRecordResponse>,
}

/// Response body for `GET /api/v1/vocabulary`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyResponse {
    /// Canonical drug names in match order.
    pub drugs: Vec<String>,
}
