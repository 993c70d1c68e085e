use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub ocr: OcrHealth,
    pub storage: StorageHealth,
    pub extraction: ExtractionHealth,
    pub catalog: CatalogHealth,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct OcrHealth {
    /// `"available"` or `"unavailable"`.
    pub status: String,
    pub engine: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StorageHealth {
    /// `"ok"`, `"error"`, or `"disabled"`.
    pub status: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionHealth {
    pub vocabulary_size: usize,
    pub name_finder: bool,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CatalogHealth {
    pub enabled: bool,
}

/// `GET /api/v1/health`
///
/// Always 200. A missing OCR engine or an unreachable database is reported
/// in the body; scans still answer with empty records in that state.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let pipeline = &state.pipeline;

    let recognizer = pipeline.recognizer();
    let ocr = OcrHealth {
        status: if recognizer.is_available() {
            "available"
        } else {
            "unavailable"
        }
        .to_string(),
        engine: recognizer.engine_name().to_string(),
    };

    let storage = match state.records() {
        None => "disabled",
        Some(records) => match records.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Record store health check failed");
                "error"
            }
        },
    };

    let extractor = pipeline.extractor();

    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr,
        storage: StorageHealth {
            status: storage.to_string(),
        },
        extraction: ExtractionHealth {
            vocabulary_size: extractor.vocabulary().len(),
            name_finder: extractor.has_name_finder(),
        },
        catalog: CatalogHealth {
            enabled: pipeline.has_catalog(),
        },
    })
}
