use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "rxscan API",
        version = "1.0.0",
        description = "Prescription scanning: OCR of prescription images and extraction of patient, doctor, drug, and quantity fields.",
    ),
    paths(
        handlers::health::health_check,
        handlers::prescriptions::scan_prescription,
        handlers::prescriptions::extract_prescription,
        handlers::prescriptions::list_prescriptions,
        handlers::prescriptions::get_prescription,
        handlers::vocabulary::list_vocabulary,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Prescriptions
        dto::ExtractTextRequest,
        dto::ListPrescriptionsQuery,
        dto::EntityRecordResponse,
        dto::OcrOutcome,
        dto::OcrResultResponse,
        dto::StorageOutcome,
        dto::StorageResultResponse,
        dto::CatalogEntryResponse,
        dto::CatalogMatchResponse,
        dto::PrescriptionScanResponse,
        dto::StoredRecordResponse,
        dto::ListPrescriptionsResponse,
        dto::VocabularyResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::OcrHealth,
        handlers::health::StorageHealth,
        handlers::health::ExtractionHealth,
        handlers::health::CatalogHealth,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "prescriptions", description = "Prescription scanning, extraction, and stored records"),
        (name = "vocabulary", description = "Drug vocabulary used for matching"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_v1_path_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/v1/health",
            "/api/v1/prescriptions:scan",
            "/api/v1/prescriptions:extract",
            "/api/v1/prescriptions",
            "/api/v1/prescriptions/{recordId}",
            "/api/v1/vocabulary",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
