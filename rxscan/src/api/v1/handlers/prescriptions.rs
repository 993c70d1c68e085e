use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum_extra::extract::Query;

use crate::api::extractors::AppJson;
use crate::api::state::AppState;
use crate::api::v1::dto::{
    ExtractTextRequest, ListPrescriptionsQuery, ListPrescriptionsResponse,
    PrescriptionScanResponse, StoredRecordResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode, ResponseMeta};
use crate::ocr::detect_image_format;
use crate::pipeline::ScanOptions;

const STORAGE_DISABLED: &str = "Record storage is disabled. Set STORAGE_ENABLED=true to enable it.";

fn parse_form_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn too_large<T: serde::Serialize>(max_bytes: usize) -> ApiResponse<T> {
    ApiResponse::error(
        ErrorCode::PayloadTooLarge,
        format!("Image too large (max {max_bytes} bytes)"),
    )
}

fn multipart_error<T: serde::Serialize>(err: MultipartError, max_bytes: usize) -> ApiResponse<T> {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_bytes)
    } else {
        ApiResponse::error(
            ErrorCode::InvalidRequest,
            format!("Invalid multipart body: {}", err.body_text()),
        )
    }
}

/// `POST /api/v1/prescriptions:scan`
///
/// Accepts a multipart form with a `file` field holding a JPEG, PNG, WebP,
/// TIFF, or BMP image and an optional `store` flag. OCR failures do not fail
/// the request: the record comes back empty and `ocr.status` says why.
#[utoipa::path(
    post,
    path = "/api/v1/prescriptions:scan",
    tag = "prescriptions",
    operation_id = "prescriptions.scan",
    request_body(content_type = "multipart/form-data", content = String, description = "Prescription image in `file`, optional `store` flag"),
    responses(
        (status = 200, description = "Prescription scanned", body = PrescriptionScanResponse),
        (status = 400, description = "Missing, unsupported, or undecodable image", body = ApiError),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
        (status = 413, description = "Image exceeds the upload limit", body = ApiError),
    )
)]
pub async fn scan_prescription(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResponse<PrescriptionScanResponse> {
    let max_bytes = state.pipeline.max_upload_bytes();
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut store: Option<bool> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_error(e, max_bytes),
        };
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" | "image" => {
                let bytes = match field.bytes().await {
                    Ok(b) => b,
                    Err(e) => return multipart_error(e, max_bytes),
                };
                if bytes.len() > max_bytes {
                    return too_large(max_bytes);
                }
                file_bytes = Some(bytes.to_vec());
            }
            "store" => {
                let raw = match field.text().await {
                    Ok(t) => t,
                    Err(e) => return multipart_error(e, max_bytes),
                };
                match parse_form_bool(&raw) {
                    Some(value) => store = Some(value),
                    None => {
                        return ApiResponse::error(
                            ErrorCode::InvalidRequest,
                            "store must be one of true/false/1/0/yes/no",
                        );
                    }
                }
            }
            _ => {}
        }
    }

    let bytes = match file_bytes {
        Some(b) if !b.is_empty() => b,
        Some(_) => return ApiResponse::error(ErrorCode::InvalidRequest, "Uploaded file is empty"),
        None => {
            return ApiResponse::error(ErrorCode::InvalidRequest, "Missing required 'file' field");
        }
    };

    let Some(format) = detect_image_format(&bytes) else {
        return ApiResponse::error(
            ErrorCode::InvalidRequest,
            "Unsupported file type. Expected a JPEG, PNG, WebP, TIFF, or BMP image",
        );
    };
    tracing::debug!(format = format.as_str(), bytes = bytes.len(), "Prescription upload received");

    let options = ScanOptions {
        store: store.unwrap_or(false),
    };
    match state.pipeline.scan(&bytes, options).await {
        Ok(scan) => ApiResponse::success(scan.into()),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/prescriptions:extract`
///
/// Runs entity extraction on text that was already recognized elsewhere.
#[utoipa::path(
    post,
    path = "/api/v1/prescriptions:extract",
    tag = "prescriptions",
    operation_id = "prescriptions.extract",
    request_body = ExtractTextRequest,
    responses(
        (status = 200, description = "Entities extracted", body = PrescriptionScanResponse),
        (status = 400, description = "Invalid request body", body = ApiError),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
    )
)]
pub async fn extract_prescription(
    State(state): State<AppState>,
    AppJson(req): AppJson<ExtractTextRequest>,
) -> ApiResponse<PrescriptionScanResponse> {
    let options = ScanOptions {
        store: req.store.unwrap_or(false),
    };
    let scan = state.pipeline.scan_text(&req.text, options).await;
    ApiResponse::success(scan.into())
}

/// `GET /api/v1/prescriptions`
///
/// Most recently stored records first. `meta.total` counts every stored
/// record, not just the returned page.
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions",
    tag = "prescriptions",
    operation_id = "prescriptions.list",
    params(ListPrescriptionsQuery),
    responses(
        (status = 200, description = "Stored records", body = ListPrescriptionsResponse),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
        (status = 501, description = "Record storage is disabled", body = ApiError),
    )
)]
pub async fn list_prescriptions(
    State(state): State<AppState>,
    Query(query): Query<ListPrescriptionsQuery>,
) -> ApiResponse<ListPrescriptionsResponse> {
    let Some(records) = state.records() else {
        return ApiResponse::error(ErrorCode::NotImplemented, STORAGE_DISABLED);
    };

    let limit = query.effective_limit();
    let total = match records.count().await {
        Ok(total) => total,
        Err(e) => return e.into(),
    };
    match records.list_recent(limit).await {
        Ok(stored) => {
            let meta = ResponseMeta {
                total: Some(total),
                limit: Some(limit),
            };
            let records = stored.into_iter().map(StoredRecordResponse::from).collect();
            ApiResponse::success_with_meta(ListPrescriptionsResponse { records }, meta)
        }
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/prescriptions/{recordId}`
#[utoipa::path(
    get,
    path = "/api/v1/prescriptions/{recordId}",
    tag = "prescriptions",
    operation_id = "prescriptions.get",
    params(("recordId" = String, Path, description = "Stored record ID")),
    responses(
        (status = 200, description = "Record found", body = StoredRecordResponse),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
        (status = 404, description = "Record not found", body = ApiError),
        (status = 501, description = "Record storage is disabled", body = ApiError),
    )
)]
pub async fn get_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<StoredRecordResponse> {
    let Some(records) = state.records() else {
        return ApiResponse::error(ErrorCode::NotImplemented, STORAGE_DISABLED);
    };

    match records.get(&id).await {
        Ok(Some(stored)) => ApiResponse::success(stored.into()),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, format!("Record {id} not found")),
        Err(e) => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_form_bool_accepts_supported_values() {
        assert_eq!(parse_form_bool("true"), Some(true));
        assert_eq!(parse_form_bool(" YES "), Some(true));
        assert_eq!(parse_form_bool("1"), Some(true));
        assert_eq!(parse_form_bool("off"), Some(false));
        assert_eq!(parse_form_bool("0"), Some(false));
        assert_eq!(parse_form_bool("maybe"), None);
        assert_eq!(parse_form_bool(""), None);
    }

    #[test]
    fn too_large_maps_to_413() {
        let response: ApiResponse<()> = too_large(1024);
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let error = response.error.expect("error payload");
        assert!(error.message.contains("1024"));
    }
}
