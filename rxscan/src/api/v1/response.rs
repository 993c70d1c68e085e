//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope:
//!
//! ```json
//! {
//!   "data": { ... },                  // present on success, absent on error
//!   "meta": { "total": 42 },          // optional, list endpoints only
//!   "error": { "code": "not_found", "message": "..." }  // present on error
//! }
//! ```
//!
//! Record ids are nanoids (21 characters).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::RxError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire. Each variant maps to a
/// fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed request, unsupported upload, or undecodable image. HTTP 400.
    InvalidRequest,
    /// Missing or invalid API key. HTTP 401.
    Unauthorized,
    /// The requested record does not exist. HTTP 404.
    NotFound,
    /// Upload exceeds the configured size limit. HTTP 413.
    PayloadTooLarge,
    /// Unexpected server-side failure. Details are never leaked. HTTP 500.
    InternalError,
    /// The feature is disabled or its backend is unavailable. HTTP 501.
    NotImplemented,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::PayloadTooLarge => write!(f, "payload_too_large"),
            Self::InternalError => write!(f, "internal_error"),
            Self::NotImplemented => write!(f, "not_implemented"),
        }
    }
}

/// Structured error payload within the API envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    pub message: String,
}

/// Metadata attached to list responses.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    /// Number of items in `data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// The limit that was applied after clamping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Canonical v1 API response envelope.
///
/// On success `data` is present and `error` absent; on error the reverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::OK,
        }
    }

    pub fn success_with_meta(data: T, meta: ResponseMeta) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            meta: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<RxError> for ApiResponse<T> {
    /// Internal error details are never sent to the client: `internal_error`
    /// responses carry a generic message and the real error is logged.
    fn from(err: RxError) -> Self {
        match err {
            RxError::NotFound(msg) => ApiResponse::error(ErrorCode::NotFound, msg),

            RxError::Validation(msg) => ApiResponse::error(ErrorCode::InvalidRequest, msg),

            RxError::ImageDecode(msg) => ApiResponse::error(
                ErrorCode::InvalidRequest,
                format!("Could not decode image: {msg}"),
            ),

            RxError::Json(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            RxError::OcrUnavailable(msg) => ApiResponse::error(ErrorCode::NotImplemented, msg),

            ref internal @ (RxError::Database(_)
            | RxError::Processing(_)
            | RxError::Http(_)
            | RxError::Io(_)
            | RxError::Csv(_)
            | RxError::Ocr(_)
            | RxError::OcrTimeout { .. }
            | RxError::Store(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}

impl IntoResponse for RxError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}
