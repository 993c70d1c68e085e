//! # V1 API Key Authentication Middleware
//!
//! Protects every v1 route except the public ones (`/health`, `/openapi.json`,
//! `/docs`) with Bearer token authentication against `RXSCAN_API_KEYS`.
//! Failures are returned in the v1 `ApiResponse` envelope.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or("Missing authorization header")?
        .to_str()
        .map_err(|_| "Invalid authorization header format. Expected: Bearer <token>")?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or("Invalid authorization header format. Expected: Bearer <token>")
}

/// Enforces Bearer token authentication.
///
/// With no keys configured every protected route answers 401: the server
/// still starts, but stays locked down until `RXSCAN_API_KEYS` is set.
pub async fn v1_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let keys = &state.config.server.api_keys;
    if keys.is_empty() {
        return ApiResponse::<()>::error(
            ErrorCode::Unauthorized,
            "API keys not configured. Set RXSCAN_API_KEYS to enable access.",
        )
        .into_response();
    }

    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(message) => {
            return ApiResponse::<()>::error(ErrorCode::Unauthorized, message).into_response();
        }
    };

    if keys.iter().any(|key| key == token) {
        next.run(request).await
    } else {
        tracing::debug!("Rejected request with unknown API key");
        ApiResponse::<()>::error(ErrorCode::Unauthorized, "Invalid API key").into_response()
    }
}
