use axum::extract::State;

use crate::api::state::AppState;
use crate::api::v1::dto::VocabularyResponse;
use crate::api::v1::response::{ApiError, ApiResponse};

/// `GET /api/v1/vocabulary`
///
/// Lists the drug names the extractor recognizes, in match order.
#[utoipa::path(
    get,
    path = "/api/v1/vocabulary",
    tag = "vocabulary",
    operation_id = "vocabulary.list",
    responses(
        (status = 200, description = "Drug vocabulary", body = VocabularyResponse),
        (status = 401, description = "Missing or invalid API key", body = ApiError),
    )
)]
pub async fn list_vocabulary(State(state): State<AppState>) -> ApiResponse<VocabularyResponse> {
    let drugs = state
        .pipeline
        .extractor()
        .vocabulary()
        .names()
        .map(str::to_string)
        .collect();

    ApiResponse::success(VocabularyResponse { drugs })
}
