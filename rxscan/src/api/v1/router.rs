use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let prescriptions = Router::new()
        .route("/", get(handlers::prescriptions::list_prescriptions))
        .route("/{recordId}", get(handlers::prescriptions::get_prescription));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .route(
            "/prescriptions:scan",
            post(handlers::prescriptions::scan_prescription),
        )
        .route(
            "/prescriptions:extract",
            post(handlers::prescriptions::extract_prescription),
        )
        .nest("/prescriptions", prescriptions)
        .route("/vocabulary", get(handlers::vocabulary::list_vocabulary))
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
