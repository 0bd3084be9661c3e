use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::api_key_middleware;

/// Slip routes, mounted under the configured API prefix.
pub fn slip_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/process", post(handlers::slips::process_slip))
        .route("/status/{jobId}", get(handlers::slips::get_status))
        .route("/result/{jobId}", get(handlers::slips::get_result))
        .route("/batch", post(handlers::slips::process_batch))
        .route_layer(middleware::from_fn_with_state(state, api_key_middleware))
}

/// Unauthenticated routes: service info, health and API docs.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router())
}
