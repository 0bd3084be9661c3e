use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::v1;
use super::AppState;

/// Multipart framing and form fields on top of the image payloads.
const FORM_OVERHEAD: usize = 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let processing = &state.config.processing;
    let body_limit = processing
        .max_image_size
        .saturating_mul(processing.batch_size.max(1))
        .saturating_add(FORM_OVERHEAD);

    let prefix = state.config.server.api_prefix.trim_end_matches('/').to_string();
    let slips = v1::router::slip_router(state.clone());
    let app = if prefix.is_empty() {
        Router::new().merge(slips)
    } else {
        Router::new().nest(&prefix, slips)
    };

    app.merge(v1::router::public_router())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
