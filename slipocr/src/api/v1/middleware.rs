//! # API Key Authentication Middleware
//!
//! When `API_KEY` is configured, every slip route requires a matching
//! `X-API-Key` header. Without a configured key the routes are open.
//! Rejections use the `ApiResponse` JSON envelope.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

pub const API_KEY_HEADER: &str = "X-API-Key";

pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.config.server.api_key.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if key == expected => next.run(request).await,
        Some(_) => ApiResponse::<()>::error(ErrorCode::Unauthorized, "Invalid API key")
            .into_response(),
        None => ApiResponse::<()>::error(
            ErrorCode::Unauthorized,
            format!("Missing {API_KEY_HEADER} header"),
        )
        .into_response(),
    }
}
