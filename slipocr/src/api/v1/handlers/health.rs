use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;

/// Health data returned inside the envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    /// `healthy` when the job store and at least one OCR engine are
    /// usable, `degraded` otherwise.
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub store_connected: bool,
    pub ocr_available: bool,
    /// Registered OCR engines in fallback order.
    pub engines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub docs: String,
    pub api: String,
}

/// `GET /health`
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let store_connected = match state.orchestrator.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Job store health check failed: {}", e);
            false
        }
    };
    let recognizer = state.orchestrator.recognizer();
    let ocr_available = recognizer.is_available();

    let status = if store_connected && ocr_available {
        "healthy"
    } else {
        "degraded"
    };

    ApiResponse::success(HealthData {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        store_connected,
        ocr_available,
        engines: recognizer.engines(),
    })
}

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo),
    )
)]
pub async fn service_info(State(state): State<AppState>) -> ApiResponse<ServiceInfo> {
    ApiResponse::success(ServiceInfo {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        docs: "/docs".to_string(),
        api: state.config.server.api_prefix.clone(),
    })
}
