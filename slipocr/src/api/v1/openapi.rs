use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::middleware::API_KEY_HEADER;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Slip OCR API",
        version = "1.0.0",
        description = "OCR and field extraction for Thai bank transfer slips.",
    ),
    paths(
        handlers::health::service_info,
        handlers::health::health_check,
        handlers::slips::process_slip,
        handlers::slips::get_status,
        handlers::slips::get_result,
        handlers::slips::process_batch,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        // Slips
        dto::JobState,
        dto::ProcessResponse,
        dto::StatusResponse,
        dto::BankResponse,
        dto::ExtractedDataResponse,
        dto::SlipResultResponse,
        dto::BatchResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::ServiceInfo,
    )),
    tags(
        (name = "health", description = "Service info and health check"),
        (name = "slips", description = "Slip processing, status and results"),
    ),
    security(
        ("api_key" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            utoipa::openapi::security::SecurityScheme::ApiKey(
                utoipa::openapi::security::ApiKey::Header(
                    utoipa::openapi::security::ApiKeyValue::new(API_KEY_HEADER),
                ),
            ),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
