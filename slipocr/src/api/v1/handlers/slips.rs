use axum::extract::{Multipart, Path, State};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::v1::dto::{BatchResponse, ProcessResponse, SlipResultResponse, StatusResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::config::ProcessingConfig;
use crate::models::BatchSubmission;

fn parse_form_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Checks one uploaded image against the processing limits.
///
/// The extension is checked by name and by guessed MIME type, and the
/// content must carry a recognised image signature.
fn validate_upload(
    file_name: &str,
    bytes: &[u8],
    config: &ProcessingConfig,
) -> Result<(), String> {
    let allowed = config.allowed_extensions.join(", ");
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !config.allowed_extensions.contains(&extension) {
        return Err(format!("Invalid file type for {file_name}. Allowed: {allowed}"));
    }

    let is_image = mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false);
    if !is_image {
        return Err(format!("Invalid file type for {file_name}. Allowed: {allowed}"));
    }

    if bytes.is_empty() {
        return Err(format!("Empty file: {file_name}"));
    }

    if bytes.len() > config.max_image_size {
        return Err(format!(
            "File {file_name} too large. Max size: {:.1}MB",
            config.max_image_size as f64 / (1024.0 * 1024.0)
        ));
    }

    if image::guess_format(bytes).is_err() {
        return Err(format!("File {file_name} is not a recognised image"));
    }

    Ok(())
}

/// Form fields shared by the single and batch upload endpoints.
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<(String, Vec<u8>)>,
    preprocess: Option<bool>,
    ocr_engine: Option<String>,
}

async fn read_upload_form(
    mut multipart: Multipart,
    file_field: &str,
    config: &ProcessingConfig,
) -> Result<UploadForm, String> {
    let mut form = UploadForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(format!("Invalid multipart body: {e}")),
        };
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            n if n == file_field => {
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    warn!(field = file_field, "Skipping upload without a filename");
                    continue;
                };
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file {file_name}: {e}"))?;
                validate_upload(&file_name, &bytes, config)?;
                form.files.push((file_name, bytes.to_vec()));
            }
            "preprocess" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| format!("Invalid preprocess value: {e}"))?;
                form.preprocess = Some(
                    parse_form_bool(&raw)
                        .ok_or("preprocess must be one of true/false/1/0/yes/no")?,
                );
            }
            "ocrEngine" | "ocr_engine" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| format!("Invalid ocrEngine value: {e}"))?;
                let engine = raw.trim().to_lowercase();
                form.ocr_engine = (!engine.is_empty()).then_some(engine);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// `POST /api/ocr/process`
///
/// Runs OCR and field extraction on one slip image and returns once the
/// job has reached a terminal state.
#[utoipa::path(
    post,
    path = "/api/ocr/process",
    tag = "slips",
    operation_id = "slips.process",
    request_body(content_type = "multipart/form-data", content = String, description = "Image in `file`, optional `preprocess` and `ocrEngine` fields"),
    responses(
        (status = 200, description = "Job processed; check status for the outcome", body = ProcessResponse),
        (status = 400, description = "Invalid upload", body = ApiError),
        (status = 503, description = "Job store unavailable", body = ApiError),
    )
)]
pub async fn process_slip(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResponse<ProcessResponse> {
    let processing = &state.config.processing;
    let form = match read_upload_form(multipart, "file", processing).await {
        Ok(form) => form,
        Err(msg) => return ApiResponse::error(ErrorCode::InvalidRequest, msg),
    };

    let Some((file_name, bytes)) = form.files.into_iter().next() else {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Missing required 'file' field");
    };

    info!(file_name = %file_name, size = bytes.len(), "Slip upload received");

    match state
        .orchestrator
        .submit(
            &bytes,
            form.preprocess.unwrap_or(processing.preprocess_by_default),
            form.ocr_engine.as_deref(),
        )
        .await
    {
        Ok(job) => ApiResponse::success(ProcessResponse::from(&job)),
        Err(e) => e.into(),
    }
}

/// `GET /api/ocr/status/{jobId}`
#[utoipa::path(
    get,
    path = "/api/ocr/status/{jobId}",
    tag = "slips",
    operation_id = "slips.status",
    params(("jobId" = String, Path, description = "Job identifier")),
    responses(
        (status = 200, description = "Job status", body = StatusResponse),
        (status = 404, description = "Job not found or expired", body = ApiError),
        (status = 503, description = "Job store unavailable", body = ApiError),
    )
)]
pub async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResponse<StatusResponse> {
    match state.orchestrator.get_status(&job_id).await {
        Ok(Some(view)) => ApiResponse::success(StatusResponse::from(view)),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, format!("Job {job_id} not found")),
        Err(e) => e.into(),
    }
}

/// `GET /api/ocr/result/{jobId}`
#[utoipa::path(
    get,
    path = "/api/ocr/result/{jobId}",
    tag = "slips",
    operation_id = "slips.result",
    params(("jobId" = String, Path, description = "Job identifier")),
    responses(
        (status = 200, description = "Full job snapshot", body = SlipResultResponse),
        (status = 404, description = "Job not found or expired", body = ApiError),
        (status = 503, description = "Job store unavailable", body = ApiError),
    )
)]
pub async fn get_result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResponse<SlipResultResponse> {
    match state.orchestrator.get_result(&job_id).await {
        Ok(Some(job)) => ApiResponse::success(SlipResultResponse::from(job)),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, format!("Job {job_id} not found")),
        Err(e) => e.into(),
    }
}

/// `POST /api/ocr/batch`
///
/// Processes every image in `files` sequentially under a new batch id.
/// Member ids are `{batchId}_{index}` in upload order.
#[utoipa::path(
    post,
    path = "/api/ocr/batch",
    tag = "slips",
    operation_id = "slips.batch",
    request_body(content_type = "multipart/form-data", content = String, description = "Images in repeated `files` fields, optional `preprocess` and `ocrEngine`"),
    responses(
        (status = 200, description = "Batch processed", body = BatchResponse),
        (status = 400, description = "Invalid upload", body = ApiError),
    )
)]
pub async fn process_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResponse<BatchResponse> {
    let processing = &state.config.processing;
    let form = match read_upload_form(multipart, "files", processing).await {
        Ok(form) => form,
        Err(msg) => return ApiResponse::error(ErrorCode::InvalidRequest, msg),
    };

    if form.files.is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "No files provided");
    }
    if form.files.len() > processing.batch_size {
        return ApiResponse::error(
            ErrorCode::InvalidRequest,
            format!(
                "Too many files. Maximum batch size: {}",
                processing.batch_size
            ),
        );
    }

    let batch_id = Uuid::new_v4().to_string();
    let images: Vec<Vec<u8>> = form.files.into_iter().map(|(_, bytes)| bytes).collect();
    info!(batch_id = %batch_id, total = images.len(), "Batch upload received");

    let jobs = state
        .orchestrator
        .submit_batch(
            &images,
            &batch_id,
            form.preprocess.unwrap_or(processing.preprocess_by_default),
            form.ocr_engine.as_deref(),
        )
        .await;

    let job_ids = jobs.into_iter().map(|job| job.job_id).collect();
    ApiResponse::success(BatchResponse::from(BatchSubmission::new(batch_id, job_ids)))
}
