use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::jobs::JobStatusView;
use crate::models::{BankInfo, BatchSubmission, ExtractedFields, Job, JobStatus};

/// Lifecycle state of a slip job on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl From<JobStatus> for JobState {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => Self::Pending,
            JobStatus::Processing => Self::Processing,
            JobStatus::Completed => Self::Completed,
            JobStatus::Failed => Self::Failed,
        }
    }
}

/// Response for `POST /process`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub job_id: String,
    pub status: JobState,
    pub message: String,
}

impl From<&Job> for ProcessResponse {
    fn from(job: &Job) -> Self {
        let message = if job.status == JobStatus::Completed {
            "Processing completed"
        } else {
            "Processing failed"
        };
        Self {
            job_id: job.job_id.clone(),
            status: job.status.into(),
            message: message.to_string(),
        }
    }
}

/// Response for `GET /status/{jobId}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub job_id: String,
    pub status: JobState,
    /// Percent complete: 0, 50 or 100.
    pub progress: f64,
    pub message: String,
}

impl From<JobStatusView> for StatusResponse {
    fn from(view: JobStatusView) -> Self {
        Self {
            job_id: view.job_id,
            status: view.status.into(),
            progress: view.progress,
            message: view.message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BankResponse {
    pub name: String,
    pub code: String,
}

impl From<BankInfo> for BankResponse {
    fn from(bank: BankInfo) -> Self {
        Self {
            name: bank.name,
            code: bank.code,
        }
    }
}

/// Structured fields read from a slip. Dates and times are verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDataResponse {
    pub amount: Option<f64>,
    pub transaction_date: Option<String>,
    pub transaction_time: Option<String>,
    pub reference_number: Option<String>,
    pub bank: Option<BankResponse>,
    pub sender_account: Option<String>,
    pub receiver_account: Option<String>,
    pub sender_name: Option<String>,
    pub receiver_name: Option<String>,
}

impl From<ExtractedFields> for ExtractedDataResponse {
    fn from(fields: ExtractedFields) -> Self {
        Self {
            amount: fields.amount,
            transaction_date: fields.transaction_date,
            transaction_time: fields.transaction_time,
            reference_number: fields.reference_number,
            bank: fields.bank.map(BankResponse::from),
            sender_account: fields.sender_account,
            receiver_account: fields.receiver_account,
            sender_name: fields.sender_name,
            receiver_name: fields.receiver_name,
        }
    }
}

/// Response for `GET /result/{jobId}`: the full job snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlipResultResponse {
    pub job_id: String,
    pub status: JobState,
    pub raw_text: Option<String>,
    pub extracted_data: Option<ExtractedDataResponse>,
    /// Mean recognition confidence in `[0, 1]`.
    pub confidence: Option<f64>,
    pub ocr_engine: Option<String>,
    /// Seconds from submission to completion.
    pub processing_time: Option<f64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for SlipResultResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id,
            status: job.status.into(),
            raw_text: job.raw_text,
            extracted_data: job.extracted_data.map(ExtractedDataResponse::from),
            confidence: job.confidence,
            ocr_engine: job.ocr_engine,
            processing_time: job.processing_time,
            error_message: job.error_message,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Response for `POST /batch`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub batch_id: String,
    /// Member job ids, `{batchId}_{index}` in upload order.
    pub job_ids: Vec<String>,
    pub total: usize,
    pub message: String,
}

impl From<BatchSubmission> for BatchResponse {
    fn from(batch: BatchSubmission) -> Self {
        Self {
            batch_id: batch.batch_id,
            job_ids: batch.job_ids,
            total: batch.total,
            message: batch.message,
        }
    }
}
