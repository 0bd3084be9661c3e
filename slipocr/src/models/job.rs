use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ExtractedFields, RecognitionOutcome};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Progress percentage: 0 while pending, 50 in flight, 100 once terminal.
    pub fn progress(&self) -> f64 {
        match self {
            Self::Pending => 0.0,
            Self::Processing => 50.0,
            Self::Completed | Self::Failed => 100.0,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown job status: {s}")),
        }
    }
}

/// Tracked state of one slip image.
///
/// `raw_text` and `extracted_data` are only set on completed jobs and
/// `error_message` only on failed ones; the transition methods are the
/// only way those fields get written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    pub raw_text: Option<String>,
    pub extracted_data: Option<ExtractedFields>,
    pub confidence: Option<f64>,
    pub ocr_engine: Option<String>,
    /// Seconds from submission to the terminal snapshot.
    pub processing_time: Option<f64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn pending(job_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.into(),
            status: JobStatus::Pending,
            raw_text: None,
            extracted_data: None,
            confidence: None,
            ocr_engine: None,
            processing_time: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_processing(&mut self) {
        self.status = JobStatus::Processing;
        self.updated_at = Utc::now();
    }

    pub fn complete(
        &mut self,
        outcome: RecognitionOutcome,
        fields: ExtractedFields,
        elapsed: Duration,
    ) {
        self.status = JobStatus::Completed;
        self.raw_text = Some(outcome.text);
        self.extracted_data = Some(fields);
        self.confidence = Some(outcome.confidence.clamp(0.0, 1.0));
        self.ocr_engine = Some(outcome.engine);
        self.error_message = None;
        self.processing_time = Some(elapsed.as_secs_f64());
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self, message: impl Into<String>, elapsed: Duration) {
        self.status = JobStatus::Failed;
        self.raw_text = None;
        self.extracted_data = None;
        self.error_message = Some(message.into());
        self.processing_time = Some(elapsed.as_secs_f64());
        self.updated_at = Utc::now();
    }

    /// Human readable description of where the job stands.
    pub fn status_message(&self) -> String {
        match self.status {
            JobStatus::Pending => "Processing pending".to_string(),
            JobStatus::Processing => "Processing in progress".to_string(),
            JobStatus::Completed => "Processing completed successfully".to_string(),
            JobStatus::Failed => format!(
                "Processing failed: {}",
                self.error_message.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
