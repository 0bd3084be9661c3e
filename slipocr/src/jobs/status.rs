use serde::{Deserialize, Serialize};

use crate::models::{Job, JobStatus};

/// Progress summary of a job, as reported by status lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusView {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: f64,
    pub message: String,
}

impl From<&Job> for JobStatusView {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.job_id.clone(),
            status: job.status,
            progress: job.status.progress(),
            message: job.status_message(),
        }
    }
}
