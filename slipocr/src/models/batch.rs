use serde::{Deserialize, Serialize};

/// Summary handed back after a batch has been processed.
///
/// A batch has no record of its own; it is its identifier plus the ids of
/// its member jobs, `{batch_id}_{index}` in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSubmission {
    pub batch_id: String,
    pub job_ids: Vec<String>,
    pub total: usize,
    pub message: String,
}

impl BatchSubmission {
    pub fn new(batch_id: impl Into<String>, job_ids: Vec<String>) -> Self {
        let total = job_ids.len();
        Self {
            batch_id: batch_id.into(),
            job_ids,
            total,
            message: format!("Batch processing completed. {total} images processed."),
        }
    }
}

/// Identifier of the `index`-th member of a batch.
pub fn batch_member_id(batch_id: &str, index: usize) -> String {
    format!("{batch_id}_{index}")
}
