use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlipError {
    #[error("Job store error: {0}")]
    JobStore(String),

    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Image error: {0}")]
    Image(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("No text extracted from image")]
    NoText,

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl SlipError {
    /// True for failures of the persistence layer, which callers must report
    /// separately from per-job OCR failures.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, SlipError::JobStore(_) | SlipError::Database(_))
    }
}

pub type Result<T> = std::result::Result<T, SlipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failures_are_distinguished() {
        assert!(SlipError::JobStore("down".to_string()).is_store_failure());
        assert!(!SlipError::Ocr("engine crashed".to_string()).is_store_failure());
        assert!(!SlipError::Image("bad".to_string()).is_store_failure());
    }

    #[test]
    fn test_json_errors_convert() {
        let err: SlipError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, SlipError::Json(_)));
        assert!(!err.is_store_failure());
    }

    #[test]
    fn test_display_includes_context() {
        let err = SlipError::Image("Failed to decode image: bad header".to_string());
        assert_eq!(
            err.to_string(),
            "Image error: Failed to decode image: bad header"
        );
    }
}
