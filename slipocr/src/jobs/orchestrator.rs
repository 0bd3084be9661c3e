use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use uuid::Uuid;

use super::JobStatusView;
use crate::error::{Result, SlipError};
use crate::extraction::extract_all;
use crate::models::{batch_member_id, ExtractedFields, Job, RecognitionOutcome};
use crate::ocr::{decode_image, Preprocessor, Recognizer, SlipImage};
use crate::store::{result_key, JobStore};

/// Owns the lifecycle of slip jobs.
///
/// Each submission is processed to a terminal state before returning.
/// Recognition and image failures end up in the job as `Failed`. A single
/// submission returns job store failures as errors, since the job could not
/// be tracked; a batch records them as a `Failed` member instead.
#[derive(Clone)]
pub struct JobOrchestrator {
    store: Arc<dyn JobStore>,
    recognizer: Recognizer,
    preprocessor: Arc<dyn Preprocessor>,
    ttl: Duration,
    persist_processing: bool,
    confidence_threshold: f64,
}

impl JobOrchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        recognizer: Recognizer,
        preprocessor: Arc<dyn Preprocessor>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            recognizer,
            preprocessor,
            ttl,
            persist_processing: false,
            confidence_threshold: 0.0,
        }
    }

    /// Also write a `Processing` snapshot between `Pending` and the
    /// terminal state.
    pub fn with_processing_snapshots(mut self, enabled: bool) -> Self {
        self.persist_processing = enabled;
        self
    }

    /// Results below this confidence are logged as suspicious.
    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Processes one image under a freshly generated job id.
    pub async fn submit(
        &self,
        image: &[u8],
        preprocess: bool,
        engine_hint: Option<&str>,
    ) -> Result<Job> {
        let job_id = Uuid::new_v4().to_string();
        self.submit_with_id(job_id, image, preprocess, engine_hint)
            .await
    }

    /// Processes one image under a caller supplied job id.
    pub async fn submit_with_id(
        &self,
        job_id: String,
        image: &[u8],
        preprocess: bool,
        engine_hint: Option<&str>,
    ) -> Result<Job> {
        let started = Instant::now();
        let mut job = Job::pending(job_id);
        self.save(&job).await?;

        if self.persist_processing {
            job.mark_processing();
            self.save(&job).await?;
        }

        match self.run_pipeline(&job.job_id, image, preprocess, engine_hint).await {
            Ok((outcome, fields)) => {
                let engine = outcome.engine.clone();
                let confidence = outcome.confidence;
                job.complete(outcome, fields, started.elapsed());
                info!(
                    job_id = %job.job_id,
                    engine = %engine,
                    confidence,
                    elapsed_secs = job.processing_time.unwrap_or_default(),
                    "Job completed"
                );
            }
            Err(e) => {
                error!(job_id = %job.job_id, "Job failed: {}", e);
                job.fail(e.to_string(), started.elapsed());
            }
        }

        self.save(&job).await?;
        Ok(job)
    }

    /// Processes `images` one after another as members of `batch_id`.
    ///
    /// Member ids are `{batch_id}_{index}` in input order and every index
    /// gets a job in the returned list. A member that fails, job store
    /// failures included, is reported as `Failed` and the batch carries on.
    pub async fn submit_batch(
        &self,
        images: &[Vec<u8>],
        batch_id: &str,
        preprocess: bool,
        engine_hint: Option<&str>,
    ) -> Vec<Job> {
        let mut jobs = Vec::with_capacity(images.len());

        for (index, image) in images.iter().enumerate() {
            let job_id = batch_member_id(batch_id, index);
            info!(
                batch_id,
                "Processing image {}/{} in batch",
                index + 1,
                images.len()
            );

            match self
                .submit_with_id(job_id.clone(), image, preprocess, engine_hint)
                .await
            {
                Ok(job) => jobs.push(job),
                Err(e) => {
                    error!(batch_id, job_id = %job_id, "Failed to process batch member: {}", e);
                    let mut job = Job::pending(job_id);
                    job.fail(e.to_string(), Duration::ZERO);
                    if let Err(save_err) = self.save(&job).await {
                        warn!(job_id = %job.job_id, "Could not persist failed batch member: {}", save_err);
                    }
                    jobs.push(job);
                }
            }
        }

        jobs
    }

    /// Current status of a job; `None` when unknown or expired.
    pub async fn get_status(&self, job_id: &str) -> Result<Option<JobStatusView>> {
        Ok(self.load(job_id).await?.as_ref().map(JobStatusView::from))
    }

    /// Full snapshot of a job; `None` when unknown or expired.
    pub async fn get_result(&self, job_id: &str) -> Result<Option<Job>> {
        self.load(job_id).await
    }

    async fn run_pipeline(
        &self,
        job_id: &str,
        image: &[u8],
        preprocess: bool,
        engine_hint: Option<&str>,
    ) -> Result<(RecognitionOutcome, ExtractedFields)> {
        let image = self.prepare(image, preprocess).await?;

        let outcome = self.recognizer.process(&image, engine_hint).await;
        if outcome.text.trim().is_empty() {
            return Err(SlipError::NoText);
        }
        if outcome.confidence < self.confidence_threshold {
            warn!(
                job_id,
                engine = %outcome.engine,
                confidence = outcome.confidence,
                threshold = self.confidence_threshold,
                "OCR confidence below threshold"
            );
        }

        let fields = extract_all(&outcome.text);
        Ok((outcome, fields))
    }

    /// Image work is CPU bound and runs on the blocking pool.
    async fn prepare(&self, image: &[u8], preprocess: bool) -> Result<SlipImage> {
        let bytes = image.to_vec();
        if preprocess {
            let preprocessor = Arc::clone(&self.preprocessor);
            tokio::task::spawn_blocking(move || preprocessor.normalize(&bytes))
                .await
                .map_err(|e| SlipError::Internal(format!("Preprocessing task failed: {e}")))?
        } else {
            tokio::task::spawn_blocking(move || decode_image(&bytes))
                .await
                .map_err(|e| SlipError::Internal(format!("Decoding task failed: {e}")))?
        }
    }

    async fn save(&self, job: &Job) -> Result<()> {
        let value = serde_json::to_string(job)?;
        self.store
            .set(&result_key(&job.job_id), &value, self.ttl)
            .await
            .map_err(|e| match e {
                SlipError::JobStore(_) => e,
                other => SlipError::JobStore(other.to_string()),
            })
    }

    async fn load(&self, job_id: &str) -> Result<Option<Job>> {
        let value = self
            .store
            .get(&result_key(job_id))
            .await
            .map_err(|e| match e {
                SlipError::JobStore(_) => e,
                other => SlipError::JobStore(other.to_string()),
            })?;

        match value {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|e| {
                SlipError::JobStore(format!("Corrupted snapshot for job {job_id}: {e}"))
            }),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobStatus, TextSpan, NO_ENGINE};
    use crate::ocr::RecognitionBackend;
    use crate::store::MemoryJobStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echoes the first byte of the image as recognised text.
    struct EchoBackend;

    #[async_trait]
    impl RecognitionBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn recognize(&self, image: &SlipImage) -> Result<Vec<TextSpan>> {
            match image.png.first() {
                Some(b'!') => Err(SlipError::Ocr("engine crashed".to_string())),
                Some(b'_') => Ok(vec![]),
                _ => Ok(vec![TextSpan::new(
                    String::from_utf8_lossy(&image.png).to_string(),
                    0.95,
                )]),
            }
        }
    }

    /// Passes bytes through untouched; "bad" bytes fail.
    struct PassThrough;

    impl Preprocessor for PassThrough {
        fn normalize(&self, bytes: &[u8]) -> Result<SlipImage> {
            if bytes == b"bad" {
                return Err(SlipError::Image("Failed to decode image".to_string()));
            }
            Ok(SlipImage {
                png: bytes.to_vec(),
                width: 1,
                height: 1,
            })
        }
    }

    /// Records every written status, optionally failing writes.
    struct RecordingStore {
        inner: MemoryJobStore,
        writes: Mutex<Vec<JobStatus>>,
        fail_writes: bool,
        fail_on_write: Option<usize>,
        attempts: Mutex<usize>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                inner: MemoryJobStore::new(100),
                writes: Mutex::new(Vec::new()),
                fail_writes: false,
                fail_on_write: None,
                attempts: Mutex::new(0),
            }
        }

        /// Fails only the `nth` write (1-based).
        fn failing_once_at(nth: usize) -> Self {
            Self {
                fail_on_write: Some(nth),
                ..Self::new()
            }
        }

        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl JobStore for RecordingStore {
        async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                *attempts += 1;
                *attempts
            };
            if self.fail_writes || self.fail_on_write == Some(attempt) {
                return Err(SlipError::JobStore("connection refused".to_string()));
            }
            let job: Job = serde_json::from_str(value).unwrap();
            self.writes.lock().unwrap().push(job.status);
            self.inner.set(key, value, ttl).await
        }
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }
        async fn delete(&self, key: &str) -> Result<bool> {
            self.inner.delete(key).await
        }
        async fn ping(&self) -> Result<()> {
            Ok(())
        }
        async fn purge_expired(&self) -> Result<u64> {
            self.inner.purge_expired().await
        }
    }

    fn orchestrator(store: Arc<RecordingStore>) -> JobOrchestrator {
        JobOrchestrator::new(
            store,
            Recognizer::new(vec![Arc::new(EchoBackend)]),
            Arc::new(PassThrough),
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn test_submit_completes_and_persists() {
        let store = Arc::new(RecordingStore::new());
        let orchestrator = orchestrator(store.clone());

        let job = orchestrator
            .submit("จำนวนเงิน: 1,500.00 บาท".as_bytes(), true, None)
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.ocr_engine.as_deref(), Some("echo"));
        assert_eq!(job.confidence, Some(0.95));
        assert_eq!(job.extracted_data.as_ref().unwrap().amount, Some(1500.0));
        assert_eq!(
            *store.writes.lock().unwrap(),
            vec![JobStatus::Pending, JobStatus::Completed]
        );

        let stored = orchestrator.get_result(&job.job_id).await.unwrap().unwrap();
        assert_eq!(stored, job);
    }

    #[tokio::test]
    async fn test_processing_snapshot_is_optional() {
        let store = Arc::new(RecordingStore::new());
        let orchestrator = orchestrator(store.clone()).with_processing_snapshots(true);

        orchestrator.submit(b"text", true, None).await.unwrap();
        assert_eq!(
            *store.writes.lock().unwrap(),
            vec![JobStatus::Pending, JobStatus::Processing, JobStatus::Completed]
        );
    }

    #[tokio::test]
    async fn test_empty_text_fails_job() {
        let orchestrator = orchestrator(Arc::new(RecordingStore::new()));

        let job = orchestrator.submit(b"_", true, None).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some("No text extracted from image"));
        assert!(job.raw_text.is_none());
    }

    #[tokio::test]
    async fn test_engine_exhaustion_reports_no_text() {
        let orchestrator = orchestrator(Arc::new(RecordingStore::new()));

        let job = orchestrator.submit(b"!", true, None).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error_message.as_deref(), Some("No text extracted from image"));
        assert_ne!(job.ocr_engine.as_deref(), Some(NO_ENGINE));
    }

    #[tokio::test]
    async fn test_preprocessing_failure_fails_job() {
        let orchestrator = orchestrator(Arc::new(RecordingStore::new()));

        let job = orchestrator.submit(b"bad", true, None).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job
            .error_message
            .as_deref()
            .unwrap()
            .contains("Failed to decode image"));
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error() {
        let store = Arc::new(RecordingStore::failing());
        let orchestrator = orchestrator(store);

        let err = orchestrator.submit(b"text", true, None).await.unwrap_err();
        assert!(err.is_store_failure());
    }

    #[tokio::test]
    async fn test_batch_ids_and_partial_failure() {
        let orchestrator = orchestrator(Arc::new(RecordingStore::new()));
        let images = vec![b"first".to_vec(), b"!".to_vec(), b"third".to_vec()];

        let jobs = orchestrator
            .submit_batch(&images, "batch-1", true, None)
            .await;

        let ids: Vec<_> = jobs.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["batch-1_0", "batch-1_1", "batch-1_2"]);
        assert_eq!(jobs[0].status, JobStatus::Completed);
        assert_eq!(jobs[1].status, JobStatus::Failed);
        assert_eq!(jobs[2].status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_batch_continues_after_store_failure() {
        // Write 3 is the Pending snapshot of the second member.
        let store = Arc::new(RecordingStore::failing_once_at(3));
        let orchestrator = orchestrator(store.clone());
        let images = vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()];

        let jobs = orchestrator.submit_batch(&images, "b", true, None).await;

        let summary: Vec<_> = jobs.iter().map(|j| (j.job_id.as_str(), j.status)).collect();
        assert_eq!(
            summary,
            vec![
                ("b_0", JobStatus::Completed),
                ("b_1", JobStatus::Failed),
                ("b_2", JobStatus::Completed),
            ]
        );
        assert!(jobs[1]
            .error_message
            .as_deref()
            .unwrap()
            .contains("connection refused"));

        let failed = orchestrator.get_result("b_1").await.unwrap().unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        let last = orchestrator.get_result("b_2").await.unwrap().unwrap();
        assert_eq!(last.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn test_status_lookup() {
        let orchestrator = orchestrator(Arc::new(RecordingStore::new()));
        let job = orchestrator.submit(b"text", true, None).await.unwrap();

        let view = orchestrator.get_status(&job.job_id).await.unwrap().unwrap();
        assert_eq!(view.status, JobStatus::Completed);
        assert_eq!(view.progress, 100.0);
        assert_eq!(view.message, "Processing completed successfully");

        assert!(orchestrator.get_status("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupted_snapshot_is_store_error() {
        let store = Arc::new(RecordingStore::new());
        store
            .inner
            .set(&result_key("broken"), "not json", Duration::from_secs(60))
            .await
            .unwrap();
        let orchestrator = orchestrator(store);

        let err = orchestrator.get_result("broken").await.unwrap_err();
        assert!(err.is_store_failure());
    }
}
