use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::backend::{RecognitionBackend, SlipImage};
use super::remote::RemoteOcrBackend;
use super::tesseract::{TesseractBackend, TESSERACT_ENGINE};
use crate::config::OcrConfig;
use crate::error::{Result, SlipError};
use crate::models::{RecognitionOutcome, TextSpan};

/// Runs recognition over an ordered list of backends.
///
/// Registration order is fallback priority. Backends that failed to
/// initialise are never registered.
#[derive(Clone, Default)]
pub struct Recognizer {
    backends: Vec<Arc<dyn RecognitionBackend>>,
}

impl Recognizer {
    pub fn new(backends: Vec<Arc<dyn RecognitionBackend>>) -> Self {
        Self { backends }
    }

    /// Builds the backend list from `OCR_ENGINES`. Engines that cannot be
    /// initialised are logged and skipped.
    pub fn from_config(config: &OcrConfig) -> Self {
        let mut backends: Vec<Arc<dyn RecognitionBackend>> = Vec::new();

        for spec in &config.engines {
            let backend: Result<Arc<dyn RecognitionBackend>> =
                match (spec.name.as_str(), spec.url.as_deref()) {
                    (TESSERACT_ENGINE, None) => {
                        TesseractBackend::new(config)
                            .map(|b| Arc::new(b) as Arc<dyn RecognitionBackend>)
                    }
                    (name, Some(url)) => {
                        RemoteOcrBackend::new(name, url, config)
                            .map(|b| Arc::new(b) as Arc<dyn RecognitionBackend>)
                    }
                    (name, None) => Err(SlipError::OcrUnavailable(format!(
                        "Unknown OCR engine '{name}' (remote engines need name=url)"
                    ))),
                };

            match backend {
                Ok(backend) => {
                    info!(engine = backend.name(), "OCR engine registered");
                    backends.push(backend);
                }
                Err(e) => warn!(engine = %spec.name, "OCR engine unavailable: {}", e),
            }
        }

        Self { backends }
    }

    pub fn is_available(&self) -> bool {
        !self.backends.is_empty()
    }

    /// Names of the registered engines in priority order.
    pub fn engines(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name().to_string()).collect()
    }

    /// Recognises `image`, trying the hinted engine first and then every
    /// engine in priority order until one returns.
    ///
    /// When all engines fail the exhausted sentinel (empty text, engine
    /// `none`) is returned rather than an error.
    pub async fn process(
        &self,
        image: &SlipImage,
        engine_hint: Option<&str>,
    ) -> RecognitionOutcome {
        let started = Instant::now();

        if let Some(hint) = engine_hint {
            match self.backends.iter().find(|b| b.name() == hint) {
                Some(backend) => match backend.recognize(image).await {
                    Ok(spans) => return Self::outcome(backend.as_ref(), &spans, started),
                    Err(e) => warn!(
                        engine = hint,
                        "Requested OCR engine failed, trying fallback: {}",
                        e
                    ),
                },
                None => warn!(engine = hint, "Requested OCR engine not available"),
            }
        }

        for backend in &self.backends {
            match backend.recognize(image).await {
                Ok(spans) => return Self::outcome(backend.as_ref(), &spans, started),
                Err(e) => warn!(engine = backend.name(), "OCR engine failed: {}", e),
            }
        }

        warn!("All OCR engines failed");
        RecognitionOutcome::exhausted(started.elapsed())
    }

    fn outcome(
        backend: &dyn RecognitionBackend,
        spans: &[TextSpan],
        started: Instant,
    ) -> RecognitionOutcome {
        RecognitionOutcome::from_spans(backend.name(), spans, started.elapsed())
    }
}
