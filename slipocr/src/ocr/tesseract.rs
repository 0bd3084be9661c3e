//! Local Tesseract engine.
//!
//! Linking leptess needs the system tesseract and leptonica libraries, so
//! the engine is only compiled with the `tesseract` feature. Without it
//! `TesseractBackend::new` fails and the recognizer leaves it out.

use async_trait::async_trait;
use std::time::Duration;

use super::backend::{RecognitionBackend, SlipImage};
use crate::config::OcrConfig;
use crate::error::{Result, SlipError};
use crate::models::TextSpan;

pub const TESSERACT_ENGINE: &str = "tesseract";

/// Splits Tesseract output into one span per non-empty line, each carrying
/// the page mean confidence (reported by the engine on a 0-100 scale).
#[cfg_attr(not(feature = "tesseract"), allow(dead_code))]
fn spans_from_text(text: &str, mean_conf: i32) -> Vec<TextSpan> {
    let confidence = (f64::from(mean_conf) / 100.0).clamp(0.0, 1.0);
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| TextSpan::new(line, confidence))
        .collect()
}

#[cfg(feature = "tesseract")]
mod engine {
    use leptess::LepTess;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use crate::error::{Result, SlipError};
    use crate::models::TextSpan;

    #[derive(Clone)]
    pub struct Engine {
        tesseract: Arc<Mutex<LepTess>>,
    }

    impl Engine {
        pub fn new(languages: &str) -> Result<Self> {
            let lt = LepTess::new(None, languages)
                .map_err(|e| SlipError::OcrUnavailable(format!("Tesseract not available: {e}")))?;
            Ok(Self {
                tesseract: Arc::new(Mutex::new(lt)),
            })
        }

        pub async fn run(&self, png: Vec<u8>) -> Result<Vec<TextSpan>> {
            let tesseract = Arc::clone(&self.tesseract);

            tokio::task::spawn_blocking(move || {
                let mut lt = tesseract.blocking_lock();
                lt.set_image_from_mem(&png)
                    .map_err(|e| SlipError::Ocr(format!("Failed to set image: {e}")))?;
                let text = lt
                    .get_utf8_text()
                    .map_err(|e| SlipError::Ocr(format!("Failed to extract text: {e}")))?;
                let mean_conf = lt.mean_text_conf();
                Ok(super::spans_from_text(&text, mean_conf))
            })
            .await
            .map_err(|e| SlipError::Ocr(format!("OCR task panicked: {e}")))?
        }
    }
}

#[cfg(not(feature = "tesseract"))]
mod engine {
    use crate::error::{Result, SlipError};
    use crate::models::TextSpan;

    #[derive(Clone)]
    pub struct Engine;

    impl Engine {
        pub fn new(_languages: &str) -> Result<Self> {
            Err(SlipError::OcrUnavailable(
                "Tesseract support not compiled in; build with --features tesseract".to_string(),
            ))
        }

        pub async fn run(&self, _png: Vec<u8>) -> Result<Vec<TextSpan>> {
            Err(SlipError::OcrUnavailable(
                "Tesseract support not compiled in".to_string(),
            ))
        }
    }
}

#[derive(Clone)]
pub struct TesseractBackend {
    engine: engine::Engine,
    timeout: Duration,
}

impl TesseractBackend {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let engine = engine::Engine::new(&config.languages)?;
        tracing::info!(languages = %config.languages, "Tesseract OCR initialized");
        Ok(Self {
            engine,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl RecognitionBackend for TesseractBackend {
    fn name(&self) -> &str {
        TESSERACT_ENGINE
    }

    async fn recognize(&self, image: &SlipImage) -> Result<Vec<TextSpan>> {
        match tokio::time::timeout(self.timeout, self.engine.run(image.png.clone())).await {
            Ok(result) => result,
            Err(_) => Err(SlipError::Ocr(format!(
                "OCR operation timed out after {} seconds",
                self.timeout.as_secs()
            ))),
        }
    }
}
