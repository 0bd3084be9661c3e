use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::backend::{RecognitionBackend, SlipImage};
use crate::config::OcrConfig;
use crate::error::{Result, SlipError};
use crate::models::TextSpan;

/// OCR engine reached over HTTP, e.g. a PaddleOCR or EasyOCR server.
///
/// The server receives the PNG as base64 and answers with recognised lines:
/// `{"results": [{"text": "...", "confidence": 0.93}]}`.
#[derive(Clone, Debug)]
pub struct RemoteOcrBackend {
    name: String,
    client: Client,
    url: String,
    languages: String,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    image: String,
    languages: &'a str,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognizedLine>,
}

#[derive(Debug, Deserialize)]
struct RecognizedLine {
    text: String,
    #[serde(default)]
    confidence: f64,
}

impl RemoteOcrBackend {
    pub fn new(name: &str, url: &str, config: &OcrConfig) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(SlipError::OcrUnavailable(format!(
                "No URL configured for remote OCR engine '{name}'"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SlipError::Ocr(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            client,
            url: url.trim_end_matches('/').to_string(),
            languages: config.languages.clone(),
            max_retries: config.max_retries.max(1),
        })
    }

    async fn make_request(&self, request: &RecognizeRequest<'_>) -> Result<RecognizeResponse> {
        let mut retries = 0;

        loop {
            let response = self
                .client
                .post(&self.url)
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    if resp.status().is_success() {
                        return resp.json().await.map_err(|e| {
                            SlipError::Ocr(format!("Failed to parse response: {e}"))
                        });
                    } else if resp.status().as_u16() == 429 || resp.status().is_server_error() {
                        retries += 1;
                        if retries >= self.max_retries {
                            return Err(SlipError::Ocr(format!(
                                "OCR request to {} failed after {} retries: {}",
                                self.name,
                                self.max_retries,
                                resp.status()
                            )));
                        }
                        let delay = Duration::from_millis(100 * (2_u64.pow(retries)));
                        tracing::debug!(engine = %self.name, retries, "Retrying OCR request");
                        tokio::time::sleep(delay).await;
                        continue;
                    } else {
                        let status = resp.status();
                        let body = resp.text().await.unwrap_or_default();
                        return Err(SlipError::Ocr(format!(
                            "OCR request to {} failed: {status} - {body}",
                            self.name
                        )));
                    }
                }
                Err(e) => {
                    retries += 1;
                    if retries >= self.max_retries {
                        return Err(SlipError::Ocr(format!(
                            "OCR request to {} failed after {} retries: {e}",
                            self.name, self.max_retries
                        )));
                    }
                    let delay = Duration::from_millis(100 * (2_u64.pow(retries)));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl RecognitionBackend for RemoteOcrBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn recognize(&self, image: &SlipImage) -> Result<Vec<TextSpan>> {
        let request = RecognizeRequest {
            image: STANDARD.encode(&image.png),
            languages: &self.languages,
        };

        let response = self.make_request(&request).await?;

        Ok(response
            .results
            .into_iter()
            .map(|line| TextSpan::new(line.text, line.confidence.clamp(0.0, 1.0)))
            .collect())
    }
}
