use std::time::Duration;

/// Engine identity reported when every recognition backend failed.
pub const NO_ENGINE: &str = "none";

/// One piece of recognised text with the backend's confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub confidence: f64,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Result of running the recognizer over one image.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionOutcome {
    pub text: String,
    pub confidence: f64,
    pub engine: String,
    pub elapsed: Duration,
}

impl RecognitionOutcome {
    /// Builds an outcome from backend spans: text joined line by line,
    /// confidence is the mean span confidence (0.0 without spans).
    pub fn from_spans(engine: &str, spans: &[TextSpan], elapsed: Duration) -> Self {
        let text = spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let confidence = if spans.is_empty() {
            0.0
        } else {
            let sum: f64 = spans.iter().map(|s| s.confidence).sum();
            (sum / spans.len() as f64).clamp(0.0, 1.0)
        };

        Self {
            text,
            confidence,
            engine: engine.to_string(),
            elapsed,
        }
    }

    /// Sentinel returned when no backend produced a result.
    pub fn exhausted(elapsed: Duration) -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            engine: NO_ENGINE.to_string(),
            elapsed,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.engine == NO_ENGINE
    }
}
