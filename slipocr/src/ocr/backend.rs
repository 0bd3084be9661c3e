use async_trait::async_trait;

use crate::error::Result;
use crate::models::TextSpan;

/// Normalised slip image handed to recognition backends.
///
/// Always PNG encoded, whichever format was uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlipImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl SlipImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// A recognition engine able to turn a slip image into text spans.
///
/// Returning zero spans is a valid result. Errors mean the engine itself
/// failed and the recognizer should move on to the next one.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn recognize(&self, image: &SlipImage) -> Result<Vec<TextSpan>>;
}
