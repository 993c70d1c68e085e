use async_trait::async_trait;
use thiserror::Error;

use crate::models::RawText;

use super::PreprocessedImage;

/// Why an OCR call could not produce text.
///
/// Callers treat every variant exactly like "no text extracted"; the engine's
/// own error type never crosses this boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OcrFailure {
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    #[error("OCR engine error: {0}")]
    Engine(String),

    #[error("OCR timed out after {secs} seconds")]
    TimedOut { secs: u64 },
}

/// Image-to-text capability used by the prescription pipeline.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text in an already preprocessed image.
    ///
    /// An image with no legible characters yields `Ok` with an empty
    /// [`RawText`]. No retries are attempted.
    async fn recognize(&self, image: &PreprocessedImage) -> Result<RawText, OcrFailure>;

    fn is_available(&self) -> bool;

    /// Short label for logs and health output, e.g. `"tesseract"`.
    fn engine_name(&self) -> &str;
}
