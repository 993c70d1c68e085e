use thiserror::Error;

#[derive(Error, Debug)]
pub enum RxError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("OCR operation timed out after {secs} seconds")]
    OcrTimeout { secs: u64 },

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, RxError>;
