//! OCR (Optical Character Recognition) Module
//!
//! Turns a photographed prescription into raw text in two steps:
//! - `preprocess_image` normalizes any decodable raster to a binarized
//!   grayscale PNG (global threshold, 150 by default)
//! - `OcrProvider` hands that PNG to an engine and returns the text
//!
//! # Backends
//!
//! `OcrConfig.model` selects the engine:
//! - `local/tesseract` (default): Tesseract via leptess, run on the blocking pool
//! - `openai/<model>`: an OpenAI-compatible vision endpoint
//!
//! A backend that cannot be initialized degrades to "unavailable" instead of
//! failing startup. Every call is bounded by `timeout_secs`.
//!
//! The pipeline only sees the [`TextRecognizer`] trait, whose failures are
//! the engine-agnostic [`OcrFailure`].
//!
//! # Usage
//!
//! ```rust,ignore
//! let ocr = OcrProvider::new(&config.ocr)?;
//! let image = preprocess_image(&bytes, &config.ocr)?;
//! let text = ocr.recognize(&image).await;
//! ```

mod api;
mod preprocessing;
mod provider;
mod recognizer;

pub use api::OpenAiVisionClient;
pub use preprocessing::{
    binarize, detect_image_format, preprocess_image, PreprocessedImage, UploadFormat,
};
pub use provider::OcrProvider;
pub use recognizer::{OcrFailure, TextRecognizer};
