use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leptess::LepTess;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{parse_ocr_provider_model, OcrConfig};
use crate::error::{Result, RxError};
use crate::models::RawText;

use super::api::OpenAiVisionClient;
use super::recognizer::{OcrFailure, TextRecognizer};
use super::PreprocessedImage;

enum OcrBackend {
    Local { tesseract: Arc<Mutex<LepTess>> },
    Api { client: OpenAiVisionClient },
    Unavailable { reason: String },
}

pub struct OcrProvider {
    backend: OcrBackend,
    config: OcrConfig,
}

fn create_tesseract(languages: &str) -> std::result::Result<LepTess, String> {
    LepTess::new(None, languages).map_err(|e| e.to_string())
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let (provider, _) = parse_ocr_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => match OpenAiVisionClient::new(config) {
                Ok(client) => {
                    info!(model = client.model(), "OpenAI Vision OCR backend initialized");
                    OcrBackend::Api { client }
                }
                Err(e) => {
                    let reason = format!("OpenAI Vision OCR backend unavailable: {e}");
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            },
            _ => match create_tesseract(&config.languages) {
                Ok(lt) => {
                    info!(languages = %config.languages, "Tesseract OCR initialized");
                    OcrBackend::Local {
                        tesseract: Arc::new(Mutex::new(lt)),
                    }
                }
                Err(e) => {
                    let reason = format!("Tesseract not available: {e}");
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            },
        };

        Ok(Self {
            backend,
            config: config.clone(),
        })
    }

    /// A provider that refuses every call. Used when no engine is wanted
    /// and in tests.
    pub fn unavailable(reason: impl Into<String>, config: &OcrConfig) -> Self {
        Self {
            backend: OcrBackend::Unavailable {
                reason: reason.into(),
            },
            config: config.clone(),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.backend {
            OcrBackend::Unavailable { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn engine_label(&self) -> &str {
        match &self.backend {
            OcrBackend::Local { .. } => "tesseract",
            OcrBackend::Api { .. } => "openai-vision",
            OcrBackend::Unavailable { .. } => "unavailable",
        }
    }

    /// Run OCR on PNG bytes, bounded by `timeout_secs`.
    ///
    /// A local Tesseract call cannot be interrupted once started; on timeout
    /// the caller stops waiting and the blocking worker finishes on its own.
    pub async fn ocr(&self, png_bytes: &[u8]) -> Result<String> {
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);

        match tokio::time::timeout(timeout_duration, self.ocr_internal(png_bytes)).await {
            Ok(inner_result) => inner_result,
            Err(_) => Err(RxError::OcrTimeout {
                secs: self.config.timeout_secs,
            }),
        }
    }

    async fn ocr_internal(&self, png_bytes: &[u8]) -> Result<String> {
        match &self.backend {
            OcrBackend::Local { tesseract } => {
                let bytes = png_bytes.to_vec();
                let tesseract = Arc::clone(tesseract);

                let text = tokio::task::spawn_blocking(move || {
                    let mut lt = tesseract.blocking_lock();
                    lt.set_image_from_mem(&bytes)
                        .map_err(|e| RxError::Ocr(format!("Failed to set image: {e}")))?;
                    lt.get_utf8_text()
                        .map_err(|e| RxError::Ocr(format!("Failed to extract text: {e}")))
                })
                .await
                .map_err(|e| RxError::Ocr(format!("OCR task panicked: {e}")))??;

                Ok(text.trim().to_string())
            }
            OcrBackend::Api { client } => Ok(client.ocr(png_bytes).await?.trim().to_string()),
            OcrBackend::Unavailable { reason } => Err(RxError::OcrUnavailable(reason.clone())),
        }
    }
}

#[async_trait]
impl TextRecognizer for OcrProvider {
    async fn recognize(
        &self,
        image: &PreprocessedImage,
    ) -> std::result::Result<RawText, OcrFailure> {
        match self.ocr(image.png_bytes()).await {
            Ok(text) => Ok(RawText::new(text)),
            Err(RxError::OcrUnavailable(reason)) => Err(OcrFailure::Unavailable(reason)),
            Err(RxError::OcrTimeout { secs }) => Err(OcrFailure::TimedOut { secs }),
            Err(other) => Err(OcrFailure::Engine(other.to_string())),
        }
    }

    fn is_available(&self) -> bool {
        OcrProvider::is_available(self)
    }

    fn engine_name(&self) -> &str {
        self.engine_label()
    }
}

impl Clone for OcrProvider {
    fn clone(&self) -> Self {
        let backend = match &self.backend {
            OcrBackend::Local { tesseract } => OcrBackend::Local {
                tesseract: Arc::clone(tesseract),
            },
            OcrBackend::Api { client } => OcrBackend::Api {
                client: client.clone(),
            },
            OcrBackend::Unavailable { reason } => OcrBackend::Unavailable {
                reason: reason.clone(),
            },
        };
        Self {
            backend,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::preprocess_image;
    use image::{DynamicImage, ImageFormat};

    fn make_config(model: &str, api_key: Option<&str>) -> OcrConfig {
        OcrConfig {
            model: model.to_string(),
            api_key: api_key.map(String::from),
            ..OcrConfig::default()
        }
    }

    fn blank_preprocessed() -> PreprocessedImage {
        let mut png = Vec::new();
        DynamicImage::new_rgb8(100, 100)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        preprocess_image(&png, &OcrConfig::default()).unwrap()
    }

    #[test]
    fn test_ocr_provider_graceful_degradation() {
        let result = OcrProvider::new(&make_config("local/tesseract", None));
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_ocr_unavailable_returns_error() {
        let provider = OcrProvider::unavailable("Test unavailable", &OcrConfig::default());

        let result = provider.ocr(&[]).await;
        assert!(matches!(result, Err(RxError::OcrUnavailable(_))));
    }

    #[tokio::test]
    async fn test_recognize_maps_unavailable_to_failure() {
        let provider = OcrProvider::unavailable("no engine", &OcrConfig::default());

        let result = provider.recognize(&blank_preprocessed()).await;
        assert_eq!(
            result,
            Err(OcrFailure::Unavailable("no engine".to_string()))
        );
    }

    #[test]
    fn test_openai_model_without_api_key_falls_back_to_unavailable() {
        let provider = OcrProvider::new(&make_config("openai/gpt-4o", None)).unwrap();
        assert!(!provider.is_available());
        assert!(provider
            .unavailable_reason()
            .unwrap()
            .contains("API key required"));
        assert_eq!(provider.engine_label(), "unavailable");
    }

    #[test]
    fn test_openai_model_with_api_key_routes_to_api() {
        let provider = OcrProvider::new(&make_config("openai/gpt-4o", Some("k"))).unwrap();
        assert!(provider.is_available());
        assert_eq!(provider.engine_label(), "openai-vision");
    }

    #[test]
    fn test_api_backed_ocr_provider_clone() {
        let provider = OcrProvider::new(&make_config("openai/gpt-4o", Some("k"))).unwrap();
        let cloned = provider.clone();
        assert_eq!(provider.is_available(), cloned.is_available());
        assert_eq!(provider.engine_label(), cloned.engine_label());
    }
}
