// Common test utilities for integration tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::Once;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use rxscan::config::{Config, DatabaseConfig, OcrConfig};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A light photo-like PNG with a dark band.
pub fn prescription_png() -> Vec<u8> {
    let img = RgbImage::from_fn(320, 200, |_, y| {
        if (90..110).contains(&y) {
            Rgb([40, 40, 40])
        } else {
            Rgb([235, 235, 225])
        }
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

/// Configuration pointing OCR at an OpenAI-compatible mock and storage at
/// a database file under `dir`.
pub fn test_config(dir: &Path, ocr_base_url: &str) -> Config {
    let mut config = Config::default();
    config.server.api_keys = vec!["test-key".to_string()];
    config.database = DatabaseConfig::for_url(format!("file:{}", dir.join("rxscan.db").display()));
    config.storage.enabled = true;
    config.ocr = OcrConfig {
        model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(ocr_base_url.to_string()),
        timeout_secs: 5,
        ..OcrConfig::default()
    };
    config.extraction.vocabulary_extra_path = None;
    config.extraction.name_finder_enabled = true;
    config.catalog.path = None;
    config
}

pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ]
    })
}

// Re-export commonly used crates for convenience
pub use serial_test::serial;
pub use tempfile;
pub use wiremock;
