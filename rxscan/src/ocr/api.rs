use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{parse_ocr_provider_model, OcrConfig};
use crate::error::{Result, RxError};

const DEFAULT_VISION_MODEL: &str = "gpt-4o";
const CLIENT_TIMEOUT_MARGIN_SECS: u64 = 5;

const TRANSCRIBE_PROMPT: &str = "Transcribe all text in this prescription image exactly as written, \
preserving line breaks. Return only the transcribed text without any explanations or formatting.";

/// OCR through an OpenAI-compatible vision chat-completions endpoint.
///
/// A single request is made per call. Retry policy belongs to the caller.
#[derive(Clone, Debug)]
pub struct OpenAiVisionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiVisionClient {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RxError::Ocr("API key required for OpenAI Vision".to_string()))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string())
            .trim_end_matches('/')
            .to_string();

        let (_, model) = parse_ocr_provider_model(&config.model);
        let model = if model.is_empty() {
            DEFAULT_VISION_MODEL.to_string()
        } else {
            model.to_string()
        };

        // Must stay above `timeout_secs` so the provider's timer fires first.
        let client = Client::builder()
            .timeout(Duration::from_secs(
                config.timeout_secs.saturating_add(CLIENT_TIMEOUT_MARGIN_SECS),
            ))
            .build()
            .map_err(|e| RxError::Ocr(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn ocr(&self, png_bytes: &[u8]) -> Result<String> {
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: TRANSCRIBE_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: 4096,
            temperature: 0.0,
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| RxError::Ocr(format!("Vision API request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RxError::Ocr(format!(
                "Vision API request failed: {status} - {body}"
            )));
        }

        let chat_response: ChatResponse = resp
            .json()
            .await
            .map_err(|e| RxError::Ocr(format!("Failed to parse response: {e}")))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| RxError::Ocr("No choices in vision API response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> OcrConfig {
        OcrConfig {
            model: "openai/gpt-4o-mini".to_string(),
            ..OcrConfig::default()
        }
    }

    #[test]
    fn test_openai_client_requires_api_key() {
        let result = OpenAiVisionClient::new(&create_test_config());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key required"));
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        let config = OcrConfig {
            api_key: Some("   ".to_string()),
            ..create_test_config()
        };
        assert!(OpenAiVisionClient::new(&config).is_err());
    }

    #[test]
    fn test_model_taken_from_config() {
        let config = OcrConfig {
            api_key: Some("test-key".to_string()),
            ..create_test_config()
        };
        let client = OpenAiVisionClient::new(&config).unwrap();
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = OcrConfig {
            api_key: Some("test-key".to_string()),
            base_url: Some("http://localhost:9999/v1/".to_string()),
            ..create_test_config()
        };
        let client = OpenAiVisionClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn test_request_serializes_image_part() {
        let request = ChatRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: "data:image/png;base64,AAAA".to_string(),
                    },
                }],
            }],
            max_tokens: 16,
            temperature: 0.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"][0]["type"], "image_url");
        assert_eq!(
            json["messages"][0]["content"][0]["image_url"]["url"],
            "data:image/png;base64,AAAA"
        );
    }
}
