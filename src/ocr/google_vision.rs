use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use super::OcrEngine;
use crate::config::{OcrConfig, GOOGLE_VISION_API_KEY_ENV};
use crate::error::AnalyzerError;

const ENGINE: &str = "google_vision";

/// Google Cloud Vision `TEXT_DETECTION`
pub struct GoogleVisionEngine {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleVisionEngine {
    pub fn new(config: &OcrConfig, timeout: Duration) -> Result<Self, AnalyzerError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AnalyzerError::configuration(
                    ENGINE,
                    format!(
                        "{} not found in config or environment",
                        GOOGLE_VISION_API_KEY_ENV
                    ),
                )
            })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalyzerError::configuration(ENGINE, e.to_string()))?;

        Ok(GoogleVisionEngine {
            client,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://vision.googleapis.com".to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[async_trait]
impl OcrEngine for GoogleVisionEngine {
    fn engine_name(&self) -> &str {
        ENGINE
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, AnalyzerError> {
        let request_body = json!({
            "requests": [{
                "image": {
                    "content": STANDARD.encode(image)
                },
                "features": [{
                    "type": "TEXT_DETECTION"
                }],
                "imageContext": {
                    "languageHints": ["en"]
                }
            }]
        });

        debug!("Sending OCR request to Google Vision API");

        let response = self
            .client
            .post(format!("{}/v1/images:annotate", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AnalyzerError::ocr(ENGINE, e.to_string()))?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::ocr(
                ENGINE,
                format!("Google Vision API error ({}): {}", status, error_text),
            ));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| AnalyzerError::ocr(ENGINE, e.to_string()))?;
        debug!("Google Vision API response: {:?}", response_body);

        if let Some(message) = response_body["responses"][0]["error"]["message"].as_str() {
            return Err(AnalyzerError::ocr(ENGINE, message));
        }

        // No fullTextAnnotation means nothing was detected; the adapter
        // turns the empty string into NoTextExtracted.
        Ok(response_body["responses"][0]["fullTextAnnotation"]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}
