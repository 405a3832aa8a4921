use crate::config::ProviderConfig;
use crate::error::AnalyzerError;
use crate::model::DishAnalysis;
use crate::providers::response::{
    base_url, build_client, model, parse_dishes, require_api_key, send_json,
};
use crate::providers::{build_user_prompt, LlmProvider, ProviderKind, MENU_ANALYSIS_PROMPT};
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde_json::{json, Value};

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, AnalyzerError> {
        let kind = ProviderKind::Gemini;
        Ok(GeminiProvider {
            api_key: require_api_key(kind, config)?,
            client: build_client(kind, config)?,
            base_url: base_url(kind, config),
            model: model(kind, config),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    async fn generate(&self, menu_text: &str) -> Result<Vec<DishAnalysis>, AnalyzerError> {
        let vendor = self.provider_name();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        // No JSON mode on older Gemini models; fences are stripped when parsing
        let request = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({
                "contents": [{
                    "parts": [{
                        "text": format!("{}\n\n{}", MENU_ANALYSIS_PROMPT, build_user_prompt(menu_text))
                    }]
                }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "maxOutputTokens": self.max_tokens
                }
            }));

        let response_body = send_json(vendor, request).await?;
        let text = candidate_text(&response_body).ok_or_else(|| {
            AnalyzerError::schema(vendor, "missing text parts in /candidates/0/content/parts")
        })?;
        parse_dishes(vendor, &text)
    }
}

/// Long answers can arrive split over several parts of the first candidate
fn candidate_text(body: &Value) -> Option<String> {
    let parts: Vec<&str> = body
        .pointer("/candidates/0/content/parts")?
        .as_array()?
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.concat())
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    async fn analyze_menu(&self, menu_text: &str) -> Result<Vec<DishAnalysis>, AnalyzerError> {
        self.generate(menu_text)
            .await
            .inspect_err(|e| error!("Error analyzing menu with Gemini: {}", e))
    }
}
