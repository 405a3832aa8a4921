use crate::config::ProviderConfig;
use crate::error::AnalyzerError;
use crate::model::DishAnalysis;
use crate::providers::response::{
    base_url, build_client, content_at, model, parse_dishes, require_api_key, send_json,
};
use crate::providers::{build_user_prompt, LlmProvider, ProviderKind, MENU_ANALYSIS_PROMPT};
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde_json::json;

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, AnalyzerError> {
        let kind = ProviderKind::Anthropic;
        Ok(AnthropicProvider {
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
        let request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "system": MENU_ANALYSIS_PROMPT,
                "messages": [
                    {
                        "role": "user",
                        "content": build_user_prompt(menu_text)
                    }
                ]
            }));

        let response_body = send_json(vendor, request).await?;
        let text = content_at(vendor, &response_body, "/content/0/text")?;
        parse_dishes(vendor, text)
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn analyze_menu(&self, menu_text: &str) -> Result<Vec<DishAnalysis>, AnalyzerError> {
        self.generate(menu_text)
            .await
            .inspect_err(|e| error!("Error analyzing menu with Anthropic: {}", e))
    }
}
