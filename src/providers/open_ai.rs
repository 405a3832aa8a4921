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

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, AnalyzerError> {
        let kind = ProviderKind::OpenAI;
        Ok(OpenAIProvider {
            api_key: require_api_key(kind, config)?,
            client: build_client(kind, config)?,
            base_url: base_url(kind, config),
            model: model(kind, config),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

/// One chat-completions round trip in JSON-object mode.
///
/// DeepSeek speaks the same dialect, so it goes through here as well.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn chat_completion(
    vendor: &str,
    client: &Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    temperature: f32,
    max_tokens: u32,
    menu_text: &str,
) -> Result<Vec<DishAnalysis>, AnalyzerError> {
    let request = client
        .post(format!("{}/v1/chat/completions", base_url))
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&json!({
            "model": model,
            "messages": [
                {"role": "system", "content": MENU_ANALYSIS_PROMPT},
                {"role": "user", "content": build_user_prompt(menu_text)}
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
            "response_format": {"type": "json_object"}
        }));

    let response_body = send_json(vendor, request).await?;
    let content = content_at(vendor, &response_body, "/choices/0/message/content")?;
    parse_dishes(vendor, content)
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn analyze_menu(&self, menu_text: &str) -> Result<Vec<DishAnalysis>, AnalyzerError> {
        chat_completion(
            self.provider_name(),
            &self.client,
            &self.base_url,
            &self.api_key,
            &self.model,
            self.temperature,
            self.max_tokens,
            menu_text,
        )
        .await
        .inspect_err(|e| error!("Error analyzing menu with OpenAI: {}", e))
    }
}
