use crate::config::ProviderConfig;
use crate::error::AnalyzerError;
use crate::model::DishAnalysis;
use crate::providers::open_ai::chat_completion;
use crate::providers::response::{base_url, build_client, model, require_api_key};
use crate::providers::{LlmProvider, ProviderKind};
use async_trait::async_trait;
use log::error;
use reqwest::Client;

/// DeepSeek exposes an OpenAI-compatible chat completions API.
pub struct DeepSeekProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl DeepSeekProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, AnalyzerError> {
        let kind = ProviderKind::DeepSeek;
        Ok(DeepSeekProvider {
            api_key: require_api_key(kind, config)?,
            client: build_client(kind, config)?,
            base_url: base_url(kind, config),
            model: model(kind, config),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for DeepSeekProvider {
    fn provider_name(&self) -> &str {
        "deepseek"
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
        .inspect_err(|e| error!("Error analyzing menu with Deepseek: {}", e))
    }
}
