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

/// Alibaba Qwen through the DashScope text-generation API.
pub struct QwenProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl QwenProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, AnalyzerError> {
        let kind = ProviderKind::Qwen;
        Ok(QwenProvider {
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
            .post(format!(
                "{}/api/v1/services/aigc/text-generation/generation",
                self.base_url
            ))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "input": {
                    "messages": [
                        {"role": "system", "content": MENU_ANALYSIS_PROMPT},
                        {"role": "user", "content": build_user_prompt(menu_text)}
                    ]
                },
                "parameters": {
                    "result_format": "message",
                    "response_format": {"type": "json_object"},
                    "temperature": self.temperature,
                    "top_p": 0.8,
                    "max_tokens": self.max_tokens
                }
            }));

        let response_body = send_json(vendor, request).await?;
        let content = output_text(&response_body).ok_or_else(|| {
            AnalyzerError::schema(vendor, "missing output text in DashScope response")
        })?;
        parse_dishes(vendor, content)
    }
}

/// DashScope answers in `output.choices[0].message.content` for the
/// message result format and in `output.text` for the legacy one.
fn output_text(body: &Value) -> Option<&str> {
    body.pointer("/output/choices/0/message/content")
        .and_then(Value::as_str)
        .or_else(|| body.pointer("/output/text").and_then(Value::as_str))
}

#[async_trait]
impl LlmProvider for QwenProvider {
    fn provider_name(&self) -> &str {
        "qwen"
    }

    async fn analyze_menu(&self, menu_text: &str) -> Result<Vec<DishAnalysis>, AnalyzerError> {
        self.generate(menu_text)
            .await
            .inspect_err(|e| error!("Error analyzing menu with Qwen: {}", e))
    }
}
