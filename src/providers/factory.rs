use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{AnalyzerConfig, ProviderConfig};
use crate::error::AnalyzerError;
use crate::providers::{
    AnthropicProvider, DeepSeekProvider, GeminiProvider, LlmProvider, OpenAIProvider,
    QwenProvider,
};

/// The closed set of supported LLM vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    DeepSeek,
    OpenAI,
    Gemini,
    Qwen,
    Anthropic,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::DeepSeek,
        ProviderKind::OpenAI,
        ProviderKind::Gemini,
        ProviderKind::Qwen,
        ProviderKind::Anthropic,
    ];

    /// Identifier used in configuration and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Qwen => "qwen",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this vendor's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Qwen => "QWEN_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "deepseek-chat",
            ProviderKind::OpenAI => "gpt-4-turbo-preview",
            ProviderKind::Gemini => "gemini-pro",
            ProviderKind::Qwen => "qwen-max",
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::DeepSeek => "https://api.deepseek.com",
            ProviderKind::OpenAI => "https://api.openai.com",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
            ProviderKind::Qwen => "https://dashscope.aliyuncs.com",
            ProviderKind::Anthropic => "https://api.anthropic.com",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| AnalyzerError::UnsupportedProvider(s.to_string()))
    }
}

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance, validating its credential up front
    pub fn create(
        kind: ProviderKind,
        config: &ProviderConfig,
    ) -> Result<Box<dyn LlmProvider>, AnalyzerError> {
        if !config.enabled {
            return Err(AnalyzerError::configuration(
                kind.as_str(),
                "provider is not enabled in configuration",
            ));
        }

        match kind {
            ProviderKind::DeepSeek => Ok(Box::new(DeepSeekProvider::new(config)?)),
            ProviderKind::OpenAI => Ok(Box::new(OpenAIProvider::new(config)?)),
            ProviderKind::Gemini => Ok(Box::new(GeminiProvider::new(config)?)),
            ProviderKind::Qwen => Ok(Box::new(QwenProvider::new(config)?)),
            ProviderKind::Anthropic => Ok(Box::new(AnthropicProvider::new(config)?)),
        }
    }

    /// Create a provider from its symbolic name
    pub fn create_by_name(
        name: &str,
        config: &AnalyzerConfig,
    ) -> Result<Box<dyn LlmProvider>, AnalyzerError> {
        let kind: ProviderKind = name.parse()?;
        Self::create(kind, &config.provider_config(kind))
    }

    /// Get the default provider from configuration
    pub fn get_default_provider(
        config: &AnalyzerConfig,
    ) -> Result<Box<dyn LlmProvider>, AnalyzerError> {
        Self::create_by_name(&config.default_provider, config)
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        ProviderKind::ALL.iter().map(ProviderKind::as_str).collect()
    }
}
