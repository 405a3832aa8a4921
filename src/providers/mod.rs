mod anthropic;
mod deepseek;
mod factory;
mod gemini;
mod open_ai;
mod prompt;
mod qwen;
mod response;

pub use anthropic::AnthropicProvider;
pub use deepseek::DeepSeekProvider;
pub use factory::{ProviderFactory, ProviderKind};
pub use gemini::GeminiProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_user_prompt, MENU_ANALYSIS_PROMPT, RESPONSE_SCHEMA_EXAMPLE};
pub use qwen::QwenProvider;
pub use response::{parse_dishes, strip_code_fences};

use crate::error::AnalyzerError;
use crate::model::DishAnalysis;
use async_trait::async_trait;

/// Unified trait for all LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "deepseek", "gemini")
    fn provider_name(&self) -> &str;

    /// Classify every dish found in the OCR'd menu text.
    ///
    /// Callers must not pass blank text. Makes exactly one request; the
    /// order of the returned dishes is whatever the model produced.
    async fn analyze_menu(&self, menu_text: &str) -> Result<Vec<DishAnalysis>, AnalyzerError>;
}
