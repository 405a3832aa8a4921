//! UniFFI bindings for menu-analyzer
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! It wraps the async Rust API with synchronous functions that manage their own tokio runtime.

use std::fmt;
use std::time::Duration;

use crate::{AnalyzerConfig, AnalyzerError, DishAnalysis, GroupedResults, ProviderKind};

/// FFI-compatible dish classification
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiDishAnalysis {
    pub name: String,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    /// Percentage, nominally 0-100
    pub confidence: f64,
    pub reasoning: String,
    pub ingredients: Vec<String>,
}

impl From<DishAnalysis> for FfiDishAnalysis {
    fn from(dish: DishAnalysis) -> Self {
        FfiDishAnalysis {
            name: dish.name,
            is_vegetarian: dish.is_vegetarian,
            is_vegan: dish.is_vegan,
            confidence: dish.confidence,
            reasoning: dish.reasoning,
            ingredients: dish.ingredients,
        }
    }
}

impl From<FfiDishAnalysis> for DishAnalysis {
    fn from(ffi: FfiDishAnalysis) -> Self {
        DishAnalysis {
            name: ffi.name,
            is_vegetarian: ffi.is_vegetarian,
            is_vegan: ffi.is_vegan,
            confidence: ffi.confidence,
            reasoning: ffi.reasoning,
            ingredients: ffi.ingredients,
        }
    }
}

/// Dishes split into display sections, each sorted by descending confidence
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiGroupedResults {
    pub vegan: Vec<FfiDishAnalysis>,
    pub vegetarian: Vec<FfiDishAnalysis>,
    pub non_vegetarian: Vec<FfiDishAnalysis>,
}

impl From<GroupedResults> for FfiGroupedResults {
    fn from(grouped: GroupedResults) -> Self {
        FfiGroupedResults {
            vegan: grouped.vegan.into_iter().map(Into::into).collect(),
            vegetarian: grouped.vegetarian.into_iter().map(Into::into).collect(),
            non_vegetarian: grouped.non_vegetarian.into_iter().map(Into::into).collect(),
        }
    }
}

/// FFI-compatible LLM provider enum
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiProvider {
    DeepSeek,
    OpenAI,
    Gemini,
    Qwen,
    Anthropic,
}

impl From<FfiProvider> for ProviderKind {
    fn from(provider: FfiProvider) -> Self {
        match provider {
            FfiProvider::DeepSeek => ProviderKind::DeepSeek,
            FfiProvider::OpenAI => ProviderKind::OpenAI,
            FfiProvider::Gemini => ProviderKind::Gemini,
            FfiProvider::Qwen => ProviderKind::Qwen,
            FfiProvider::Anthropic => ProviderKind::Anthropic,
        }
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiAnalyzerError {
    /// OCR failed, the image was unusable, or no text was found
    ExtractionError { message: String },
    /// Missing credential, disabled or unknown provider, bad config file
    ConfigError { message: String },
    /// Network failure or non-success status from a vendor
    TransportError { message: String },
    /// Vendor response did not contain a usable dishes array
    SchemaError { message: String },
    /// Invalid input provided
    InvalidInput { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiAnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiAnalyzerError::ExtractionError { message } => {
                write!(f, "Extraction error: {}", message)
            }
            FfiAnalyzerError::ConfigError { message } => write!(f, "Config error: {}", message),
            FfiAnalyzerError::TransportError { message } => {
                write!(f, "Transport error: {}", message)
            }
            FfiAnalyzerError::SchemaError { message } => write!(f, "Schema error: {}", message),
            FfiAnalyzerError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            FfiAnalyzerError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiAnalyzerError {}

impl From<AnalyzerError> for FfiAnalyzerError {
    fn from(err: AnalyzerError) -> Self {
        let message = err.to_string();
        match err {
            AnalyzerError::NoTextExtracted
            | AnalyzerError::OcrFailed { .. }
            | AnalyzerError::InvalidImage(_)
            | AnalyzerError::Io(_) => FfiAnalyzerError::ExtractionError { message },
            AnalyzerError::Configuration { .. }
            | AnalyzerError::UnsupportedProvider(_)
            | AnalyzerError::ConfigError(_) => FfiAnalyzerError::ConfigError { message },
            AnalyzerError::Transport { .. } | AnalyzerError::Api { .. } => {
                FfiAnalyzerError::TransportError { message }
            }
            AnalyzerError::Schema { .. } => FfiAnalyzerError::SchemaError { message },
            AnalyzerError::BuilderError(_) => FfiAnalyzerError::InvalidInput { message },
        }
    }
}

/// Configuration for analyzing a menu
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiAnalyzeConfig {
    /// Optional LLM provider (uses default if not specified)
    pub provider: Option<FfiProvider>,
    /// Optional API key (uses environment variable if not specified)
    pub api_key: Option<String>,
    /// Optional model name (uses provider default if not specified)
    pub model: Option<String>,
    /// Optional timeout in seconds (uses default if not specified)
    pub timeout_seconds: Option<u64>,
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiAnalyzerError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiAnalyzerError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

fn configured_builder(
    builder: crate::MenuAnalyzerBuilder,
    config: Option<FfiAnalyzeConfig>,
) -> crate::MenuAnalyzerBuilder {
    let config = config.unwrap_or_default();
    let mut builder = builder;

    if let Some(provider) = config.provider {
        builder = builder.provider(provider.into());
    }

    if let Some(api_key) = config.api_key {
        builder = builder.api_key(api_key);
    }

    if let Some(model) = config.model {
        builder = builder.model(model);
    }

    if let Some(timeout_secs) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }

    builder
}

/// Analyze a menu photo
///
/// # Arguments
/// * `image` - Raw JPEG or PNG bytes; HEIC is refused with `InvalidImage`
/// * `config` - Optional configuration for the analysis
///
/// # Returns
/// The classified dishes grouped into vegan, vegetarian and non-vegetarian
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn analyze_menu_image(
    image: Vec<u8>,
    config: Option<FfiAnalyzeConfig>,
) -> Result<FfiGroupedResults, FfiAnalyzerError> {
    let rt = create_runtime()?;
    rt.block_on(async {
        let builder = configured_builder(crate::MenuAnalyzer::builder().image_bytes(image), config);
        let dishes = builder.build().await?;
        Ok(GroupedResults::from_dishes(&dishes).into())
    })
}

/// Classify menu text that was already extracted
///
/// # Arguments
/// * `text` - The menu text
/// * `config` - Optional configuration for the analysis
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn analyze_menu_text(
    text: String,
    config: Option<FfiAnalyzeConfig>,
) -> Result<FfiGroupedResults, FfiAnalyzerError> {
    if text.trim().is_empty() {
        return Err(FfiAnalyzerError::InvalidInput {
            message: "Menu text cannot be empty".to_string(),
        });
    }

    let rt = create_runtime()?;
    rt.block_on(async {
        let builder = configured_builder(crate::MenuAnalyzer::builder().text(text), config);
        let dishes = builder.build().await?;
        Ok(GroupedResults::from_dishes(&dishes).into())
    })
}

/// Group dishes for display without calling any provider
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn group_dishes(dishes: Vec<FfiDishAnalysis>) -> FfiGroupedResults {
    let dishes: Vec<DishAnalysis> = dishes.into_iter().map(Into::into).collect();
    GroupedResults::from_dishes(&dishes).into()
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check if a provider is available (enabled and has an API key from
/// config.toml or its environment variable)
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn is_provider_available(provider: FfiProvider) -> bool {
    match AnalyzerConfig::load() {
        Ok(config) => provider_available(&config, provider.into()),
        Err(_) => false,
    }
}

fn provider_available(config: &AnalyzerConfig, kind: ProviderKind) -> bool {
    let provider = config.provider_config(kind);
    provider.enabled
        && provider
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
}
