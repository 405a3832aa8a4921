use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::time::Duration;

use crate::ocr::OcrEngineKind;
use crate::providers::ProviderKind;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyzerConfig {
    /// Provider to use when none is specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider id to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Text recognition settings
    #[serde(default)]
    pub ocr: OcrConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific LLM provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider may be constructed
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier; the vendor default is used when unset
    pub model: Option<String>,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Base URL for the API (for proxies or compatible endpoints)
    pub base_url: Option<String>,
    /// Request timeout, overrides the global timeout. Whole seconds in
    /// config files; the builder may set sub-second values.
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub timeout: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
            timeout: None,
        }
    }
}

impl ProviderConfig {
    /// Convenience constructor used by the builder and FFI layer
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }
}

/// Configuration for the OCR adapter
#[derive(Debug, Deserialize, Clone)]
pub struct OcrConfig {
    /// Which engine recognizes text
    #[serde(default)]
    pub engine: OcrEngineKind,
    /// Tesseract language code
    #[serde(default = "default_language")]
    pub language: String,
    /// Path or name of the tesseract executable
    #[serde(default = "default_tesseract_binary")]
    pub binary: String,
    /// Google Cloud Vision API key
    pub api_key: Option<String>,
    /// Base URL override for Google Cloud Vision
    pub base_url: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::default(),
            language: default_language(),
            binary: default_tesseract_binary(),
            api_key: None,
            base_url: None,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            ocr: OcrConfig::default(),
            timeout: default_timeout(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    ProviderKind::DeepSeek.as_str().to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_tesseract_binary() -> String {
    "tesseract".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}

/// Environment variable holding the Google Cloud Vision key
pub const GOOGLE_VISION_API_KEY_ENV: &str = "GOOGLE_API_KEY";

impl AnalyzerConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with MENU_ANALYZER__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Vendor API keys (DEEPSEEK_API_KEY, OPENAI_API_KEY, ...) are read once
    /// here and never again by the providers.
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Settings for one provider, falling back to defaults when it has no
    /// entry. The global timeout applies unless the entry sets its own.
    pub fn provider_config(&self, kind: ProviderKind) -> ProviderConfig {
        let mut config = self
            .providers
            .get(kind.as_str())
            .cloned()
            .unwrap_or_default();
        if config.timeout.is_none() {
            config.timeout = Some(Duration::from_secs(self.timeout));
        }
        config
    }

    /// The configured default provider, validated against the supported set
    pub fn default_provider_kind(&self) -> Result<ProviderKind, crate::AnalyzerError> {
        self.default_provider.parse()
    }

    /// Fill missing credentials from per-vendor variables.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn resolve_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for kind in ProviderKind::ALL {
            let has_key = self
                .providers
                .get(kind.as_str())
                .is_some_and(|p| p.api_key.is_some());
            if has_key {
                continue;
            }
            if let Some(key) = lookup(kind.api_key_env()).filter(|k| !k.trim().is_empty()) {
                self.providers
                    .entry(kind.as_str().to_string())
                    .or_default()
                    .api_key = Some(key);
            }
        }

        if self.ocr.api_key.is_none() {
            self.ocr.api_key = lookup(GOOGLE_VISION_API_KEY_ENV).filter(|k| !k.trim().is_empty());
        }
    }
}

/// Load configuration from file and environment variables
///
/// Environment variable format: MENU_ANALYZER__PROVIDERS__DEEPSEEK__MODEL
pub fn load_config() -> Result<AnalyzerConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: MENU_ANALYZER__OCR__ENGINE
        .add_source(
            Environment::with_prefix("MENU_ANALYZER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: AnalyzerConfig = settings.try_deserialize()?;
    config.resolve_credentials(|name| std::env::var(name).ok());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(default_provider(), "deepseek");
        assert_eq!(default_temperature(), 0.5);
        assert_eq!(default_max_tokens(), 4000);
        assert_eq!(default_timeout(), 60);
        assert_eq!(default_language(), "eng");
    }

    #[test]
    fn test_provider_config_falls_back_to_defaults() {
        let config = AnalyzerConfig {
            timeout: 12,
            ..Default::default()
        };

        let provider = config.provider_config(ProviderKind::Gemini);
        assert!(provider.enabled);
        assert!(provider.api_key.is_none());
        assert!(provider.model.is_none());
        assert_eq!(provider.timeout, Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_provider_timeout_override_wins() {
        let mut config = AnalyzerConfig::default();
        config.providers.insert(
            "qwen".to_string(),
            ProviderConfig {
                timeout: Some(Duration::from_millis(5500)),
                ..Default::default()
            },
        );

        assert_eq!(
            config.provider_config(ProviderKind::Qwen).timeout,
            Some(Duration::from_millis(5500))
        );
    }

    #[test]
    fn test_resolve_credentials_from_lookup() {
        let mut config = AnalyzerConfig::default();
        config.resolve_credentials(|name| match name {
            "DEEPSEEK_API_KEY" => Some("ds-key".to_string()),
            "GOOGLE_API_KEY" => Some("vision-key".to_string()),
            "OPENAI_API_KEY" => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(
            config.provider_config(ProviderKind::DeepSeek).api_key.as_deref(),
            Some("ds-key")
        );
        assert!(config.provider_config(ProviderKind::OpenAI).api_key.is_none());
        assert!(config.provider_config(ProviderKind::Anthropic).api_key.is_none());
        assert_eq!(config.ocr.api_key.as_deref(), Some("vision-key"));
    }

    #[test]
    fn test_resolve_credentials_keeps_explicit_key() {
        let mut config = AnalyzerConfig::default();
        config.providers.insert(
            "openai".to_string(),
            ProviderConfig::with_api_key("from-file"),
        );
        config.resolve_credentials(|_| Some("from-env".to_string()));

        assert_eq!(
            config.provider_config(ProviderKind::OpenAI).api_key.as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_default_provider_kind() {
        let mut config = AnalyzerConfig::default();
        assert_eq!(config.default_provider_kind().unwrap(), ProviderKind::DeepSeek);

        config.default_provider = "mistral".to_string();
        assert!(config.default_provider_kind().is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            default_provider = "gemini"
            timeout = 20

            [providers.gemini]
            model = "gemini-1.5-flash"
            api_key = "g-key"
            timeout = 7

            [ocr]
            engine = "google_vision"
        "#;

        let config: AnalyzerConfig = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.timeout, 20);
        let gemini = config.provider_config(ProviderKind::Gemini);
        assert_eq!(gemini.model.as_deref(), Some("gemini-1.5-flash"));
        assert_eq!(gemini.temperature, 0.5);
        assert_eq!(gemini.timeout, Some(Duration::from_secs(7)));
        assert_eq!(config.ocr.engine, OcrEngineKind::GoogleVision);
        assert_eq!(config.ocr.language, "eng");
    }
}
