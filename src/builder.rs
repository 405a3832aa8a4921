use std::path::PathBuf;
use std::time::Duration;

use log::info;

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::model::DishAnalysis;
use crate::ocr;
use crate::providers::{ProviderFactory, ProviderKind};

/// Where the menu comes from
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Image file on disk, OCR'd before analysis
    ImagePath(PathBuf),
    /// Image already in memory, OCR'd before analysis
    ImageBytes(Vec<u8>),
    /// Menu text that skips OCR
    Text(String),
}

/// Builder for a one-shot menu analysis
#[derive(Debug, Default)]
pub struct MenuAnalyzerBuilder {
    source: Option<InputSource>,
    provider: Option<ProviderKind>,
    timeout: Option<Duration>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    config: Option<AnalyzerConfig>,
}

impl MenuAnalyzerBuilder {
    /// Analyze the menu photo at `path`
    ///
    /// # Example
    /// ```
    /// use menu_analyzer::MenuAnalyzer;
    ///
    /// let builder = MenuAnalyzer::builder()
    ///     .image_path("/path/to/menu.jpg");
    /// ```
    pub fn image_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(InputSource::ImagePath(path.into()));
        self
    }

    /// Analyze a menu photo already held in memory
    pub fn image_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.source = Some(InputSource::ImageBytes(bytes.into()));
        self
    }

    /// Classify menu text directly, without OCR
    ///
    /// # Example
    /// ```
    /// use menu_analyzer::MenuAnalyzer;
    ///
    /// let builder = MenuAnalyzer::builder()
    ///     .text("Margherita Pizza\nChicken Tikka Masala");
    /// ```
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.source = Some(InputSource::Text(text.into()));
        self
    }

    /// Use this provider instead of the configured default
    ///
    /// # Example
    /// ```
    /// use menu_analyzer::{MenuAnalyzer, ProviderKind};
    ///
    /// let builder = MenuAnalyzer::builder()
    ///     .image_path("/path/to/menu.jpg")
    ///     .provider(ProviderKind::Gemini);
    /// ```
    pub fn provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Timeout for OCR and provider HTTP requests
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Pass the provider API key directly instead of relying on
    /// environment variables or config files
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the provider's default model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Send provider requests to a proxy or compatible endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Use this configuration instead of loading `config.toml` and the
    /// environment
    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Run OCR (for image sources) and classify the menu
    ///
    /// The provider is constructed first, so a missing credential fails
    /// before any OCR or network work.
    ///
    /// # Errors
    /// Returns `AnalyzerError` if:
    /// - No input source was specified, or the text is blank
    /// - The provider is unknown, disabled or has no API key
    /// - The image cannot be read or yields no text
    /// - The provider request or its response fails
    ///
    /// # Example
    /// ```no_run
    /// # use menu_analyzer::MenuAnalyzer;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let dishes = MenuAnalyzer::builder()
    ///     .image_path("/path/to/menu.jpg")
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<Vec<DishAnalysis>, AnalyzerError> {
        let source = self.source.ok_or_else(|| {
            AnalyzerError::BuilderError(
                "No input source specified. Use .image_path(), .image_bytes() or .text()"
                    .to_string(),
            )
        })?;

        let config = match self.config {
            Some(config) => config,
            None => AnalyzerConfig::load()?,
        };
        let kind = match self.provider {
            Some(kind) => kind,
            None => config.default_provider_kind()?,
        };

        let mut provider_config = config.provider_config(kind);
        if let Some(api_key) = self.api_key {
            provider_config.api_key = Some(api_key);
        }
        if let Some(model) = self.model {
            provider_config.model = Some(model);
        }
        if let Some(base_url) = self.base_url {
            provider_config.base_url = Some(base_url);
        }
        if let Some(timeout) = self.timeout {
            provider_config.timeout = Some(timeout);
        }

        let provider = ProviderFactory::create(kind, &provider_config)?;

        let text = match source {
            InputSource::Text(text) => {
                if text.trim().is_empty() {
                    return Err(AnalyzerError::BuilderError(
                        "Menu text cannot be empty".to_string(),
                    ));
                }
                text
            }
            InputSource::ImagePath(path) => {
                let bytes = tokio::fs::read(&path).await?;
                ocr_image(&config, self.timeout, &bytes).await?
            }
            InputSource::ImageBytes(bytes) => ocr_image(&config, self.timeout, &bytes).await?,
        };

        info!("Analyzing menu with {}", provider.provider_name());
        provider.analyze_menu(&text).await
    }
}

async fn ocr_image(
    config: &AnalyzerConfig,
    timeout: Option<Duration>,
    image: &[u8],
) -> Result<String, AnalyzerError> {
    let timeout = timeout.unwrap_or(Duration::from_secs(config.timeout));
    let engine = ocr::create_engine(&config.ocr, timeout)?;
    ocr::extract_text(engine.as_ref(), image).await
}

/// Main entry point for the builder API
pub struct MenuAnalyzer;

impl MenuAnalyzer {
    /// Creates a new builder for analyzing a menu
    ///
    /// # Example
    /// ```
    /// use menu_analyzer::MenuAnalyzer;
    ///
    /// let builder = MenuAnalyzer::builder();
    /// ```
    pub fn builder() -> MenuAnalyzerBuilder {
        MenuAnalyzerBuilder::default()
    }
}
