//! Find the vegetarian and vegan dishes on a photographed menu.
//!
//! An image goes through OCR, the text goes to one LLM provider, and the
//! classified dishes come back grouped for display.

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod ocr;
pub mod pipeline;
pub mod providers;
pub mod render;
pub mod uniffi_bindings;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

pub use builder::{InputSource, MenuAnalyzer, MenuAnalyzerBuilder};
pub use config::{AnalyzerConfig, OcrConfig, ProviderConfig};
pub use error::AnalyzerError;
pub use model::{DietCategory, DishAnalysis, GroupedResults};
pub use ocr::{OcrEngine, OcrEngineKind};
pub use pipeline::{
    AnalysisEvent, AnalysisState, AnalysisStatus, ImagePreview, MenuPipeline, RunOutcome,
    SelectedImage,
};
pub use providers::{LlmProvider, ProviderFactory, ProviderKind};

/// Analyze a menu photo with the configured OCR engine and the given
/// provider, or the configured default.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let image = std::fs::read("menu.jpg")?;
/// let dishes = menu_analyzer::analyze_menu_image(&image, None).await?;
/// # Ok(())
/// # }
/// ```
pub async fn analyze_menu_image(
    image: &[u8],
    provider: Option<ProviderKind>,
) -> Result<Vec<DishAnalysis>, AnalyzerError> {
    let mut builder = MenuAnalyzer::builder().image_bytes(image);
    if let Some(provider) = provider {
        builder = builder.provider(provider);
    }
    builder.build().await
}

/// Classify already extracted menu text
pub async fn analyze_menu_text(
    text: &str,
    provider: Option<ProviderKind>,
) -> Result<Vec<DishAnalysis>, AnalyzerError> {
    let mut builder = MenuAnalyzer::builder().text(text);
    if let Some(provider) = provider {
        builder = builder.provider(provider);
    }
    builder.build().await
}
