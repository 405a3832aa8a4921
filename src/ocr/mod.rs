//! OCR adapter: raster image bytes in, recognized text out.
//!
//! Engines only recognize; [`extract_text`] owns the contract around them
//! (format check, blank-text rejection, logging).

mod google_vision;
mod tesseract;

pub use google_vision::GoogleVisionEngine;
pub use tesseract::TesseractEngine;

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use serde::Deserialize;

use crate::config::OcrConfig;
use crate::error::AnalyzerError;

/// A text recognition engine.
///
/// Implementations acquire whatever session or process they need inside
/// `recognize` and release it before returning, including on error or
/// when the future is dropped.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn engine_name(&self) -> &str;

    /// Whether the engine can decode this format. Neither bundled engine
    /// reads HEIC.
    fn supports(&self, format: ImageFormat) -> bool {
        format != ImageFormat::Heic
    }

    /// Recognize text in the image. May return an empty string.
    async fn recognize(&self, image: &[u8]) -> Result<String, AnalyzerError>;
}

/// Engine selection in configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrEngineKind {
    #[default]
    Tesseract,
    GoogleVision,
}

/// Raster formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Heic,
    Webp,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Sniff the format from magic bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        let kind = infer::get(bytes)?;
        match kind.mime_type() {
            "image/jpeg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/heif" | "image/heic" => Some(ImageFormat::Heic),
            "image/webp" => Some(ImageFormat::Webp),
            "image/gif" => Some(ImageFormat::Gif),
            "image/bmp" => Some(ImageFormat::Bmp),
            "image/tiff" => Some(ImageFormat::Tiff),
            _ => None,
        }
    }

    /// Short name used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Heic => "HEIC",
            ImageFormat::Webp => "WebP",
            ImageFormat::Gif => "GIF",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Tiff => "TIFF",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Heic => "image/heic",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
        }
    }
}

/// Build the engine named in configuration
pub fn create_engine(
    config: &OcrConfig,
    timeout: Duration,
) -> Result<Box<dyn OcrEngine>, AnalyzerError> {
    match config.engine {
        OcrEngineKind::Tesseract => Ok(Box::new(TesseractEngine::new(
            &config.binary,
            &config.language,
        ))),
        OcrEngineKind::GoogleVision => Ok(Box::new(GoogleVisionEngine::new(config, timeout)?)),
    }
}

/// Extract menu text from an image.
///
/// # Errors
/// - [`AnalyzerError::InvalidImage`] when the bytes are not a raster image,
///   or are one the engine cannot decode
/// - [`AnalyzerError::OcrFailed`] when the engine fails
/// - [`AnalyzerError::NoTextExtracted`] when nothing but whitespace was recognized
pub async fn extract_text(engine: &dyn OcrEngine, image: &[u8]) -> Result<String, AnalyzerError> {
    let format = ImageFormat::detect(image).ok_or_else(|| {
        AnalyzerError::InvalidImage("expected a JPEG or PNG image".to_string())
    })?;
    if !engine.supports(format) {
        error!("{} cannot decode {}", engine.engine_name(), format.mime_type());
        return Err(AnalyzerError::InvalidImage(format!(
            "{} images cannot be read by the {} engine, convert the photo to JPEG or PNG",
            format.label(),
            engine.engine_name()
        )));
    }
    debug!(
        "Running {} OCR on {} bytes of {}",
        engine.engine_name(),
        image.len(),
        format.mime_type()
    );

    let text = engine
        .recognize(image)
        .await
        .inspect_err(|e| error!("{} OCR failed: {}", engine.engine_name(), e))?;

    if text.trim().is_empty() {
        error!("{} recognized no text", engine.engine_name());
        return Err(AnalyzerError::NoTextExtracted);
    }

    info!("Extracted {} characters of menu text", text.chars().count());
    Ok(text)
}
