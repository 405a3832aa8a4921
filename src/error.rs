use thiserror::Error;

/// Errors that can occur while analyzing a menu
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// OCR finished but produced nothing besides whitespace
    #[error("No text could be extracted from the image")]
    NoTextExtracted,

    /// The OCR engine itself failed
    #[error("{engine} OCR failed: {message}")]
    OcrFailed { engine: String, message: String },

    /// The supplied bytes are not a supported raster image
    #[error("Unsupported image: {0}")]
    InvalidImage(String),

    /// Provider credential missing or provider disabled
    #[error("{vendor} configuration error: {message}")]
    Configuration { vendor: String, message: String },

    /// Network failure talking to a vendor
    #[error("{vendor} request failed: {source}")]
    Transport {
        vendor: String,
        #[source]
        source: reqwest::Error,
    },

    /// Vendor answered with a non-success HTTP status
    #[error("{vendor} API error: {status}{}", format_body(.body))]
    Api {
        vendor: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Vendor response did not match the dishes contract
    #[error("Invalid response from {vendor}: {message}")]
    Schema { vendor: String, message: String },

    /// Provider identifier outside the supported set
    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    /// Builder misuse, e.g. no image supplied
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Reading an image from disk failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Loading the configuration failed
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl AnalyzerError {
    pub(crate) fn configuration(vendor: &str, message: impl Into<String>) -> Self {
        AnalyzerError::Configuration {
            vendor: vendor.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn schema(vendor: &str, message: impl Into<String>) -> Self {
        AnalyzerError::Schema {
            vendor: vendor.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn ocr(engine: &str, message: impl Into<String>) -> Self {
        AnalyzerError::OcrFailed {
            engine: engine.to_string(),
            message: message.into(),
        }
    }

    /// True for failures that happened before any text was recognized
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::NoTextExtracted
                | AnalyzerError::OcrFailed { .. }
                | AnalyzerError::InvalidImage(_)
        )
    }
}

fn format_body(body: &str) -> String {
    if body.trim().is_empty() {
        String::new()
    } else {
        format!(" - {}", body.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_text_message() {
        assert_eq!(
            AnalyzerError::NoTextExtracted.to_string(),
            "No text could be extracted from the image"
        );
    }

    #[test]
    fn test_api_error_includes_vendor_status_and_body() {
        let err = AnalyzerError::Api {
            vendor: "deepseek".to_string(),
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: r#"{"error":"bad key"}"#.to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("deepseek API error: 401"));
        assert!(msg.contains("bad key"));
    }

    #[test]
    fn test_api_error_without_body() {
        let err = AnalyzerError::Api {
            vendor: "qwen".to_string(),
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "  ".to_string(),
        };
        assert_eq!(err.to_string(), "qwen API error: 502 Bad Gateway");
    }

    #[test]
    fn test_configuration_names_vendor() {
        let err = AnalyzerError::configuration("gemini", "GEMINI_API_KEY not found");
        assert_eq!(
            err.to_string(),
            "gemini configuration error: GEMINI_API_KEY not found"
        );
        assert!(!err.is_extraction_error());
    }

    #[test]
    fn test_extraction_errors() {
        assert!(AnalyzerError::NoTextExtracted.is_extraction_error());
        assert!(AnalyzerError::ocr("tesseract", "crashed").is_extraction_error());
        assert!(AnalyzerError::InvalidImage("pdf".to_string()).is_extraction_error());
    }
}
