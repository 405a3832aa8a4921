//! Plumbing shared by the vendor implementations: credential checks,
//! HTTP client setup, status handling and the `dishes` contract parser.

use log::debug;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use super::ProviderKind;
use crate::config::ProviderConfig;
use crate::error::AnalyzerError;
use crate::model::DishAnalysis;

pub(crate) fn require_api_key(
    kind: ProviderKind,
    config: &ProviderConfig,
) -> Result<String, AnalyzerError> {
    config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AnalyzerError::configuration(
                kind.as_str(),
                format!("{} not found in config or environment", kind.api_key_env()),
            )
        })
}

pub(crate) fn build_client(
    kind: ProviderKind,
    config: &ProviderConfig,
) -> Result<Client, AnalyzerError> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| AnalyzerError::configuration(kind.as_str(), e.to_string()))
}

pub(crate) fn base_url(kind: ProviderKind, config: &ProviderConfig) -> String {
    config
        .base_url
        .as_deref()
        .unwrap_or(kind.default_base_url())
        .trim_end_matches('/')
        .to_string()
}

pub(crate) fn model(kind: ProviderKind, config: &ProviderConfig) -> String {
    config
        .model
        .clone()
        .unwrap_or_else(|| kind.default_model().to_string())
}

/// Send a request and return the decoded JSON envelope.
///
/// Non-success statuses become [`AnalyzerError::Api`] carrying whatever
/// body the vendor sent back.
pub(crate) async fn send_json(
    vendor: &str,
    request: RequestBuilder,
) -> Result<Value, AnalyzerError> {
    let transport = |source| AnalyzerError::Transport {
        vendor: vendor.to_string(),
        source,
    };

    let response = request.send().await.map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AnalyzerError::Api {
            vendor: vendor.to_string(),
            status,
            body,
        });
    }

    let text = response.text().await.map_err(transport)?;
    debug!("{} response: {}", vendor, text);

    serde_json::from_str(&text)
        .map_err(|e| AnalyzerError::schema(vendor, format!("response body is not JSON: {}", e)))
}

/// Pull a string out of the vendor envelope, e.g. `choices[0].message.content`.
pub(crate) fn content_at<'a>(
    vendor: &str,
    envelope: &'a Value,
    pointer: &str,
) -> Result<&'a str, AnalyzerError> {
    envelope
        .pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AnalyzerError::schema(vendor, format!("missing message content at {}", pointer))
        })
}

/// Remove a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // The json tag may be glued to the payload ("```json{...}")
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let body = if rest.trim_start().starts_with(['{', '[']) {
        rest
    } else {
        // Any other info string runs up to the first newline
        match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest,
        }
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse model output into dishes. A missing `dishes` array is an error.
pub fn parse_dishes(vendor: &str, content: &str) -> Result<Vec<DishAnalysis>, AnalyzerError> {
    let body = strip_code_fences(content);

    let mut parsed: Value = serde_json::from_str(body).map_err(|e| {
        AnalyzerError::schema(vendor, format!("failed to parse response as JSON: {}", e))
    })?;

    let dishes = match parsed.get_mut("dishes") {
        Some(value) if value.is_array() => value.take(),
        _ => return Err(AnalyzerError::schema(vendor, "missing dishes array")),
    };

    let dishes: Vec<DishAnalysis> = serde_json::from_value(dishes)
        .map_err(|e| AnalyzerError::schema(vendor, format!("malformed dish entry: {}", e)))?;

    if let Some(idx) = dishes.iter().position(|d| d.name.trim().is_empty()) {
        return Err(AnalyzerError::schema(
            vendor,
            format!("dish at index {} has an empty name", idx),
        ));
    }

    Ok(dishes)
}
