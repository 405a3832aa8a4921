//! Tesseract OCR via the command-line binary.
//!
//! One child process per call, fed the image on stdin. The child is
//! killed if the call is dropped before it exits.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::OcrEngine;
use crate::error::AnalyzerError;

const ENGINE: &str = "tesseract";

pub struct TesseractEngine {
    binary: String,
    language: String,
}

impl TesseractEngine {
    pub fn new(binary: &str, language: &str) -> Self {
        Self {
            binary: binary.to_string(),
            language: language.to_string(),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn engine_name(&self) -> &str {
        ENGINE
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, AnalyzerError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => AnalyzerError::ocr(
                    ENGINE,
                    format!("{} not found (install tesseract-ocr)", self.binary),
                ),
                _ => AnalyzerError::ocr(ENGINE, e.to_string()),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AnalyzerError::ocr(ENGINE, "stdin was not captured"))?;

        let feed = async move {
            stdin.write_all(image).await?;
            stdin.shutdown().await
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| AnalyzerError::ocr(ENGINE, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalyzerError::ocr(
                ENGINE,
                format!("tesseract failed: {}", stderr.trim()),
            ));
        }

        // A broken pipe with a clean exit just means tesseract stopped
        // reading early
        if let Err(e) = fed {
            warn!("Could not write the whole image to tesseract: {}", e);
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("tesseract recognized {} characters", text.len());
        Ok(text)
    }
}
