use std::fmt;
use std::path::Path;

use log::debug;

use crate::error::AnalyzerError;

type ReleaseHook = Box<dyn FnOnce(&str) + Send + Sync>;

/// A displayable handle on the selected image (an object URL, a temp
/// file, a texture id). Released at most once; dropping releases it.
pub struct ImagePreview {
    uri: String,
    on_release: Option<ReleaseHook>,
}

impl ImagePreview {
    pub fn new(uri: impl Into<String>, on_release: impl FnOnce(&str) + Send + Sync + 'static) -> Self {
        Self {
            uri: uri.into(),
            on_release: Some(Box::new(on_release)),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_released(&self) -> bool {
        self.on_release.is_none()
    }

    /// Returns false if it was already released
    pub fn release(&mut self) -> bool {
        match self.on_release.take() {
            Some(hook) => {
                debug!("Releasing image preview {}", self.uri);
                hook(&self.uri);
                true
            }
            None => false,
        }
    }
}

impl Drop for ImagePreview {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ImagePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePreview")
            .field("uri", &self.uri)
            .field("released", &self.is_released())
            .finish()
    }
}

/// The image the user picked, plus its optional preview
#[derive(Debug)]
pub struct SelectedImage {
    bytes: Vec<u8>,
    name: Option<String>,
    preview: Option<ImagePreview>,
}

impl SelectedImage {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            name: None,
            preview: None,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalyzerError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self {
            bytes,
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            preview: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_preview(mut self, preview: ImagePreview) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn preview(&self) -> Option<&ImagePreview> {
        self.preview.as_ref()
    }

    /// Release the preview handle if there is one still held
    pub fn release_preview(&mut self) -> bool {
        self.preview
            .as_mut()
            .map(ImagePreview::release)
            .unwrap_or(false)
    }
}
