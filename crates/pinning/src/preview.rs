//! Local image preview
//!
//! Decodes the selected image for immediate display. Runs next to the
//! upload and never affects the outcome of the image stage.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreviewError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Preview task error: {0}")]
    Task(String),
}

/// Displayable preview of the selected image
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePreview {
    /// `data:{mime};base64,...`
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    pub media_type: String,
}

impl std::fmt::Debug for ImagePreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePreview")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("media_type", &self.media_type)
            .field("data_url_len", &self.data_url.len())
            .finish()
    }
}

/// Decode `bytes` and build a preview. The format is sniffed from the content.
pub fn render(bytes: &[u8]) -> Result<ImagePreview, PreviewError> {
    let format =
        image::guess_format(bytes).map_err(|e| PreviewError::UnsupportedFormat(e.to_string()))?;
    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| PreviewError::Decode(e.to_string()))?;

    let media_type = format.to_mime_type().to_string();
    let data_url = format!("data:{};base64,{}", media_type, STANDARD.encode(bytes));

    Ok(ImagePreview {
        data_url,
        width: decoded.width(),
        height: decoded.height(),
        media_type,
    })
}

/// Decode on the blocking pool so the upload keeps making progress
pub async fn render_async(bytes: Vec<u8>) -> Result<ImagePreview, PreviewError> {
    tokio::task::spawn_blocking(move || render(&bytes))
        .await
        .map_err(|e| PreviewError::Task(e.to_string()))?
}
