//! Image stage: pin the selected image and return its content reference

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mintflow_common::ContentRef;
use serde::{Deserialize, Serialize};

use crate::{FileUpload, PinningError, PinningService, UploadError};

/// A user-selected image file
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub media_type: String,
}

impl std::fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBlob")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl ImageBlob {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            media_type: media_type.into(),
        }
    }

    /// Check the blob is non-empty and declares an `image/*` media type
    pub fn validate(&self) -> Result<(), PinningError> {
        if self.bytes.is_empty() {
            return Err(PinningError::InvalidInput("Image is empty".to_string()));
        }

        let media_type = self.media_type.trim();
        let Some((kind, subtype)) = media_type.split_once('/') else {
            return Err(PinningError::InvalidInput(format!(
                "Media type must be declared as type/subtype, got '{}'",
                self.media_type
            )));
        };

        if !kind.eq_ignore_ascii_case("image") || subtype.is_empty() {
            return Err(PinningError::InvalidInput(format!(
                "Only image media types are accepted, got '{}'",
                self.media_type
            )));
        }

        Ok(())
    }

    fn to_upload(&self) -> FileUpload {
        let file_name = if self.file_name.trim().is_empty() {
            "image".to_string()
        } else {
            self.file_name.clone()
        };

        FileUpload {
            bytes: self.bytes.clone(),
            file_name,
            media_type: self.media_type.trim().to_string(),
        }
    }
}

/// Result of a successful image upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUploadResult {
    pub content_ref: ContentRef,
    pub ipfs_hash: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Uploads image blobs to the pinning service
#[derive(Clone)]
pub struct ContentUploader {
    service: Arc<dyn PinningService>,
    gateway_url: String,
}

impl ContentUploader {
    pub fn new(service: Arc<dyn PinningService>, gateway_url: impl Into<String>) -> Self {
        Self {
            service,
            gateway_url: gateway_url.into(),
        }
    }

    /// Pin the blob and return a gateway reference to it.
    ///
    /// Invalid blobs are rejected before any network call. No retry is attempted.
    pub async fn upload(&self, blob: &ImageBlob) -> Result<ImageUploadResult, UploadError> {
        blob.validate().map_err(UploadError::image)?;

        let pinned = self
            .service
            .pin_file(blob.to_upload())
            .await
            .map_err(UploadError::image)?;

        let content_ref = ContentRef::from_gateway(&self.gateway_url, &pinned.ipfs_hash)
            .map_err(|e| UploadError::image(PinningError::Malformed(e.to_string())))?;

        tracing::info!(
            ipfs_hash = %pinned.ipfs_hash,
            content_ref = %content_ref,
            "Image uploaded"
        );

        Ok(ImageUploadResult {
            content_ref,
            ipfs_hash: pinned.ipfs_hash,
            uploaded_at: Utc::now(),
        })
    }
}
