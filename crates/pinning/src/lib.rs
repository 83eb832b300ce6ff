//! Mintflow Pinning Service
//!
//! Uploads content to IPFS through a pinning provider:
//! - Pinata HTTP API integration for production
//! - Mock pinning service for testing and development
//! - `ContentUploader` and `MetadataPublisher` for the first two publish stages
//! - Local image preview decoding, independent of the upload

pub mod client;
pub mod metadata;
pub mod mock;
pub mod preview;
pub mod uploader;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

use std::time::Duration;

use mintflow_common::{Config, PipelineStage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use metadata::{MetadataDocument, MetadataPublisher, MetadataUploadResult};
pub use preview::{ImagePreview, PreviewError};
pub use uploader::{ContentUploader, ImageBlob, ImageUploadResult};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PinningError {
    #[error("Pinning configuration error: {0}")]
    Configuration(String),

    #[error("Pinning authorization error: {0}")]
    Unauthorized(String),

    #[error("Pinning request error: {0}")]
    Request(String),

    #[error("Pinning response error: {0}")]
    Response(String),

    #[error("Malformed pinning response: {0}")]
    Malformed(String),

    #[error("Invalid upload: {0}")]
    InvalidInput(String),
}

impl PinningError {
    /// Whether the failure was caused by missing or rejected credentials
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Failure of the image or metadata stage
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{stage} upload failed: {cause}")]
pub struct UploadError {
    pub stage: PipelineStage,
    #[source]
    pub cause: PinningError,
}

impl UploadError {
    pub fn image(cause: PinningError) -> Self {
        Self {
            stage: PipelineStage::Image,
            cause,
        }
    }

    pub fn metadata(cause: PinningError) -> Self {
        Self {
            stage: PipelineStage::Metadata,
            cause,
        }
    }

    pub fn is_authorization(&self) -> bool {
        self.cause.is_authorization()
    }
}

/// A file to pin
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub media_type: String,
}

/// Response body of both pin endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinResponse {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: String,
    #[serde(rename = "PinSize")]
    pub pin_size: Option<u64>,
    #[serde(rename = "Timestamp")]
    pub timestamp: Option<String>,
}

/// Pinning service configuration
#[derive(Clone)]
pub struct PinningConfig {
    /// Pinning provider (pinata, mock)
    pub provider: String,
    pub api_key: Option<String>,
    pub secret_api_key: Option<String>,
    /// Base URL of the pinning API
    pub base_url: String,
    /// Gateway used to build content references
    pub gateway_url: String,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for PinningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinningConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "secret_api_key",
                &self.secret_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url)
            .field("gateway_url", &self.gateway_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl PinningConfig {
    /// Build pinning config from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider: config.pinning_provider.clone(),
            api_key: config.pinata_api_key.clone(),
            secret_api_key: config.pinata_secret_api_key.clone(),
            base_url: config.pinata_base_url.clone(),
            gateway_url: config.ipfs_gateway_url.clone(),
            request_timeout: Duration::from_secs(config.http_timeout_secs),
        }
    }

    /// Create pinning config from environment variables
    pub fn from_env() -> Result<Self, PinningError> {
        let config = Config::from_env().map_err(|e| PinningError::Configuration(e.to_string()))?;
        Ok(Self::from_config(&config))
    }
}

/// Pinning service trait for different providers
#[async_trait::async_trait]
pub trait PinningService: Send + Sync {
    /// Pin a binary file
    async fn pin_file(&self, file: FileUpload) -> Result<PinResponse, PinningError>;

    /// Pin a JSON document
    async fn pin_json(&self, document: serde_json::Value) -> Result<PinResponse, PinningError>;
}

/// Factory for creating PinningService implementations
pub struct PinningServiceFactory;

impl PinningServiceFactory {
    pub fn create(config: PinningConfig) -> Result<Box<dyn PinningService>, PinningError> {
        match config.provider.as_str() {
            "pinata" => {
                tracing::info!(base_url = %config.base_url, "Creating Pinata pinning service");
                Ok(Box::new(client::PinataClient::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock pinning service");
                Ok(Box::new(mock::MockPinningService::new()))
            }
            provider => Err(PinningError::Configuration(format!(
                "Unknown pinning provider: {}. Supported providers: pinata, mock",
                provider
            ))),
        }
    }
}
