//! Pinata HTTP Client Implementation
//!
//! Pins files and JSON documents through the Pinata API
//! (`{base_url}/pinning/pinFileToIPFS` and `{base_url}/pinning/pinJSONToIPFS`).
//! Credentials travel in the `pinata_api_key` / `pinata_secret_api_key` headers.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use crate::{FileUpload, PinResponse, PinningConfig, PinningError, PinningService};

const API_KEY_HEADER: &str = "pinata_api_key";
const SECRET_API_KEY_HEADER: &str = "pinata_secret_api_key";

/// Pinata pinning service client
pub struct PinataClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    secret_api_key: Option<String>,
}

impl PinataClient {
    /// Create a new Pinata client from configuration.
    ///
    /// Missing credentials are not an error here; every pin call fails with
    /// `PinningError::Unauthorized` instead.
    pub fn new(config: PinningConfig) -> Result<Self, PinningError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PinningError::Configuration(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            secret_api_key: config.secret_api_key,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, PinningError> {
        match (&self.api_key, &self.secret_api_key) {
            (Some(key), Some(secret)) => Ok(request
                .header(API_KEY_HEADER, key)
                .header(SECRET_API_KEY_HEADER, secret)),
            _ => Err(PinningError::Unauthorized(
                "Pinata API key and secret are not configured".to_string(),
            )),
        }
    }

    async fn parse_response(response: Response) -> Result<PinResponse, PinningError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(PinningError::Unauthorized(format!(
                "Pinata rejected credentials ({}): {}",
                status, body
            )));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(PinningError::Response(format!(
                "Pinata API returned {}: {}",
                status, body
            )));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| PinningError::Malformed(format!("Failed to parse response: {}", e)))?;

        if pinned.ipfs_hash.trim().is_empty() {
            return Err(PinningError::Malformed(
                "Response contained an empty IpfsHash".to_string(),
            ));
        }

        Ok(pinned)
    }
}

#[async_trait::async_trait]
impl PinningService for PinataClient {
    async fn pin_file(&self, file: FileUpload) -> Result<PinResponse, PinningError> {
        let url = format!("{}/pinning/pinFileToIPFS", self.base_url);
        let request = self.authorized(self.http.post(&url))?;

        let size = file.bytes.len();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| {
                PinningError::InvalidInput(format!("Invalid media type '{}': {}", file.media_type, e))
            })?;
        let form = Form::new().part("file", part);

        tracing::debug!(file_name = %file.file_name, size, "Pinning file to IPFS");

        let response = request
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinningError::Request(format!("HTTP request failed: {}", e)))?;

        let pinned = Self::parse_response(response).await?;
        tracing::debug!(ipfs_hash = %pinned.ipfs_hash, "File pinned");
        Ok(pinned)
    }

    async fn pin_json(&self, document: serde_json::Value) -> Result<PinResponse, PinningError> {
        let url = format!("{}/pinning/pinJSONToIPFS", self.base_url);
        let request = self.authorized(self.http.post(&url))?;

        tracing::debug!("Pinning JSON document to IPFS");

        let response = request
            .json(&document)
            .send()
            .await
            .map_err(|e| PinningError::Request(format!("HTTP request failed: {}", e)))?;

        let pinned = Self::parse_response(response).await?;
        tracing::debug!(ipfs_hash = %pinned.ipfs_hash, "JSON document pinned");
        Ok(pinned)
    }
}
