//! Metadata stage: build the asset's JSON document and pin it

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mintflow_common::{AssetFields, ContentRef};
use serde::{Deserialize, Serialize};

use crate::{PinningError, PinningService, UploadError};

/// The off-chain metadata document referenced by the on-chain record.
///
/// Serialized keys are exactly `name`, `symbol`, `description`, `image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: ContentRef,
}

impl MetadataDocument {
    pub fn build(fields: &AssetFields, image_ref: &ContentRef) -> Self {
        Self {
            name: fields.name.clone(),
            symbol: fields.symbol.clone(),
            description: fields.description.clone(),
            image: image_ref.clone(),
        }
    }
}

/// Result of a successful metadata upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataUploadResult {
    pub metadata_ref: ContentRef,
    pub ipfs_hash: String,
    pub document: MetadataDocument,
    pub uploaded_at: DateTime<Utc>,
}

/// Builds and pins metadata documents
#[derive(Clone)]
pub struct MetadataPublisher {
    service: Arc<dyn PinningService>,
    gateway_url: String,
}

impl MetadataPublisher {
    pub fn new(service: Arc<dyn PinningService>, gateway_url: impl Into<String>) -> Self {
        Self {
            service,
            gateway_url: gateway_url.into(),
        }
    }

    /// Pin the metadata document for `fields` pointing at `image_ref`.
    ///
    /// Safe to call again with the same input; the provider may or may not
    /// return the same address.
    pub async fn publish(
        &self,
        fields: &AssetFields,
        image_ref: &ContentRef,
    ) -> Result<MetadataUploadResult, UploadError> {
        let document = MetadataDocument::build(fields, image_ref);
        let body = serde_json::to_value(&document)
            .map_err(|e| UploadError::metadata(PinningError::InvalidInput(e.to_string())))?;

        let pinned = self
            .service
            .pin_json(body)
            .await
            .map_err(UploadError::metadata)?;

        let metadata_ref = ContentRef::from_gateway(&self.gateway_url, &pinned.ipfs_hash)
            .map_err(|e| UploadError::metadata(PinningError::Malformed(e.to_string())))?;

        tracing::info!(
            ipfs_hash = %pinned.ipfs_hash,
            metadata_ref = %metadata_ref,
            "Metadata uploaded"
        );

        Ok(MetadataUploadResult {
            metadata_ref,
            ipfs_hash: pinned.ipfs_hash,
            document,
            uploaded_at: Utc::now(),
        })
    }
}
