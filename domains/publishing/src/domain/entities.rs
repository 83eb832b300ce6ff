//! Publishing domain entities

use mintflow_common::{AssetFields, ContentRef, PipelineStage};
use mintflow_ledger::MintedAsset;
use mintflow_pinning::{ImageBlob, ImagePreview};
use serde::{Deserialize, Serialize};

use super::state::PublishState;

/// Label shown on the metadata trigger while the image is still uploading
pub const LABEL_IMAGE_UPLOADING: &str = "Uploading Image...";
pub const LABEL_METADATA_UPLOADING: &str = "Uploading...";
pub const LABEL_UPLOAD_METADATA: &str = "Upload Metadata";
pub const LABEL_MINTING: &str = "Minting...";
pub const LABEL_MINT: &str = "Mint NFT";

/// The user's in-progress asset.
///
/// Lives only inside the workflow and is discarded on mint success or reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetDraft {
    pub fields: AssetFields,
    pub image: Option<ImageBlob>,
    pub image_ref: Option<ContentRef>,
}

impl AssetDraft {
    /// Replace the selected image, dropping the reference to the previous one
    pub fn select_image(&mut self, blob: ImageBlob) {
        self.image = Some(blob);
        self.image_ref = None;
    }
}

/// Per-stage in-flight flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFlags {
    pub image: bool,
    pub metadata: bool,
    pub mint: bool,
}

impl StageFlags {
    pub fn get(&self, stage: PipelineStage) -> bool {
        match stage {
            PipelineStage::Image => self.image,
            PipelineStage::Metadata => self.metadata,
            PipelineStage::Mint => self.mint,
        }
    }

    pub fn set(&mut self, stage: PipelineStage, in_flight: bool) {
        match stage {
            PipelineStage::Image => self.image = in_flight,
            PipelineStage::Metadata => self.metadata = in_flight,
            PipelineStage::Mint => self.mint = in_flight,
        }
    }

    pub fn any(&self) -> bool {
        self.image || self.metadata || self.mint
    }
}

/// Tri-state status of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSignal {
    Idle,
    InProgress,
    Failed,
}

/// Read-only view of the workflow for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishSnapshot {
    pub state: PublishState,
    pub fields: AssetFields,
    pub image_file_name: Option<String>,
    pub image_ref: Option<ContentRef>,
    pub metadata_ref: Option<ContentRef>,
    pub preview: Option<ImagePreview>,
    pub preview_error: Option<String>,
    pub minted: Option<MintedAsset>,
    pub in_flight: StageFlags,
    pub can_upload_metadata: bool,
    pub can_mint: bool,
}

impl PublishSnapshot {
    pub fn signal(&self, stage: PipelineStage) -> StageSignal {
        if self.in_flight.get(stage) {
            StageSignal::InProgress
        } else if self.state.failed_stage() == Some(stage) {
            StageSignal::Failed
        } else {
            StageSignal::Idle
        }
    }

    /// Text for the metadata trigger
    #[mutants::skip] // Presentation text only
    pub fn metadata_label(&self) -> &'static str {
        if self.in_flight.metadata {
            LABEL_METADATA_UPLOADING
        } else if self.in_flight.image {
            LABEL_IMAGE_UPLOADING
        } else {
            LABEL_UPLOAD_METADATA
        }
    }

    /// Text for the mint trigger
    #[mutants::skip] // Presentation text only
    pub fn mint_label(&self) -> &'static str {
        if self.in_flight.mint {
            LABEL_MINTING
        } else {
            LABEL_MINT
        }
    }

    pub fn explorer_url(&self) -> Option<&str> {
        self.minted.as_ref().map(|m| m.explorer_url.as_str())
    }

    /// Cause of the current failure, if the pipeline is in a failed state
    pub fn failure(&self) -> Option<(PipelineStage, &str)> {
        match &self.state {
            PublishState::Failed { stage, cause } => Some((*stage, cause.as_str())),
            _ => None,
        }
    }
}
