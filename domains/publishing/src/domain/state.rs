//! State machine for the publish pipeline
//!
//! Stages run strictly in order: image → metadata → mint.
//! Each stage is `Idle/Ready → InFlight → Ready | Failed`. A failed stage is
//! re-entered by triggering the same stage again; results of earlier stages
//! are kept. Minted is terminal until the workflow is reset.

use mintflow_common::{PipelineStage, StateError};
use serde::{Deserialize, Serialize};

/// Publish pipeline states
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishState {
    #[default]
    Idle,
    ImageUploading,
    ImageReady,
    MetadataUploading,
    MetadataReady,
    Minting,
    Minted,
    Failed { stage: PipelineStage, cause: String },
}

impl PublishState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Minted)
    }

    /// The stage currently waiting on a remote call, if any
    pub fn in_flight_stage(&self) -> Option<PipelineStage> {
        match self {
            Self::ImageUploading => Some(PipelineStage::Image),
            Self::MetadataUploading => Some(PipelineStage::Metadata),
            Self::Minting => Some(PipelineStage::Mint),
            _ => None,
        }
    }

    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Failed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl std::fmt::Display for PublishState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::ImageUploading => write!(f, "image_uploading"),
            Self::ImageReady => write!(f, "image_ready"),
            Self::MetadataUploading => write!(f, "metadata_uploading"),
            Self::MetadataReady => write!(f, "metadata_ready"),
            Self::Minting => write!(f, "minting"),
            Self::Minted => write!(f, "minted"),
            Self::Failed { stage, .. } => write!(f, "failed({})", stage),
        }
    }
}

/// Events that trigger publish state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum PublishEvent {
    /// An image was selected (or re-sent) for upload
    StartImageUpload,
    ImageUploaded,
    ImageUploadFailed(String),
    /// User triggered the metadata upload
    StartMetadataUpload,
    MetadataUploaded,
    MetadataUploadFailed(String),
    /// User triggered the mint
    StartMint,
    MintSucceeded,
    MintFailed(String),
    /// Draft discarded, back to the beginning
    Reset,
}

impl std::fmt::Display for PublishEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartImageUpload => write!(f, "start_image_upload"),
            Self::ImageUploaded => write!(f, "image_uploaded"),
            Self::ImageUploadFailed(_) => write!(f, "image_upload_failed"),
            Self::StartMetadataUpload => write!(f, "start_metadata_upload"),
            Self::MetadataUploaded => write!(f, "metadata_uploaded"),
            Self::MetadataUploadFailed(_) => write!(f, "metadata_upload_failed"),
            Self::StartMint => write!(f, "start_mint"),
            Self::MintSucceeded => write!(f, "mint_succeeded"),
            Self::MintFailed(_) => write!(f, "mint_failed"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// Publish state machine
pub struct PublishStateMachine;

impl PublishStateMachine {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(
        current: &PublishState,
        event: PublishEvent,
    ) -> Result<PublishState, StateError> {
        if event == PublishEvent::Reset {
            return Ok(PublishState::Idle);
        }

        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        use PipelineStage as S;
        use PublishEvent as E;
        use PublishState as P;

        let next = match (current, event) {
            // Image stage
            (
                P::Idle | P::ImageReady | P::MetadataReady | P::Failed { .. },
                E::StartImageUpload,
            ) => P::ImageUploading,
            (P::ImageUploading, E::ImageUploaded) => P::ImageReady,
            (P::ImageUploading, E::ImageUploadFailed(cause)) => P::Failed {
                stage: S::Image,
                cause,
            },

            // Metadata stage
            (
                P::ImageReady
                | P::MetadataReady
                | P::Failed {
                    stage: S::Metadata | S::Mint,
                    ..
                },
                E::StartMetadataUpload,
            ) => P::MetadataUploading,
            (P::MetadataUploading, E::MetadataUploaded) => P::MetadataReady,
            (P::MetadataUploading, E::MetadataUploadFailed(cause)) => P::Failed {
                stage: S::Metadata,
                cause,
            },

            // Mint stage
            (P::MetadataReady | P::Failed { stage: S::Mint, .. }, E::StartMint) => P::Minting,
            (P::Minting, E::MintSucceeded) => P::Minted,
            (P::Minting, E::MintFailed(cause)) => P::Failed {
                stage: S::Mint,
                cause,
            },

            (current, event) => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: &PublishState, event: &PublishEvent) -> bool {
        Self::transition(current, event.clone()).is_ok()
    }
}
