//! Pipeline stage identifiers

use serde::{Deserialize, Serialize};

/// The three stages of the publish pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Image,
    Metadata,
    Mint,
}

impl PipelineStage {
    /// All stages in pipeline order
    pub const ALL: [PipelineStage; 3] = [Self::Image, Self::Metadata, Self::Mint];

    /// The stage whose result must exist before this one may start
    pub fn predecessor(&self) -> Option<PipelineStage> {
        match self {
            Self::Image => None,
            Self::Metadata => Some(Self::Image),
            Self::Mint => Some(Self::Metadata),
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Metadata => write!(f, "metadata"),
            Self::Mint => write!(f, "mint"),
        }
    }
}
