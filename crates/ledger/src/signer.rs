//! Signer capability
//!
//! The wallet side of minting. A signer exposes its public identity and
//! builds + signs the creation transaction; private keys never enter this crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AssetRecord;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignerError {
    #[error("Signer is not connected")]
    Disconnected,

    #[error("Signer rejected the request: {0}")]
    Rejected(String),
}

/// What the signer is asked to authorize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationRequest {
    pub record: AssetRecord,
    pub recent_blockhash: String,
}

/// A signed creation transaction ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCreation {
    /// Address of the new asset (the mint account)
    pub asset_address: String,
    /// Base64 wire-format transaction
    pub transaction: String,
}

#[async_trait::async_trait]
pub trait Signer: Send + Sync {
    /// Public key of the connected wallet, `None` while disconnected
    fn public_key(&self) -> Option<String>;

    /// Build and sign the asset creation transaction
    async fn sign_asset_creation(
        &self,
        request: &CreationRequest,
    ) -> Result<SignedCreation, SignerError>;
}
