//! Mint stage: create the on-chain record and wait for finalized commitment

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mintflow_common::{AssetFields, ContentRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::{
    AssetRecord, Cluster, CreationRequest, LedgerConfig, LedgerError, LedgerService, Signer,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MintError {
    /// Nothing was sent to the ledger
    #[error("Mint precondition failed: {0}")]
    Precondition(String),

    #[error("Mint submission failed: {0}")]
    Submit(#[source] LedgerError),
}

/// A finalized on-chain asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedAsset {
    pub address: String,
    pub signature: String,
    pub cluster: Cluster,
    pub explorer_url: String,
    pub record: AssetRecord,
    pub finalized_at: DateTime<Utc>,
}

/// Submits asset creation transactions and waits for them to finalize
#[derive(Clone)]
pub struct AssetPublisher {
    ledger: Arc<dyn LedgerService>,
    cluster: Cluster,
    finalize_timeout: Duration,
    poll_interval: Duration,
}

impl AssetPublisher {
    pub fn new(ledger: Arc<dyn LedgerService>, config: &LedgerConfig) -> Self {
        Self {
            ledger,
            cluster: config.cluster,
            finalize_timeout: config.finalize_timeout,
            poll_interval: config.poll_interval,
        }
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    /// Mint an immutable asset pointing at `metadata_ref`.
    ///
    /// Fails with `Precondition` without touching the ledger when the signer
    /// is absent or disconnected, or when the record exceeds program limits.
    pub async fn mint(
        &self,
        signer: Option<&dyn Signer>,
        metadata_ref: &ContentRef,
        fields: &AssetFields,
    ) -> Result<MintedAsset, MintError> {
        let signer =
            signer.ok_or_else(|| MintError::Precondition("No signer available".to_string()))?;
        let creator = signer
            .public_key()
            .ok_or_else(|| MintError::Precondition("Signer is not connected".to_string()))?;

        let record = AssetRecord::new(metadata_ref, fields, creator);
        record.validate().map_err(MintError::Precondition)?;

        let recent_blockhash = self
            .ledger
            .latest_blockhash()
            .await
            .map_err(MintError::Submit)?;

        let request = CreationRequest {
            record,
            recent_blockhash,
        };
        let signed = signer
            .sign_asset_creation(&request)
            .await
            .map_err(|e| MintError::Submit(e.into()))?;

        let signature = self
            .ledger
            .send_transaction(&signed.transaction)
            .await
            .map_err(MintError::Submit)?;

        tracing::info!(
            signature = %signature,
            address = %signed.asset_address,
            cluster = %self.cluster,
            "Creation transaction submitted, awaiting finalization"
        );

        self.await_finalized(&signature)
            .await
            .map_err(MintError::Submit)?;

        let explorer_url = self.cluster.explorer_url(&signed.asset_address);
        tracing::info!(address = %signed.asset_address, explorer_url = %explorer_url, "Asset minted");

        Ok(MintedAsset {
            address: signed.asset_address,
            signature,
            cluster: self.cluster,
            explorer_url,
            record: request.record,
            finalized_at: Utc::now(),
        })
    }

    /// Poll until the transaction is finalized, fails, or the deadline passes.
    ///
    /// Transport errors while polling are retried until the deadline: the
    /// transaction may still land even if the node is briefly unreachable.
    async fn await_finalized(&self, signature: &str) -> Result<(), LedgerError> {
        let started = Instant::now();

        loop {
            match self.ledger.signature_status(signature).await {
                Ok(Some(status)) if status.err.is_some() => {
                    let reason = status
                        .err
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown error".to_string());
                    return Err(LedgerError::TransactionFailed {
                        signature: signature.to_string(),
                        reason,
                    });
                }
                Ok(Some(status)) if status.is_finalized() => return Ok(()),
                Ok(status) => {
                    tracing::debug!(
                        signature,
                        commitment = ?status.and_then(|s| s.confirmation_status),
                        "Transaction not yet finalized"
                    );
                }
                Err(LedgerError::Request(e)) => {
                    tracing::warn!(signature, error = %e, "Status poll failed, retrying");
                }
                Err(e) => return Err(e),
            }

            let elapsed = started.elapsed();
            if elapsed >= self.finalize_timeout {
                return Err(LedgerError::Timeout {
                    signature: signature.to_string(),
                    waited_secs: elapsed.as_secs(),
                });
            }

            let remaining = self.finalize_timeout - elapsed;
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}
