//! Mintflow Ledger Service
//!
//! Creates the on-chain asset record referencing pinned metadata:
//! - Solana JSON-RPC integration for production
//! - Mock ledger and signer for testing and development
//! - `AssetPublisher`, which builds the record, submits it and waits for finality

pub mod mock;
pub mod publisher;
pub mod record;
pub mod rpc;
pub mod signer;

use std::str::FromStr;
use std::time::Duration;

use mintflow_common::Config;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use publisher::{AssetPublisher, MintError, MintedAsset};
pub use record::{AssetRecord, Creator, SELLER_FEE_BASIS_POINTS};
pub use signer::{CreationRequest, SignedCreation, Signer, SignerError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Ledger configuration error: {0}")]
    Configuration(String),

    #[error("Ledger request error: {0}")]
    Request(String),

    #[error("Ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: String, reason: String },

    #[error("Transaction {signature} not finalized after {waited_secs}s")]
    Timeout { signature: String, waited_secs: u64 },

    #[error("Malformed ledger response: {0}")]
    Malformed(String),

    #[error(transparent)]
    Signer(#[from] SignerError),
}

/// Solana cluster the asset is minted on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::MainnetBeta => "mainnet-beta",
        }
    }

    /// Public RPC endpoint for the cluster
    pub fn default_rpc_url(&self) -> String {
        format!("https://api.{}.solana.com", self.as_str())
    }

    /// Explorer page for an address on this cluster
    pub fn explorer_url(&self, address: &str) -> String {
        format!(
            "https://explorer.solana.com/address/{}?cluster={}",
            address,
            self.as_str()
        )
    }
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            other => Err(LedgerError::Configuration(format!(
                "Unknown Solana cluster: {}. Supported clusters: devnet, testnet, mainnet-beta",
                other
            ))),
        }
    }
}

/// Transaction commitment levels, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

/// Status of a submitted transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmation_status: Option<Commitment>,
    pub err: Option<serde_json::Value>,
}

impl SignatureStatus {
    pub fn is_finalized(&self) -> bool {
        self.confirmation_status == Some(Commitment::Finalized)
    }
}

/// Ledger service configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Ledger provider (rpc, mock)
    pub provider: String,
    pub cluster: Cluster,
    pub rpc_url: String,
    /// Upper bound on the wait for finalized commitment
    pub finalize_timeout: Duration,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl LedgerConfig {
    /// Build ledger config from the application configuration
    pub fn from_config(config: &Config) -> Result<Self, LedgerError> {
        let cluster: Cluster = config.solana_cluster.parse()?;
        let rpc_url = config
            .solana_rpc_url
            .clone()
            .unwrap_or_else(|| cluster.default_rpc_url());

        Ok(Self {
            provider: config.ledger_provider.clone(),
            cluster,
            rpc_url,
            finalize_timeout: Duration::from_secs(config.mint_finalize_timeout_secs),
            poll_interval: Duration::from_millis(config.mint_poll_interval_ms),
            request_timeout: Duration::from_secs(config.http_timeout_secs),
        })
    }

    /// Create ledger config from environment variables
    pub fn from_env() -> Result<Self, LedgerError> {
        let config = Config::from_env().map_err(|e| LedgerError::Configuration(e.to_string()))?;
        Self::from_config(&config)
    }
}

/// Ledger RPC operations needed to create an asset
#[async_trait::async_trait]
pub trait LedgerService: Send + Sync {
    /// Recent blockhash the transaction must reference
    async fn latest_blockhash(&self) -> Result<String, LedgerError>;

    /// Submit a signed, base64-encoded transaction. Returns its signature.
    async fn send_transaction(&self, transaction: &str) -> Result<String, LedgerError>;

    /// Current status of a transaction, `None` if the ledger has not seen it
    async fn signature_status(&self, signature: &str)
        -> Result<Option<SignatureStatus>, LedgerError>;
}

/// Factory for creating LedgerService implementations
pub struct LedgerServiceFactory;

impl LedgerServiceFactory {
    pub fn create(config: &LedgerConfig) -> Result<Box<dyn LedgerService>, LedgerError> {
        match config.provider.as_str() {
            "rpc" => {
                tracing::info!(cluster = %config.cluster, rpc_url = %config.rpc_url, "Creating Solana RPC ledger service");
                Ok(Box::new(rpc::SolanaRpcClient::new(config)?))
            }
            "mock" => {
                tracing::info!("Creating mock ledger service");
                Ok(Box::new(mock::MockLedgerService::new()))
            }
            provider => Err(LedgerError::Configuration(format!(
                "Unknown ledger provider: {}. Supported providers: rpc, mock",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> LedgerConfig {
        LedgerConfig {
            provider: provider.to_string(),
            cluster: Cluster::Devnet,
            rpc_url: Cluster::Devnet.default_rpc_url(),
            finalize_timeout: Duration::from_secs(90),
            poll_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(30),
        }
    }

    // LED-U01: Cluster parsing and slugs
    #[test]
    fn test_cluster_parse() {
        assert_eq!("devnet".parse::<Cluster>().unwrap(), Cluster::Devnet);
        assert_eq!("Testnet".parse::<Cluster>().unwrap(), Cluster::Testnet);
        assert_eq!("mainnet".parse::<Cluster>().unwrap(), Cluster::MainnetBeta);
        assert_eq!(Cluster::MainnetBeta.to_string(), "mainnet-beta");
        assert!("localnet".parse::<Cluster>().is_err());
    }

    // LED-U02: explorer URL carries address and cluster parameter
    #[test]
    fn test_explorer_url() {
        assert_eq!(
            Cluster::Devnet.explorer_url("AssetAddr111"),
            "https://explorer.solana.com/address/AssetAddr111?cluster=devnet"
        );
    }

    // LED-U03: default RPC endpoints
    #[test]
    fn test_default_rpc_url() {
        assert_eq!(
            Cluster::Devnet.default_rpc_url(),
            "https://api.devnet.solana.com"
        );
        assert_eq!(
            Cluster::MainnetBeta.default_rpc_url(),
            "https://api.mainnet-beta.solana.com"
        );
    }

    // LED-U04: from_config resolves cluster, RPC override and timings
    #[test]
    fn test_from_config() {
        let app = Config {
            solana_cluster: "testnet".to_string(),
            solana_rpc_url: Some("http://localhost:8899".to_string()),
            mint_finalize_timeout_secs: 10,
            mint_poll_interval_ms: 250,
            ..Config::default()
        };
        let cfg = LedgerConfig::from_config(&app).unwrap();
        assert_eq!(cfg.cluster, Cluster::Testnet);
        assert_eq!(cfg.rpc_url, "http://localhost:8899");
        assert_eq!(cfg.finalize_timeout, Duration::from_secs(10));
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));

        let bad = Config {
            solana_cluster: "moon".to_string(),
            ..Config::default()
        };
        assert!(LedgerConfig::from_config(&bad).is_err());
    }

    // LED-U05: factory providers
    #[test]
    fn test_factory() {
        assert!(LedgerServiceFactory::create(&config("rpc")).is_ok());
        assert!(LedgerServiceFactory::create(&config("mock")).is_ok());
        let err = match LedgerServiceFactory::create(&config("evm")) {
            Err(e) => e,
            Ok(_) => panic!("Expected error for unknown provider"),
        };
        assert!(err.to_string().contains("Unknown ledger provider: evm"));
    }

    // LED-U06: signature status parses RPC shape
    #[test]
    fn test_signature_status_deserialize() {
        let status: SignatureStatus = serde_json::from_value(serde_json::json!({
            "slot": 72,
            "confirmations": null,
            "err": null,
            "confirmationStatus": "finalized"
        }))
        .unwrap();
        assert!(status.is_finalized());
        assert!(status.err.is_none());
        assert!(Commitment::Confirmed < Commitment::Finalized);
    }
}
