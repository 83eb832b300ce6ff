//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Pinning credentials are
//! optional: when absent, uploads fail with an authorization error
//! instead of the process refusing to start.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_PINATA_BASE_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_IPFS_GATEWAY_URL: &str = "https://ipfs.io";
pub const DEFAULT_SOLANA_CLUSTER: &str = "devnet";
pub const DEFAULT_FINALIZE_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pinning service
    pub pinning_provider: String,
    pub pinata_api_key: Option<String>,
    pub pinata_secret_api_key: Option<String>,
    pub pinata_base_url: String,
    pub ipfs_gateway_url: String,

    /// Ledger
    pub ledger_provider: String,
    pub solana_cluster: String,
    pub solana_rpc_url: Option<String>,
    pub mint_finalize_timeout_secs: u64,
    pub mint_poll_interval_ms: u64,

    /// Runtime configuration
    pub http_timeout_secs: u64,
    pub log_format: String,
    pub rust_log: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("pinning_provider", &self.pinning_provider)
            .field(
                "pinata_api_key",
                &self.pinata_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "pinata_secret_api_key",
                &self.pinata_secret_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("pinata_base_url", &self.pinata_base_url)
            .field("ipfs_gateway_url", &self.ipfs_gateway_url)
            .field("ledger_provider", &self.ledger_provider)
            .field("solana_cluster", &self.solana_cluster)
            .field("solana_rpc_url", &self.solana_rpc_url)
            .field("mint_finalize_timeout_secs", &self.mint_finalize_timeout_secs)
            .field("mint_poll_interval_ms", &self.mint_poll_interval_ms)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("log_format", &self.log_format)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pinning_provider: "pinata".to_string(),
            pinata_api_key: None,
            pinata_secret_api_key: None,
            pinata_base_url: DEFAULT_PINATA_BASE_URL.to_string(),
            ipfs_gateway_url: DEFAULT_IPFS_GATEWAY_URL.to_string(),
            ledger_provider: "rpc".to_string(),
            solana_cluster: DEFAULT_SOLANA_CLUSTER.to_string(),
            solana_rpc_url: None,
            mint_finalize_timeout_secs: DEFAULT_FINALIZE_TIMEOUT_SECS,
            mint_poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            log_format: "pretty".to_string(),
            rust_log: "mintflow=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Self::default();

        let config = Self {
            pinning_provider: env::var("PINNING_PROVIDER").unwrap_or(defaults.pinning_provider),
            pinata_api_key: non_empty_var("PINATA_API_KEY"),
            pinata_secret_api_key: non_empty_var("PINATA_SECRET_API_KEY"),
            pinata_base_url: env::var("PINATA_BASE_URL").unwrap_or(defaults.pinata_base_url),
            ipfs_gateway_url: env::var("IPFS_GATEWAY_URL").unwrap_or(defaults.ipfs_gateway_url),

            ledger_provider: env::var("LEDGER_PROVIDER").unwrap_or(defaults.ledger_provider),
            solana_cluster: env::var("SOLANA_CLUSTER").unwrap_or(defaults.solana_cluster),
            solana_rpc_url: non_empty_var("SOLANA_RPC_URL"),
            mint_finalize_timeout_secs: parse_var(
                "MINT_FINALIZE_TIMEOUT_SECS",
                defaults.mint_finalize_timeout_secs,
            )?,
            mint_poll_interval_ms: parse_var("MINT_POLL_INTERVAL_MS", defaults.mint_poll_interval_ms)?,

            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
            rust_log: env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        };

        if config.mint_poll_interval_ms == 0 {
            return Err(Error::Configuration(
                "MINT_POLL_INTERVAL_MS must be greater than zero".to_string(),
            ));
        }

        if !config.has_pinning_credentials() {
            tracing::warn!("Pinata credentials are not configured; uploads will be rejected");
        }

        Ok(config)
    }

    /// Whether both pinning credentials are present
    pub fn has_pinning_credentials(&self) -> bool {
        self.pinata_api_key.is_some() && self.pinata_secret_api_key.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| {
                Error::Configuration(format!(
                    "{} must be a non-negative integer, got '{}'",
                    name, raw
                ))
            }),
        Err(_) => Ok(default),
    }
}
