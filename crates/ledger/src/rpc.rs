//! Solana JSON-RPC Client Implementation
//!
//! Speaks JSON-RPC 2.0 to a Solana node using the three methods needed to
//! land a transaction: `getLatestBlockhash`, `sendTransaction` and
//! `getSignatureStatuses`.

use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{LedgerConfig, LedgerError, LedgerService, SignatureStatus};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// `{ context, value }` envelope used by most RPC results
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhash {
    blockhash: String,
}

/// Solana JSON-RPC client
pub struct SolanaRpcClient {
    http: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LedgerError::Configuration(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::debug!(method, id = request.id, "Sending Solana RPC request");

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(LedgerError::Request(format!(
                "Solana RPC returned {}: {}",
                status, body
            )));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::Malformed(format!("Failed to parse {} response: {}", method, e)))?;

        if let Some(error) = body.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        body.result
            .ok_or_else(|| LedgerError::Malformed(format!("{} response has no result", method)))
    }
}

#[async_trait::async_trait]
impl LedgerService for SolanaRpcClient {
    async fn latest_blockhash(&self) -> Result<String, LedgerError> {
        let result: WithContext<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                serde_json::json!([{ "commitment": "finalized" }]),
            )
            .await?;
        Ok(result.value.blockhash)
    }

    async fn send_transaction(&self, transaction: &str) -> Result<String, LedgerError> {
        let signature: String = self
            .call(
                "sendTransaction",
                serde_json::json!([
                    transaction,
                    { "encoding": "base64", "preflightCommitment": "finalized" }
                ]),
            )
            .await?;

        if signature.is_empty() {
            return Err(LedgerError::Malformed(
                "sendTransaction returned an empty signature".to_string(),
            ));
        }
        Ok(signature)
    }

    async fn signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        let result: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                serde_json::json!([[signature], { "searchTransactionHistory": true }]),
            )
            .await?;
        Ok(result.value.into_iter().next().flatten())
    }
}
