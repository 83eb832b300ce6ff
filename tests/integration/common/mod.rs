//! Common test utilities for integration tests
//!
//! Stands up HTTP mocks for the Pinata API and a Solana RPC node, and builds
//! a `PublishWorkflow` wired to them through the application composition root.

#![allow(dead_code)]

use mintflow_common::Config;
use mintflow_pinning::ImageBlob;
use mintflow_publishing::PublishWorkflow;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";
pub const SECRET_API_KEY: &str = "test-secret-key"; // pragma: allowlist secret
pub const GATEWAY: &str = "https://gateway.test";

pub const IMAGE_HASH: &str = "QmImageHash1111111111111111111111111111111111";
pub const METADATA_HASH: &str = "QmMetaHash22222222222222222222222222222222222";
pub const BLOCKHASH: &str = "RecentBlockhash1111111111111111111111111111";
pub const SIGNATURE: &str = "5igNaTuRe111111111111111111111111111111111111";

/// Mock Pinata API and Solana RPC node
pub struct TestEnv {
    pub pinata: MockServer,
    pub rpc: MockServer,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self {
            pinata: MockServer::start().await,
            rpc: MockServer::start().await,
        }
    }

    /// Configuration pointing both providers at the mock servers
    pub fn config(&self) -> Config {
        Config {
            pinning_provider: "pinata".to_string(),
            pinata_api_key: Some(API_KEY.to_string()),
            pinata_secret_api_key: Some(SECRET_API_KEY.to_string()),
            pinata_base_url: self.pinata.uri(),
            ipfs_gateway_url: GATEWAY.to_string(),
            ledger_provider: "rpc".to_string(),
            solana_cluster: "devnet".to_string(),
            solana_rpc_url: Some(self.rpc.uri()),
            mint_finalize_timeout_secs: 2,
            mint_poll_interval_ms: 10,
            http_timeout_secs: 5,
            ..Config::default()
        }
    }

    pub fn workflow(&self) -> PublishWorkflow {
        self.workflow_with(self.config())
    }

    pub fn workflow_with(&self, config: Config) -> PublishWorkflow {
        mintflow_app::create_workflow(&config).expect("workflow should build from test config")
    }

    pub async fn mount_image_pin(&self) {
        Mock::given(method("POST"))
            .and(path("/pinning/pinFileToIPFS"))
            .and(header("pinata_api_key", API_KEY))
            .and(header("pinata_secret_api_key", SECRET_API_KEY))
            .respond_with(pin_response(IMAGE_HASH))
            .mount(&self.pinata)
            .await;
    }

    pub async fn mount_metadata_pin(&self) {
        Mock::given(method("POST"))
            .and(path("/pinning/pinJSONToIPFS"))
            .and(header("pinata_api_key", API_KEY))
            .respond_with(pin_response(METADATA_HASH))
            .mount(&self.pinata)
            .await;
    }

    /// Solana node that accepts the transaction and reports it finalized
    pub async fn mount_ledger(&self, status_after_send: serde_json::Value) {
        Mock::given(method("POST"))
            .and(body_partial_json(
                serde_json::json!({"method": "getLatestBlockhash"}),
            ))
            .respond_with(rpc_result(serde_json::json!({
                "context": {"slot": 1},
                "value": {"blockhash": BLOCKHASH, "lastValidBlockHeight": 100}
            })))
            .mount(&self.rpc)
            .await;

        Mock::given(method("POST"))
            .and(body_partial_json(
                serde_json::json!({"method": "sendTransaction"}),
            ))
            .respond_with(rpc_result(serde_json::json!(SIGNATURE)))
            .mount(&self.rpc)
            .await;

        Mock::given(method("POST"))
            .and(body_partial_json(
                serde_json::json!({"method": "getSignatureStatuses"}),
            ))
            .respond_with(rpc_result(serde_json::json!({
                "context": {"slot": 5},
                "value": [status_after_send]
            })))
            .mount(&self.rpc)
            .await;
    }

    pub async fn pinata_requests(&self) -> usize {
        self.pinata
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or_default()
    }

    pub async fn pinata_requests_to(&self, route: &str) -> usize {
        self.pinata
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    }
}

pub fn pin_response(hash: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "IpfsHash": hash,
        "PinSize": 1234,
        "Timestamp": "2024-01-01T00:00:00.000Z"
    }))
}

pub fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result
    }))
}

pub fn finalized_status() -> serde_json::Value {
    serde_json::json!({
        "slot": 4,
        "confirmations": null,
        "err": null,
        "confirmationStatus": "finalized"
    })
}

pub fn png_blob() -> ImageBlob {
    ImageBlob::new(
        mintflow_pinning::test_support::sample_png(16, 16),
        "asset.png",
        "image/png",
    )
}
