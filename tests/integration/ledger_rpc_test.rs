//! Asset publisher against a mocked Solana JSON-RPC node

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use mintflow_common::{AssetFields, ContentRef};
use mintflow_ledger::mock::MockSigner;
use mintflow_ledger::{
    AssetPublisher, Cluster, LedgerConfig, LedgerError, LedgerServiceFactory, MintError,
};
use wiremock::matchers::{body_partial_json, method};
use wiremock::Mock;

fn ledger_config(rpc_url: String) -> LedgerConfig {
    LedgerConfig {
        provider: "rpc".to_string(),
        cluster: Cluster::Devnet,
        rpc_url,
        finalize_timeout: Duration::from_secs(2),
        poll_interval: Duration::from_millis(10),
        request_timeout: Duration::from_secs(5),
    }
}

fn publisher(config: &LedgerConfig) -> AssetPublisher {
    let ledger = LedgerServiceFactory::create(config).unwrap();
    AssetPublisher::new(Arc::from(ledger), config)
}

fn metadata_ref() -> ContentRef {
    ContentRef::from_gateway(GATEWAY, METADATA_HASH).unwrap()
}

async fn rpc_calls(env: &TestEnv, rpc_method: &str) -> Vec<serde_json::Value> {
    env.rpc
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).ok())
        .filter(|body| body["method"] == rpc_method)
        .collect()
}

// LRPC-01: the signed transaction is submitted as base64 and polled until finalized
#[test_log::test(tokio::test)]
async fn test_polls_until_finalized() {
    let env = TestEnv::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(
            serde_json::json!({"method": "getSignatureStatuses"}),
        ))
        .respond_with(rpc_result(serde_json::json!({
            "context": {"slot": 3},
            "value": [null]
        })))
        .up_to_n_times(1)
        .mount(&env.rpc)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(
            serde_json::json!({"method": "getSignatureStatuses"}),
        ))
        .respond_with(rpc_result(serde_json::json!({
            "context": {"slot": 4},
            "value": [{
                "slot": 4,
                "confirmations": 1,
                "err": null,
                "confirmationStatus": "confirmed"
            }]
        })))
        .up_to_n_times(1)
        .mount(&env.rpc)
        .await;
    env.mount_ledger(finalized_status()).await;

    let config = ledger_config(env.rpc.uri());
    let signer = MockSigner::connected("Creator1111111111111111111111111111111111111");
    let minted = publisher(&config)
        .mint(
            Some(&signer),
            &metadata_ref(),
            &AssetFields::new("Sunset", "SUN", "An evening"),
        )
        .await
        .unwrap();

    assert_eq!(minted.signature, SIGNATURE);
    assert_eq!(minted.cluster, Cluster::Devnet);
    assert_eq!(minted.record.name, "Sunset");
    assert_eq!(minted.record.creators[0].share, 100);

    let sends = rpc_calls(&env, "sendTransaction").await;
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0]["params"][1]["encoding"], "base64");
    assert!(!sends[0]["params"][0].as_str().unwrap().is_empty());

    assert_eq!(rpc_calls(&env, "getSignatureStatuses").await.len(), 3);
}

// LRPC-02: a JSON-RPC error on submission fails the mint without polling
#[test_log::test(tokio::test)]
async fn test_send_rpc_error() {
    let env = TestEnv::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(
            serde_json::json!({"method": "getLatestBlockhash"}),
        ))
        .respond_with(rpc_result(serde_json::json!({
            "context": {"slot": 1},
            "value": {"blockhash": BLOCKHASH, "lastValidBlockHeight": 100}
        })))
        .mount(&env.rpc)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(
            serde_json::json!({"method": "sendTransaction"}),
        ))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32002, "message": "Blockhash not found"}
            }),
        ))
        .mount(&env.rpc)
        .await;

    let config = ledger_config(env.rpc.uri());
    let signer = MockSigner::connected("Creator1111111111111111111111111111111111111");
    let err = publisher(&config)
        .mint(Some(&signer), &metadata_ref(), &AssetFields::default())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        MintError::Submit(LedgerError::Rpc {
            code: -32002,
            message: "Blockhash not found".to_string()
        })
    );
    assert!(rpc_calls(&env, "getSignatureStatuses").await.is_empty());
}

// LRPC-03: an unreachable node fails the mint with a request error
#[test_log::test(tokio::test)]
async fn test_unreachable_node() {
    let config = ledger_config("http://127.0.0.1:9".to_string());
    let signer = MockSigner::connected("Creator1111111111111111111111111111111111111");
    let err = publisher(&config)
        .mint(Some(&signer), &metadata_ref(), &AssetFields::default())
        .await
        .unwrap_err();

    assert!(matches!(err, MintError::Submit(LedgerError::Request(_))));
    assert!(signer.signed_requests().is_empty());
}
