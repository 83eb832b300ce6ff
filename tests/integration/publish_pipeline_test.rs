//! End-to-end publish pipeline tests against mocked Pinata and Solana endpoints

mod common;

use common::*;
use mintflow_common::{Config, PipelineStage};
use mintflow_ledger::mock::MockSigner;
use mintflow_publishing::{PublishState, StageSignal};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

// E2E-01: image → metadata → mint, refs flow from each stage into the next
#[test_log::test(tokio::test)]
async fn test_full_pipeline_over_http() {
    let env = TestEnv::start().await;
    env.mount_image_pin().await;
    env.mount_metadata_pin().await;
    env.mount_ledger(finalized_status()).await;

    let workflow = env.workflow();
    workflow.set_name("X");
    workflow.set_symbol("X");
    workflow.set_description("d");

    let state = workflow.select_image(png_blob()).await.unwrap();
    assert_eq!(state, PublishState::ImageReady);

    let snap = workflow.snapshot();
    let image_ref = snap.image_ref.clone().unwrap();
    assert_eq!(
        image_ref.as_str(),
        format!("{}/ipfs/{}", GATEWAY, IMAGE_HASH)
    );
    assert!(snap.can_upload_metadata);
    assert!(!snap.can_mint);
    assert_eq!(snap.preview.as_ref().unwrap().media_type, "image/png");

    let state = workflow.upload_metadata().await.unwrap();
    assert_eq!(state, PublishState::MetadataReady);

    let requests = env.pinata.received_requests().await.unwrap();
    let metadata_request = requests
        .iter()
        .find(|r| r.url.path() == "/pinning/pinJSONToIPFS")
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&metadata_request.body).unwrap();
    assert_eq!(
        document,
        serde_json::json!({
            "name": "X",
            "symbol": "X",
            "description": "d",
            "image": image_ref.as_str()
        })
    );

    let snap = workflow.snapshot();
    assert_eq!(
        snap.metadata_ref.as_ref().unwrap().as_str(),
        format!("{}/ipfs/{}", GATEWAY, METADATA_HASH)
    );
    assert!(snap.can_mint);

    let signer = MockSigner::connected("Creator1111111111111111111111111111111111111");
    let state = workflow.mint(Some(&signer)).await.unwrap();
    assert_eq!(state, PublishState::Minted);

    let signed = signer.signed_requests();
    assert_eq!(signed.len(), 1);
    assert_eq!(signed[0].recent_blockhash, BLOCKHASH);
    assert_eq!(
        signed[0].record.uri.as_str(),
        format!("{}/ipfs/{}", GATEWAY, METADATA_HASH)
    );

    let minted = workflow.snapshot().minted.unwrap();
    assert_eq!(minted.signature, SIGNATURE);
    assert_eq!(
        minted.explorer_url,
        format!(
            "https://explorer.solana.com/address/{}?cluster=devnet",
            minted.address
        )
    );
}

// E2E-02: metadata HTTP 500 keeps the image ref; retry does not re-upload the image
#[test_log::test(tokio::test)]
async fn test_metadata_failure_then_retry() {
    let env = TestEnv::start().await;
    env.mount_image_pin().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinJSONToIPFS"))
        .respond_with(ResponseTemplate::new(500).set_body_string("pinning backend down"))
        .up_to_n_times(1)
        .mount(&env.pinata)
        .await;
    env.mount_metadata_pin().await;

    let workflow = env.workflow();
    workflow.select_image(png_blob()).await.unwrap();
    let image_ref = workflow.snapshot().image_ref.unwrap();

    let state = workflow.upload_metadata().await.unwrap();
    match &state {
        PublishState::Failed { stage, cause } => {
            assert_eq!(*stage, PipelineStage::Metadata);
            assert!(cause.contains("500"));
        }
        other => panic!("expected metadata failure, got {}", other),
    }

    let snap = workflow.snapshot();
    assert_eq!(snap.image_ref.as_ref(), Some(&image_ref));
    assert!(!snap.can_mint);
    assert_eq!(snap.signal(PipelineStage::Metadata), StageSignal::Failed);
    assert_eq!(snap.signal(PipelineStage::Image), StageSignal::Idle);

    let state = workflow.retry(None).await.unwrap();
    assert_eq!(state, PublishState::MetadataReady);
    assert_eq!(env.pinata_requests_to("/pinning/pinFileToIPFS").await, 1);
    assert_eq!(env.pinata_requests_to("/pinning/pinJSONToIPFS").await, 2);
}

// E2E-03: absent credentials fail the image stage without any HTTP request
#[test_log::test(tokio::test)]
async fn test_missing_credentials() {
    let env = TestEnv::start().await;
    env.mount_image_pin().await;

    let workflow = env.workflow_with(Config {
        pinata_api_key: None,
        pinata_secret_api_key: None,
        ..env.config()
    });

    let state = workflow.select_image(png_blob()).await.unwrap();
    match state {
        PublishState::Failed { stage, cause } => {
            assert_eq!(stage, PipelineStage::Image);
            assert!(cause.contains("authorization"));
        }
        other => panic!("expected image failure, got {}", other),
    }
    assert_eq!(env.pinata_requests().await, 0);
    assert!(workflow.snapshot().image_ref.is_none());
}

// E2E-04: rejected credentials are reported as an authorization failure
#[test_log::test(tokio::test)]
async fn test_rejected_credentials() {
    let env = TestEnv::start().await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .expect(1)
        .mount(&env.pinata)
        .await;

    let workflow = env.workflow();
    let state = workflow.select_image(png_blob()).await.unwrap();
    assert_eq!(state.failed_stage(), Some(PipelineStage::Image));
    assert!(workflow.snapshot().failure().unwrap().1.contains("401"));
}

// E2E-05: a transaction that never finalizes fails the mint with its signature
#[test_log::test(tokio::test)]
async fn test_mint_finality_timeout() {
    let env = TestEnv::start().await;
    env.mount_image_pin().await;
    env.mount_metadata_pin().await;
    env.mount_ledger(serde_json::json!({
        "slot": 4,
        "confirmations": 3,
        "err": null,
        "confirmationStatus": "confirmed"
    }))
    .await;

    let workflow = env.workflow_with(Config {
        mint_finalize_timeout_secs: 1,
        ..env.config()
    });
    workflow.select_image(png_blob()).await.unwrap();
    workflow.upload_metadata().await.unwrap();

    let signer = MockSigner::connected("Creator1111111111111111111111111111111111111");
    let state = workflow.mint(Some(&signer)).await.unwrap();
    match state {
        PublishState::Failed { stage, cause } => {
            assert_eq!(stage, PipelineStage::Mint);
            assert!(cause.contains(SIGNATURE));
        }
        other => panic!("expected mint failure, got {}", other),
    }

    let snap = workflow.snapshot();
    assert!(snap.can_mint);
    assert!(snap.metadata_ref.is_some());
    assert!(snap.minted.is_none());
}

// E2E-06: an on-chain error fails the mint
#[test_log::test(tokio::test)]
async fn test_mint_transaction_error() {
    let env = TestEnv::start().await;
    env.mount_image_pin().await;
    env.mount_metadata_pin().await;
    env.mount_ledger(serde_json::json!({
        "slot": 4,
        "confirmations": null,
        "err": {"InstructionError": [0, {"Custom": 1}]},
        "confirmationStatus": "processed"
    }))
    .await;

    let workflow = env.workflow();
    workflow.select_image(png_blob()).await.unwrap();
    workflow.upload_metadata().await.unwrap();

    let signer = MockSigner::connected("Creator1111111111111111111111111111111111111");
    let state = workflow.mint(Some(&signer)).await.unwrap();
    match state {
        PublishState::Failed { stage, cause } => {
            assert_eq!(stage, PipelineStage::Mint);
            assert!(cause.contains("InstructionError"));
        }
        other => panic!("expected mint failure, got {}", other),
    }
}

// E2E-07: mint without a connected wallet never reaches the node
#[test_log::test(tokio::test)]
async fn test_mint_without_wallet() {
    let env = TestEnv::start().await;
    env.mount_image_pin().await;
    env.mount_metadata_pin().await;

    let workflow = env.workflow();
    workflow.select_image(png_blob()).await.unwrap();
    workflow.upload_metadata().await.unwrap();

    let state = workflow.mint(None).await.unwrap();
    assert_eq!(state.failed_stage(), Some(PipelineStage::Mint));
    assert!(env.rpc.received_requests().await.unwrap().is_empty());
}
