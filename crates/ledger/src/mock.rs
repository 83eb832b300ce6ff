//! Mock Ledger and Signer Implementations
//!
//! Programmable mocks for testing mint workflows:
//! - `MockLedgerService`: in-memory ledger with transaction recording
//! - `MockLedgerBehavior`: controls outcome, delay and how many polls precede finality
//! - `MockSigner`: wallet stand-in that encodes the creation request instead of signing it

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::{
    Commitment, CreationRequest, LedgerError, LedgerService, SignatureStatus, SignedCreation,
    Signer, SignerError,
};

pub const MOCK_BLOCKHASH: &str = "MockBlockhash11111111111111111111111111111";

/// What outcome the mock ledger should produce
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockLedgerOutcome {
    /// Accept and eventually finalize the transaction
    #[default]
    Finalize,
    /// Accept the transaction, then report it failed on-chain
    Reject,
    /// Accept the transaction but never finalize it
    NeverFinalize,
    /// Fail every call as if the node could not be reached
    Unreachable,
}

/// Programmable behavior for the mock ledger
#[derive(Debug, Clone)]
pub struct MockLedgerBehavior {
    pub outcome: Arc<RwLock<MockLedgerOutcome>>,
    pub delay_ms: Arc<RwLock<u64>>,
    /// Status polls answered with `confirmed` before `finalized`
    pub polls_before_finalized: Arc<RwLock<u32>>,
}

impl Default for MockLedgerBehavior {
    fn default() -> Self {
        Self {
            outcome: Arc::new(RwLock::new(MockLedgerOutcome::Finalize)),
            delay_ms: Arc::new(RwLock::new(0)),
            polls_before_finalized: Arc::new(RwLock::new(0)),
        }
    }
}

impl MockLedgerBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_outcome(&self, outcome: MockLedgerOutcome) {
        *self.outcome.write().unwrap_or_else(|e| e.into_inner()) = outcome;
    }

    /// Delay applied to `sendTransaction`
    pub fn set_delay_ms(&self, delay: u64) {
        *self.delay_ms.write().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    pub fn set_polls_before_finalized(&self, polls: u32) {
        *self
            .polls_before_finalized
            .write()
            .unwrap_or_else(|e| e.into_inner()) = polls;
    }

    pub fn reset(&self) {
        self.set_outcome(MockLedgerOutcome::Finalize);
        self.set_delay_ms(0);
        self.set_polls_before_finalized(0);
    }

    pub fn get_outcome(&self) -> MockLedgerOutcome {
        self.outcome.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn get_delay_ms(&self) -> u64 {
        *self.delay_ms.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_polls_before_finalized(&self) -> u32 {
        *self
            .polls_before_finalized
            .read()
            .unwrap_or_else(|e| e.into_inner())
    }
}

/// A transaction received by the mock ledger
#[derive(Debug, Clone)]
pub struct RecordedTransaction {
    pub transaction: String,
    pub signature: String,
}

/// Mock ledger service with programmable behavior
#[derive(Debug, Clone)]
pub struct MockLedgerService {
    behavior: Arc<MockLedgerBehavior>,
    history: Arc<Mutex<Vec<RecordedTransaction>>>,
    polls: Arc<Mutex<HashMap<String, u32>>>,
}

impl Default for MockLedgerService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedgerService {
    pub fn new() -> Self {
        Self::with_behavior(Arc::new(MockLedgerBehavior::new()))
    }

    pub fn with_behavior(behavior: Arc<MockLedgerBehavior>) -> Self {
        Self {
            behavior,
            history: Arc::new(Mutex::new(Vec::new())),
            polls: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn behavior(&self) -> &Arc<MockLedgerBehavior> {
        &self.behavior
    }

    /// Transactions submitted so far
    pub fn recorded_transactions(&self) -> Vec<RecordedTransaction> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of status polls made for a signature
    pub fn poll_count(&self, signature: &str) -> u32 {
        self.polls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(signature)
            .copied()
            .unwrap_or(0)
    }

    fn unreachable_check(&self) -> Result<(), LedgerError> {
        if self.behavior.get_outcome() == MockLedgerOutcome::Unreachable {
            return Err(LedgerError::Request(
                "HTTP request failed: mock connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LedgerService for MockLedgerService {
    async fn latest_blockhash(&self) -> Result<String, LedgerError> {
        self.unreachable_check()?;
        Ok(MOCK_BLOCKHASH.to_string())
    }

    async fn send_transaction(&self, transaction: &str) -> Result<String, LedgerError> {
        self.unreachable_check()?;

        let delay_ms = self.behavior.get_delay_ms();
        if delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
        }

        let signature = hex::encode(Sha256::digest(transaction.as_bytes()));
        tracing::info!(signature = %signature, "Mock ledger: received transaction");

        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedTransaction {
                transaction: transaction.to_string(),
                signature: signature.clone(),
            });

        Ok(signature)
    }

    async fn signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, LedgerError> {
        self.unreachable_check()?;

        let known = self
            .history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|tx| tx.signature == signature);
        if !known {
            return Ok(None);
        }

        let polls = {
            let mut polls = self.polls.lock().unwrap_or_else(|e| e.into_inner());
            let count = polls.entry(signature.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let status = match self.behavior.get_outcome() {
            MockLedgerOutcome::Reject => SignatureStatus {
                slot: 1,
                confirmation_status: Some(Commitment::Processed),
                err: Some(serde_json::json!({"InstructionError": [0, "InvalidAccountData"]})),
            },
            MockLedgerOutcome::NeverFinalize => SignatureStatus {
                slot: 1,
                confirmation_status: Some(Commitment::Confirmed),
                err: None,
            },
            _ if polls <= self.behavior.get_polls_before_finalized() => SignatureStatus {
                slot: u64::from(polls),
                confirmation_status: Some(Commitment::Confirmed),
                err: None,
            },
            _ => SignatureStatus {
                slot: u64::from(polls),
                confirmation_status: Some(Commitment::Finalized),
                err: None,
            },
        };

        Ok(Some(status))
    }
}

/// Wallet stand-in for tests and local development
#[derive(Debug, Clone)]
pub struct MockSigner {
    public_key: Option<String>,
    reject_with: Option<String>,
    counter: Arc<AtomicU64>,
    requests: Arc<Mutex<Vec<CreationRequest>>>,
}

impl MockSigner {
    /// A connected signer with the given public key
    pub fn connected(public_key: impl Into<String>) -> Self {
        Self {
            public_key: Some(public_key.into()),
            reject_with: None,
            counter: Arc::new(AtomicU64::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A signer whose wallet is not connected
    pub fn disconnected() -> Self {
        Self {
            public_key: None,
            ..Self::connected(String::new())
        }
    }

    /// A connected signer that declines every request
    pub fn rejecting(public_key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            reject_with: Some(reason.into()),
            ..Self::connected(public_key)
        }
    }

    /// Creation requests the signer was asked to sign
    pub fn signed_requests(&self) -> Vec<CreationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl Signer for MockSigner {
    fn public_key(&self) -> Option<String> {
        self.public_key.clone()
    }

    async fn sign_asset_creation(
        &self,
        request: &CreationRequest,
    ) -> Result<SignedCreation, SignerError> {
        if self.public_key.is_none() {
            return Err(SignerError::Disconnected);
        }
        if let Some(reason) = &self.reject_with {
            return Err(SignerError::Rejected(reason.clone()));
        }

        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let asset_address = format!("MockAsset{}{}", n, uuid::Uuid::new_v4().simple());
        let payload = serde_json::json!({
            "assetAddress": asset_address,
            "recentBlockhash": request.recent_blockhash,
            "record": request.record,
        });

        Ok(SignedCreation {
            asset_address,
            transaction: STANDARD.encode(payload.to_string()),
        })
    }
}
