//! Mock Pinning Service Implementation
//!
//! Programmable mock for testing upload workflows:
//! - `MockPinningService`: content-addressed in-memory pinning with request recording
//! - `MockPinningBehavior`: controls outcome and delay, with one-shot queued outcomes
//! - `MockPinOutcome`: Pin, ServerError, Unauthorized, Unreachable, or EmptyHash

use crate::{FileUpload, PinResponse, PinningError, PinningService};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};

/// What outcome the mock should produce
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockPinOutcome {
    /// Pin the content and return its hash
    #[default]
    Pin,
    /// Respond as if the provider returned HTTP 500
    ServerError,
    /// Respond as if credentials were rejected
    Unauthorized,
    /// Fail as if the provider could not be reached
    Unreachable,
    /// Respond with an empty IpfsHash
    EmptyHash,
}

/// Programmable behavior for the mock pinning service
#[derive(Debug, Clone)]
pub struct MockPinningBehavior {
    pub outcome: Arc<RwLock<MockPinOutcome>>,
    pub delay_ms: Arc<RwLock<u64>>,
    pub queued: Arc<Mutex<VecDeque<MockPinOutcome>>>,
}

impl Default for MockPinningBehavior {
    fn default() -> Self {
        Self {
            outcome: Arc::new(RwLock::new(MockPinOutcome::Pin)),
            delay_ms: Arc::new(RwLock::new(0)),
            queued: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

impl MockPinningBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the outcome used when no queued outcome is pending
    pub fn set_outcome(&self, outcome: MockPinOutcome) {
        *self.outcome.write().unwrap_or_else(|e| e.into_inner()) = outcome;
    }

    /// Configure delay before responding
    pub fn set_delay_ms(&self, delay: u64) {
        *self.delay_ms.write().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    /// Queue an outcome for the next call only
    pub fn push_outcome(&self, outcome: MockPinOutcome) {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }

    /// Reset to default behavior
    pub fn reset(&self) {
        self.set_outcome(MockPinOutcome::Pin);
        self.set_delay_ms(0);
        self.queued.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Read current default outcome
    pub fn get_outcome(&self) -> MockPinOutcome {
        self.outcome.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Read current delay
    pub fn get_delay_ms(&self) -> u64 {
        *self.delay_ms.read().unwrap_or_else(|e| e.into_inner())
    }

    fn next_outcome(&self) -> MockPinOutcome {
        self.queued
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.get_outcome())
    }
}

/// What kind of content a recorded request carried
#[derive(Debug, Clone, PartialEq)]
pub enum PinnedContent {
    File {
        file_name: String,
        media_type: String,
        size: usize,
    },
    Json(serde_json::Value),
}

/// A recorded pin request for test assertions
#[derive(Debug, Clone)]
pub struct RecordedPin {
    pub content: PinnedContent,
    /// Hash returned to the caller, if the call succeeded
    pub ipfs_hash: Option<String>,
}

/// Mock pinning service with programmable behavior
#[derive(Debug, Clone)]
pub struct MockPinningService {
    behavior: Arc<MockPinningBehavior>,
    history: Arc<Mutex<Vec<RecordedPin>>>,
}

impl Default for MockPinningService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPinningService {
    pub fn new() -> Self {
        Self::with_behavior(Arc::new(MockPinningBehavior::new()))
    }

    pub fn with_behavior(behavior: Arc<MockPinningBehavior>) -> Self {
        Self {
            behavior,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the shared behavior for external configuration
    pub fn behavior(&self) -> &Arc<MockPinningBehavior> {
        &self.behavior
    }

    /// Get recorded pin requests
    pub fn recorded_pins(&self) -> Vec<RecordedPin> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of pin requests received, successful or not
    pub fn call_count(&self) -> usize {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Deterministic CIDv0-shaped hash of the content
    pub fn content_hash(bytes: &[u8]) -> String {
        let digest = hex::encode(Sha256::digest(bytes));
        format!("Qm{}", &digest[..44])
    }

    async fn respond(
        &self,
        content: PinnedContent,
        bytes: &[u8],
    ) -> Result<PinResponse, PinningError> {
        let outcome = self.behavior.next_outcome();
        let delay_ms = self.behavior.get_delay_ms();

        if delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
        }

        let result = match outcome {
            MockPinOutcome::Pin => Ok(PinResponse {
                ipfs_hash: Self::content_hash(bytes),
                pin_size: Some(bytes.len() as u64),
                timestamp: None,
            }),
            MockPinOutcome::ServerError => Err(PinningError::Response(
                "Pinata API returned 500 Internal Server Error: mock failure".to_string(),
            )),
            MockPinOutcome::Unauthorized => Err(PinningError::Unauthorized(
                "Pinata rejected credentials (401 Unauthorized): mock".to_string(),
            )),
            MockPinOutcome::Unreachable => Err(PinningError::Request(
                "HTTP request failed: mock connection refused".to_string(),
            )),
            MockPinOutcome::EmptyHash => Err(PinningError::Malformed(
                "Response contained an empty IpfsHash".to_string(),
            )),
        };

        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedPin {
                content,
                ipfs_hash: result.as_ref().ok().map(|r| r.ipfs_hash.clone()),
            });

        result
    }
}

#[async_trait::async_trait]
impl PinningService for MockPinningService {
    async fn pin_file(&self, file: FileUpload) -> Result<PinResponse, PinningError> {
        tracing::info!(file_name = %file.file_name, "Mock pinning: received file");
        let content = PinnedContent::File {
            file_name: file.file_name.clone(),
            media_type: file.media_type.clone(),
            size: file.bytes.len(),
        };
        self.respond(content, &file.bytes).await
    }

    async fn pin_json(&self, document: serde_json::Value) -> Result<PinResponse, PinningError> {
        tracing::info!("Mock pinning: received JSON document");
        let bytes = serde_json::to_vec(&document)
            .map_err(|e| PinningError::InvalidInput(format!("Unserializable document: {}", e)))?;
        self.respond(PinnedContent::Json(document), &bytes).await
    }
}
