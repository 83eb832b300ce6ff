//! Publishing domain: the image → metadata → mint pipeline

pub mod domain;
pub mod workflow;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{AssetDraft, PublishSnapshot, StageFlags, StageSignal};
pub use domain::state::{PublishEvent, PublishState, PublishStateMachine};
pub use mintflow_common::StateError;

pub use workflow::PublishWorkflow;
