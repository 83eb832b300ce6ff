//! Shared utilities, configuration, and error handling for Mintflow
//!
//! This crate provides common functionality used across the publish pipeline:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Asset fields shared by the metadata and mint stages
//! - Content references (gateway URLs for pinned content)
//! - Pipeline stage identifiers and state machine errors

pub mod asset;
pub mod config;
pub mod content_ref;
pub mod error;
pub mod stage;
pub mod state;

pub use asset::AssetFields;
pub use config::Config;
pub use content_ref::ContentRef;
pub use error::{Error, Result};
pub use stage::PipelineStage;
pub use state::StateError;
