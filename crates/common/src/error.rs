//! Common error types and handling for Mintflow

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type shared by the Mintflow crates
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
