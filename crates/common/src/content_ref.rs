//! Content references for pinned content
//!
//! A `ContentRef` is the gateway URL under which a content-addressed object
//! can be fetched, e.g. `https://ipfs.io/ipfs/{hash}`. It is never empty and
//! always an absolute http(s) URL.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Stable reference to a pinned object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentRef(String);

impl ContentRef {
    /// Create a content reference from a string, validating format
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(Error::Validation(
                "Content reference cannot be empty".to_string(),
            ));
        }

        let url = reqwest::Url::parse(&s)
            .map_err(|e| Error::Validation(format!("Invalid content reference '{}': {}", s, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Validation(format!(
                "Content reference must use http(s), got '{}'",
                url.scheme()
            )));
        }

        Ok(ContentRef(s))
    }

    /// Build the gateway URL for a content hash: `{gateway}/ipfs/{hash}`
    pub fn from_gateway(gateway: &str, content_hash: &str) -> Result<Self> {
        let hash = content_hash.trim();
        if hash.is_empty() {
            return Err(Error::Validation("Content hash cannot be empty".to_string()));
        }
        if hash.contains('/') {
            return Err(Error::Validation(format!(
                "Content hash contains a path separator: {}",
                hash
            )));
        }
        Self::new(format!("{}/ipfs/{}", gateway.trim_end_matches('/'), hash))
    }

    /// Get the raw URL string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ContentRef {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<ContentRef> for String {
    fn from(content_ref: ContentRef) -> Self {
        content_ref.0
    }
}

impl AsRef<str> for ContentRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
