//! Domain Errors
//!
//! Error types for storage, codec, validation and generation failures.

use thiserror::Error;

/// Failure of the durable key/value backing
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl StorageError {
    pub fn io<K: AsRef<str>>(key: K, source: std::io::Error) -> Self {
        Self::Io {
            key: key.as_ref().to_string(),
            source,
        }
    }
}

/// Serialization or deserialization failure
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to encode value: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode value: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Not a backup document: {0}")]
    NotADocument(String),
}

/// Template rejected before it reaches a collection
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Template title cannot be empty")]
    EmptyTitle,

    #[error("Template prompt cannot be empty")]
    EmptyPrompt,
}

/// Generation call failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,

    #[error("Failed to enhance prompt: {0}")]
    Backend(String),

    #[error("The model returned an empty response.")]
    EmptyResponse,

    #[error("The request timed out after {0} seconds.")]
    Timeout(u64),
}
