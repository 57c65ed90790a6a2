//! Collection Codec - typed values to and from JSON text

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::errors::CodecError;

/// Compact encoding used for the backing store
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(CodecError::Encode)
}

/// Indented encoding used for exported documents
pub fn encode_pretty<T: Serialize>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string_pretty(value).map_err(CodecError::Encode)
}

pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Decode)
}
