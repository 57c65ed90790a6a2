//! Key/Value Store Port
//!
//! Abstract interface for the durable backing that persistent collections
//! write through to. Best-effort, synchronous, string-valued.

use crate::domain::errors::StorageError;

/// Durable string key/value backing
///
/// Each persistent collection is the only writer of its own key, so
/// implementations need no cross-key coordination.
pub trait KeyValueStore: Send + Sync {
    /// Read a key. `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a key, replacing any previous value
    ///
    /// Fails with `StorageError::QuotaExceeded` when the store has a
    /// capacity limit and the write would exceed it.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Human-readable location of the store (for diagnostics)
    fn describe(&self) -> String;
}
