//! Persistent Collection
//!
//! One typed value kept in memory and written through to a single key of
//! the durable backing on every mutation.

use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, warn};

use crate::domain::errors::{CodecError, StorageError};
use crate::ports::KeyValueStore;
use crate::store::codec;

/// Write-through collection over one backing key
///
/// The in-memory value is authoritative. Backing writes are best-effort:
/// a failed write is logged and the mutation still stands.
pub struct PersistentCollection<T> {
    key: String,
    backing: Arc<dyn KeyValueStore>,
    value: Mutex<T>,
}

#[derive(Debug, thiserror::Error)]
enum PersistError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl<T> PersistentCollection<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Load the collection from its backing key
    ///
    /// Absent, unreadable or corrupt values fall back to `default`; none of
    /// these prevent startup.
    pub fn hydrate(
        backing: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        default: impl FnOnce() -> T,
    ) -> Self {
        let key = key.into();
        let value = match load(backing.as_ref(), &key) {
            Loaded::Stored(value) => value,
            Loaded::Absent | Loaded::Corrupt | Loaded::Unreadable => default(),
        };
        Self {
            key,
            backing,
            value: Mutex::new(value),
        }
    }

    /// Like `hydrate`, but a default standing in for an absent or corrupt
    /// value is written through at once
    ///
    /// Use this when `default` is not deterministic (fresh ids), so every
    /// later load sees the same value. An unreadable backing is left alone.
    pub fn hydrate_seeded(
        backing: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        default: impl FnOnce() -> T,
    ) -> Self {
        let key = key.into();
        let (value, write_back) = match load(backing.as_ref(), &key) {
            Loaded::Stored(value) => (value, false),
            Loaded::Absent | Loaded::Corrupt => (default(), true),
            Loaded::Unreadable => (default(), false),
        };
        let collection = Self {
            key,
            backing,
            value: Mutex::new(value),
        };
        if write_back {
            collection.write_through(&collection.get());
        }
        collection
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.lock().clone()
    }

    /// Borrow the current value without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    /// Apply `updater` to the current value and write the result through
    ///
    /// Mutations on one collection are serialized; the backing sees writes
    /// in the same order the in-memory value changed.
    pub fn mutate(&self, updater: impl FnOnce(T) -> T) -> T {
        let mut guard = self.lock();
        let next = updater(guard.clone());
        *guard = next.clone();
        self.write_through(&next);

        next
    }

    /// Replace the value wholesale
    pub fn replace(&self, value: T) -> T {
        self.mutate(|_| value)
    }

    fn write_through(&self, value: &T) {
        if let Err(e) = self.persist(value) {
            error!(key = %self.key, error = %e, "Failed to persist collection; keeping in-memory value");
        }
    }

    fn persist(&self, value: &T) -> Result<(), PersistError> {
        let text = codec::encode(value)?;
        self.backing.set(&self.key, &text)?;
        debug!(key = %self.key, bytes = text.len(), "Persisted collection");
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Loaded<T> {
    Stored(T),
    Absent,
    Corrupt,
    Unreadable,
}

fn load<T: DeserializeOwned>(backing: &dyn KeyValueStore, key: &str) -> Loaded<T> {
    let text = match backing.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!(key, "No stored value; using default");
            return Loaded::Absent;
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored value; using default");
            return Loaded::Unreadable;
        }
    };

    match codec::decode(&text) {
        Ok(value) => {
            debug!(key, "Hydrated collection");
            Loaded::Stored(value)
        }
        Err(e) => {
            warn!(key, error = %e, "Stored value is corrupt; using default");
            Loaded::Corrupt
        }
    }
}
