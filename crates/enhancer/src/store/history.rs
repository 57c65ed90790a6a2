//! History Collection - completed enhancements, most recent first

use std::collections::VecDeque;
use std::sync::Arc;

use crate::domain::HistoryEntry;
use crate::ports::KeyValueStore;
use crate::store::PersistentCollection;

pub const HISTORY_KEY: &str = "gemini-prompt-enhancer-history";

/// Reverse-chronological history, kept in order by prepending
pub struct HistoryCollection {
    inner: PersistentCollection<VecDeque<HistoryEntry>>,
}

impl HistoryCollection {
    pub fn hydrate(backing: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: PersistentCollection::hydrate(backing, HISTORY_KEY, VecDeque::new),
        }
    }

    /// Prepend an entry
    ///
    /// An older entry carrying the same id is dropped so ids stay unique.
    /// The prepend is O(1); the id check scans the history once, which the
    /// write-through serialization of the whole collection already does.
    pub fn append(&self, entry: HistoryEntry) {
        self.inner.mutate(|mut entries| {
            if let Some(pos) = entries.iter().position(|e| e.id == entry.id) {
                entries.remove(pos);
            }
            entries.push_front(entry);
            entries
        });
    }

    /// Remove the entry with `id`. Returns false when there was none.
    pub fn remove_by_id(&self, id: &str) -> bool {
        let mut removed = false;
        self.inner.mutate(|mut entries| {
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                entries.remove(pos);
                removed = true;
            }
            entries
        });
        removed
    }

    pub fn clear(&self) {
        self.inner.replace(VecDeque::new());
    }

    /// Replace the whole history (used by import)
    pub fn replace_all(&self, entries: Vec<HistoryEntry>) {
        self.inner.replace(entries.into());
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.inner.read(|entries| entries.iter().cloned().collect())
    }

    pub fn find(&self, id: &str) -> Option<HistoryEntry> {
        self.inner
            .read(|entries| entries.iter().find(|e| e.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.inner.read(|entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
