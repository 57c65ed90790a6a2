//! HistoryEntry - One completed enhancement
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HistoryEntry - Record of a successful enhancement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub original_prompt: String,
    pub enhanced_prompt: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl HistoryEntry {
    /// Create a new entry with a fresh id, stamped now
    pub fn new(original_prompt: impl Into<String>, enhanced_prompt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            original_prompt: original_prompt.into(),
            enhanced_prompt: enhanced_prompt.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
