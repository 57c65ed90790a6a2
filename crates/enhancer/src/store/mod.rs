//! Persistent Store
//!
//! Three independently persisted collections (history, templates, settings)
//! over one durable key/value backing. Each collection is the only writer of
//! its own key.

pub mod codec;
mod collection;
mod history;
mod settings;
mod templates;

pub use collection::PersistentCollection;
pub use history::{HistoryCollection, HISTORY_KEY};
pub use settings::{SettingsRecord, SETTINGS_KEY};
pub use templates::{TemplateCollection, TEMPLATES_KEY};

use std::sync::Arc;

use crate::ports::KeyValueStore;

/// All application state, constructed once at startup and handed around
#[derive(Clone)]
pub struct Store {
    pub history: Arc<HistoryCollection>,
    pub templates: Arc<TemplateCollection>,
    pub settings: Arc<SettingsRecord>,
    backing: Arc<dyn KeyValueStore>,
}

impl Store {
    /// Hydrate every collection from `backing`
    pub fn open(backing: Arc<dyn KeyValueStore>) -> Self {
        Self {
            history: Arc::new(HistoryCollection::hydrate(backing.clone())),
            templates: Arc::new(TemplateCollection::hydrate(backing.clone())),
            settings: Arc::new(SettingsRecord::hydrate(backing.clone())),
            backing,
        }
    }

    /// Where the state lives, for display
    pub fn location(&self) -> String {
        self.backing.describe()
    }
}
