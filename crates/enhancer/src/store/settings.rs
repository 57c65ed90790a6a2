//! Settings Record - the singleton user configuration

use std::sync::Arc;

use crate::domain::Settings;
use crate::ports::KeyValueStore;
use crate::store::PersistentCollection;

pub const SETTINGS_KEY: &str = "gemini-prompt-enhancer-settings";

pub struct SettingsRecord {
    inner: PersistentCollection<Settings>,
}

impl SettingsRecord {
    pub fn hydrate(backing: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: PersistentCollection::hydrate(backing, SETTINGS_KEY, Settings::default),
        }
    }

    pub fn current(&self) -> Settings {
        self.inner.get()
    }

    /// Replace all settings at once
    pub fn save(&self, settings: Settings) -> Settings {
        self.inner.replace(settings)
    }

    pub fn restore_default_instruction(&self) -> Settings {
        self.inner.mutate(Settings::with_default_instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::{GeminiModel, Language, DEFAULT_SYSTEM_INSTRUCTION};

    #[test]
    fn test_defaults_when_absent() {
        let settings = SettingsRecord::hydrate(Arc::new(MemoryStore::new()));
        assert_eq!(settings.current(), Settings::default());
    }

    #[test]
    fn test_save_then_rehydrate() {
        let backing = Arc::new(MemoryStore::new());
        let settings = SettingsRecord::hydrate(backing.clone());

        let saved = Settings {
            model: GeminiModel::Flash,
            system_instruction: "Y".to_string(),
            language: Language::En,
        };
        settings.save(saved.clone());

        let reloaded = SettingsRecord::hydrate(backing);
        assert_eq!(reloaded.current(), saved);
    }

    #[test]
    fn test_corrupt_settings_default() {
        let backing = Arc::new(MemoryStore::new());
        backing.set(SETTINGS_KEY, "{broken").unwrap();
        let settings = SettingsRecord::hydrate(backing);
        assert_eq!(settings.current(), Settings::default());
    }

    #[test]
    fn test_restore_default_instruction() {
        let backing = Arc::new(MemoryStore::new());
        let settings = SettingsRecord::hydrate(backing.clone());
        settings.save(Settings {
            model: GeminiModel::Flash,
            system_instruction: "custom".to_string(),
            language: Language::En,
        });

        let restored = settings.restore_default_instruction();
        assert_eq!(restored.system_instruction, DEFAULT_SYSTEM_INSTRUCTION);
        assert_eq!(restored.model, GeminiModel::Flash);
        assert_eq!(restored.language, Language::En);
        assert_eq!(SettingsRecord::hydrate(backing).current(), restored);
    }
}
