//! Template Collection - user prompt templates, in insertion order

use std::sync::Arc;

use crate::domain::{seeds::seed_templates, PromptTemplate};
use crate::ports::KeyValueStore;
use crate::store::PersistentCollection;

pub const TEMPLATES_KEY: &str = "gemini-prompt-enhancer-templates";

/// Append-only list of valid templates, editable by id
///
/// Values reach the collection through `PromptTemplate::new` or
/// `PromptTemplate::edited`, which reject blank titles and prompts.
pub struct TemplateCollection {
    inner: PersistentCollection<Vec<PromptTemplate>>,
}

impl TemplateCollection {
    /// Load stored templates, or the built-in seeds when none were stored
    ///
    /// Seeds are stored as soon as they are minted so their ids stay the
    /// same across restarts.
    pub fn hydrate(backing: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: PersistentCollection::hydrate_seeded(backing, TEMPLATES_KEY, seed_templates),
        }
    }

    /// Append a template. One already carrying the same id is replaced in place.
    pub fn add(&self, template: PromptTemplate) {
        self.inner.mutate(|mut templates| {
            match templates.iter_mut().find(|t| t.id == template.id) {
                Some(slot) => *slot = template,
                None => templates.push(template),
            }
            templates
        });
    }

    /// Replace the template with the same id. Returns false when there was none.
    pub fn update(&self, template: PromptTemplate) -> bool {
        let mut updated = false;
        self.inner.mutate(|mut templates| {
            if let Some(slot) = templates.iter_mut().find(|t| t.id == template.id) {
                *slot = template;
                updated = true;
            }
            templates
        });
        updated
    }

    pub fn remove_by_id(&self, id: &str) -> bool {
        let mut removed = false;
        self.inner.mutate(|mut templates| {
            if let Some(pos) = templates.iter().position(|t| t.id == id) {
                templates.remove(pos);
                removed = true;
            }
            templates
        });
        removed
    }

    /// Replace all templates (used by import)
    pub fn replace_all(&self, templates: Vec<PromptTemplate>) {
        self.inner.replace(templates);
    }

    pub fn templates(&self) -> Vec<PromptTemplate> {
        self.inner.get()
    }

    pub fn find(&self, id: &str) -> Option<PromptTemplate> {
        self.inner
            .read(|templates| templates.iter().find(|t| t.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.inner.read(|templates| templates.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
