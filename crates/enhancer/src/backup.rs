//! Backup - export and import of the whole state as one JSON document
//!
//! Export snapshots all three collections. Import validates each top-level
//! field on its own and applies only the fields that have the right shape;
//! everything else is left untouched.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::domain::{errors::CodecError, HistoryEntry, PromptTemplate, Settings};
use crate::store::{codec, Store};

pub const BACKUP_FILE_NAME: &str = "prompt-enhancer-backup.json";
pub const BACKUP_MIME_TYPE: &str = "application/json";

/// The exported document: exactly three top-level fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupDocument {
    pub history: Vec<HistoryEntry>,
    pub templates: Vec<PromptTemplate>,
    pub settings: Settings,
}

impl BackupDocument {
    pub fn snapshot(store: &Store) -> Self {
        Self {
            history: store.history.entries(),
            templates: store.templates.templates(),
            settings: store.settings.current(),
        }
    }
}

/// Serialize the current state. Never mutates anything.
pub fn export(store: &Store) -> Result<String, CodecError> {
    codec::encode_pretty(&BackupDocument::snapshot(store))
}

/// Result of validating one field of an import document
#[derive(Debug, Clone, PartialEq)]
pub enum FieldCheck<T> {
    Valid(T),
    Missing,
    Invalid(String),
}

impl<T> FieldCheck<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldCheck::Valid(_))
    }
}

/// What happened to one field when a plan was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Replaced the collection; carries the number of records
    Applied(usize),
    Missing,
    Rejected(String),
}

impl FieldOutcome {
    fn from_check<T>(check: &FieldCheck<T>, count: impl FnOnce(&T) -> usize) -> Self {
        match check {
            FieldCheck::Valid(value) => FieldOutcome::Applied(count(value)),
            FieldCheck::Missing => FieldOutcome::Missing,
            FieldCheck::Invalid(reason) => FieldOutcome::Rejected(reason.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub history: FieldOutcome,
    pub templates: FieldOutcome,
    pub settings: FieldOutcome,
}

/// A decoded import document, validated field by field
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    pub history: FieldCheck<Vec<HistoryEntry>>,
    pub templates: FieldCheck<Vec<PromptTemplate>>,
    pub settings: FieldCheck<Settings>,
}

impl ImportPlan {
    /// Decode `text` and check each field
    ///
    /// Fails only when the text is not a JSON object at all. A field with
    /// the wrong shape becomes `FieldCheck::Invalid` instead.
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let document: Value = codec::decode(text)?;
        let fields = document
            .as_object()
            .ok_or_else(|| CodecError::NotADocument("expected a JSON object".to_string()))?;

        Ok(Self {
            history: check_history(fields.get("history")),
            templates: check_templates(fields.get("templates")),
            settings: check_settings(fields.get("settings")),
        })
    }

    /// True when no field would be applied
    pub fn is_empty(&self) -> bool {
        !self.history.is_valid() && !self.templates.is_valid() && !self.settings.is_valid()
    }

    /// Replace every collection whose field is valid
    pub fn apply(self, store: &Store) -> ImportReport {
        let report = ImportReport {
            history: FieldOutcome::from_check(&self.history, Vec::len),
            templates: FieldOutcome::from_check(&self.templates, Vec::len),
            settings: FieldOutcome::from_check(&self.settings, |_| 1),
        };

        if let FieldCheck::Valid(history) = self.history {
            store.history.replace_all(history);
        }
        if let FieldCheck::Valid(templates) = self.templates {
            store.templates.replace_all(templates);
        }
        if let FieldCheck::Valid(settings) = self.settings {
            store.settings.save(settings);
        }

        for (field, outcome) in [
            ("history", &report.history),
            ("templates", &report.templates),
            ("settings", &report.settings),
        ] {
            match outcome {
                FieldOutcome::Applied(count) => info!(field, count, "Imported field"),
                FieldOutcome::Missing => info!(field, "Field absent from import; left unchanged"),
                FieldOutcome::Rejected(reason) => {
                    warn!(field, %reason, "Skipped malformed import field")
                }
            }
        }

        report
    }
}

/// Decode, confirm, apply
///
/// `confirm` sees the validated plan before anything changes. Returns
/// `Ok(None)` when the caller declines.
pub fn import(
    store: &Store,
    text: &str,
    confirm: impl FnOnce(&ImportPlan) -> bool,
) -> Result<Option<ImportReport>, CodecError> {
    let plan = ImportPlan::parse(text)?;
    if !confirm(&plan) {
        info!("Import declined; no changes made");
        return Ok(None);
    }
    Ok(Some(plan.apply(store)))
}

// ============================================
// Field validation
// ============================================

fn check_history(value: Option<&Value>) -> FieldCheck<Vec<HistoryEntry>> {
    match check_array::<HistoryEntry>(value) {
        FieldCheck::Valid(entries) => {
            match first_duplicate(entries.iter().map(|e| e.id.as_str())) {
                Some(id) => FieldCheck::Invalid(format!("duplicate history id '{}'", id)),
                None => FieldCheck::Valid(entries),
            }
        }
        other => other,
    }
}

fn check_templates(value: Option<&Value>) -> FieldCheck<Vec<PromptTemplate>> {
    match check_array::<PromptTemplate>(value) {
        FieldCheck::Valid(templates) => {
            if let Some(id) = first_duplicate(templates.iter().map(|t| t.id.as_str())) {
                return FieldCheck::Invalid(format!("duplicate template id '{}'", id));
            }
            if let Some((template, err)) = templates
                .iter()
                .find_map(|t| t.validate().err().map(|e| (t, e)))
            {
                return FieldCheck::Invalid(format!("template '{}': {}", template.id, err));
            }
            FieldCheck::Valid(templates)
        }
        other => other,
    }
}

fn check_settings(value: Option<&Value>) -> FieldCheck<Settings> {
    match value {
        None | Some(Value::Null) => FieldCheck::Missing,
        Some(v @ Value::Object(_)) => deserialize_field(v),
        Some(_) => FieldCheck::Invalid("expected an object".to_string()),
    }
}

fn check_array<T: DeserializeOwned>(value: Option<&Value>) -> FieldCheck<Vec<T>> {
    match value {
        None | Some(Value::Null) => FieldCheck::Missing,
        Some(v @ Value::Array(_)) => deserialize_field(v),
        Some(_) => FieldCheck::Invalid("expected an array".to_string()),
    }
}

fn deserialize_field<T: DeserializeOwned>(value: &Value) -> FieldCheck<T> {
    match T::deserialize(value) {
        Ok(parsed) => FieldCheck::Valid(parsed),
        Err(e) => FieldCheck::Invalid(e.to_string()),
    }
}

fn first_duplicate<'a>(ids: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    ids.into_iter().find(|id| !seen.insert(*id))
}
