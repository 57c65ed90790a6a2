//! Cross-module scenarios over a directory-backed store.
//!
//! "A new process" is modelled by opening a fresh `Store` over the same
//! data directory.

use std::sync::Arc;

use prompt_enhancer::adapters::{FileStore, MemoryStore};
use prompt_enhancer::backup::{self, BackupDocument, FieldOutcome};
use prompt_enhancer::domain::{find_by_prefix, Lookup};
use prompt_enhancer::{GeminiModel, HistoryEntry, Language, PromptTemplate, Settings, Store};

fn open(dir: &std::path::Path) -> Store {
    Store::open(Arc::new(FileStore::new(dir)))
}

// ---------------------------------------------------------------------------
// Persistence across processes
// ---------------------------------------------------------------------------

#[test]
fn history_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir should be created");

    let store = open(dir.path());
    assert!(store.history.entries().is_empty());

    store.history.append(HistoryEntry {
        id: "a".to_string(),
        original_prompt: "x".to_string(),
        enhanced_prompt: "y".to_string(),
        timestamp: 1000,
    });
    drop(store);

    let reopened = open(dir.path());
    let entries = reopened.history.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "a");
    assert_eq!(entries[0].original_prompt, "x");
    assert_eq!(entries[0].enhanced_prompt, "y");
    assert_eq!(entries[0].timestamp, 1000);
}

#[test]
fn settings_default_then_saved_record_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir should be created");

    let store = open(dir.path());
    assert_eq!(store.settings.current(), Settings::default());

    let saved = Settings {
        model: GeminiModel::Flash,
        system_instruction: "Y".to_string(),
        language: Language::En,
    };
    store.settings.save(saved.clone());

    assert_eq!(open(dir.path()).settings.current(), saved);
}

#[test]
fn seed_template_ids_survive_restart() {
    let dir = tempfile::tempdir().expect("tempdir should be created");

    let first = open(dir.path()).templates.templates();
    assert!(!first.is_empty());

    let second = open(dir.path()).templates.templates();
    assert_eq!(first, second);

    // A short id shown by one run still selects the template in the next
    let short = &first[0].id[..8];
    let templates = open(dir.path()).templates.templates();
    assert_eq!(find_by_prefix(&templates, short), Lookup::Found(&first[0]));
}

#[test]
fn corrupt_file_does_not_prevent_startup() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    std::fs::write(
        dir.path().join("gemini-prompt-enhancer-history.json"),
        "{ this is not json",
    )
    .expect("write should succeed");

    let store = open(dir.path());
    assert!(store.history.is_empty());

    // The next mutation overwrites the corrupt value
    store.history.append(HistoryEntry::new("x", "y"));
    assert_eq!(open(dir.path()).history.len(), 1);
}

#[test]
fn quota_failure_keeps_session_state() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = Store::open(Arc::new(FileStore::new(dir.path()).with_quota(64)));

    store.history.append(HistoryEntry::new("x".repeat(200), "y"));
    assert_eq!(store.history.len(), 1);

    // Nothing made it to disk
    assert!(open(dir.path()).history.is_empty());
}

// ---------------------------------------------------------------------------
// Export / import laws
// ---------------------------------------------------------------------------

#[test]
fn export_then_import_reproduces_state() {
    let source = Store::open(Arc::new(MemoryStore::new()));
    source.history.append(HistoryEntry::new("first", "first enhanced"));
    source.history.append(HistoryEntry::new("second", "second enhanced"));
    source
        .templates
        .add(PromptTemplate::new("Mine", "my body").expect("template should be valid"));
    source.settings.save(Settings {
        model: GeminiModel::Flash,
        system_instruction: "custom".to_string(),
        language: Language::En,
    });

    let exported = backup::export(&source).expect("export should succeed");
    let before = BackupDocument::snapshot(&source);

    // Mutate after exporting, then restore
    source.history.clear();
    source.templates.replace_all(Vec::new());
    source.settings.save(Settings::default());

    let report = backup::import(&source, &exported, |_| true)
        .expect("import should decode")
        .expect("import should be confirmed");
    assert_eq!(report.history, FieldOutcome::Applied(2));
    assert_eq!(BackupDocument::snapshot(&source), before);

    // A different store importing the same document ends up identical
    let target = Store::open(Arc::new(MemoryStore::new()));
    backup::import(&target, &exported, |_| true).expect("import should decode");
    assert_eq!(BackupDocument::snapshot(&target), before);

    // Exporting again reproduces the same document
    assert_eq!(backup::export(&target).expect("export should succeed"), exported);
}

#[test]
fn imported_state_is_persisted() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let store = open(dir.path());

    let document = serde_json::json!({
        "history": [
            { "id": "h1", "originalPrompt": "x", "enhancedPrompt": "y", "timestamp": 5 }
        ],
        "templates": [
            { "id": "t1", "title": "T", "prompt": "P" }
        ]
    });
    backup::import(&store, &document.to_string(), |_| true).expect("import should decode");

    let reopened = open(dir.path());
    assert_eq!(reopened.history.entries()[0].id, "h1");
    assert_eq!(reopened.templates.templates().len(), 1);
    assert_eq!(reopened.settings.current(), Settings::default());
}

#[test]
fn original_web_backup_imports() {
    let store = Store::open(Arc::new(MemoryStore::new()));
    let document = r#"{
        "history": [],
        "templates": [],
        "settings": {
            "geminiModel": "gemini-2.5-flash",
            "systemInstruction": "legacy",
            "language": "it"
        }
    }"#;

    backup::import(&store, document, |_| true).expect("import should decode");
    let settings = store.settings.current();
    assert_eq!(settings.model, GeminiModel::Flash);
    assert_eq!(settings.system_instruction, "legacy");
    assert!(store.templates.is_empty());
}
