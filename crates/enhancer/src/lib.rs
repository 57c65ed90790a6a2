//! Prompt Enhancer Core Library
//!
//! Local state and request handling for a tool that rewrites rough prompts
//! into structured ones through an external generation backend.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain/`): Pure entities and rules
//!   - `entities/`: HistoryEntry, PromptTemplate, Settings
//!   - `value_objects/`: GeminiModel, Language
//!   - `errors/`: Storage, codec, validation and request errors
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `KeyValueStore`: durable string key/value backing
//!   - `PromptEnhancer`: the generation call
//!
//! - **Store** (`store/`): write-through persistent collections
//! - **Backup** (`backup`): whole-state export and partial-acceptance import
//! - **Controller** (`controller`): single-flight request state machine
//! - **Adapters** (`adapters/`): file and memory stores, Gemini client
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prompt_enhancer::{adapters::{FileStore, GeminiEnhancer}, RequestController, Store};
//!
//! let store = Store::open(Arc::new(FileStore::new("/tmp/prompt-enhancer")));
//! let controller = RequestController::new(Arc::new(GeminiEnhancer::new(api_key)), &store);
//! let outcome = controller.enhance("write a poem about rust").await;
//! ```

pub mod adapters;
pub mod backup;
pub mod controller;
pub mod domain;
pub mod ports;
pub mod store;

// Re-export commonly used types
pub use backup::{BackupDocument, FieldCheck, FieldOutcome, ImportPlan, ImportReport};
pub use controller::{ControllerSnapshot, Outcome, RequestController, RequestStatus, RequestTicket};
pub use domain::{
    CodecError, GeminiModel, HistoryEntry, Language, PromptTemplate, RequestError, Settings,
    StorageError, ValidationError, DEFAULT_SYSTEM_INSTRUCTION,
};
pub use ports::{KeyValueStore, PromptEnhancer};
pub use store::Store;
