//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - HistoryEntry: A completed enhancement
//! - PromptTemplate: A reusable named prompt
//! - Settings: Model, system instruction and language

mod history_entry;
mod prompt_template;
mod settings;

pub use history_entry::*;
pub use prompt_template::*;
pub use settings::*;
