//! Adapters
//!
//! Concrete implementations of the ports: key/value backings and the
//! Gemini generation backend.

mod file_store;
mod gemini;
mod memory_store;

pub use file_store::FileStore;
pub use gemini::{wrap_user_prompt, GeminiEnhancer, DEFAULT_BASE_URL};
pub use memory_store::MemoryStore;
