//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod gemini_model;
mod language;

pub use gemini_model::*;
pub use language::*;
