//! Domain Layer
//!
//! Pure domain logic without infrastructure dependencies.
//! Contains entities, value objects, seed data, and errors.

pub mod entities;
pub mod errors;
pub mod lookup;
pub mod seeds;
pub mod value_objects;

// Re-exports for convenience
pub use entities::*;
pub use errors::*;
pub use lookup::{find_by_prefix, Identified, Lookup};
pub use value_objects::*;
