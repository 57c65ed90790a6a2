//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the core interacts with external
//! collaborators: the durable key/value backing and the generation backend.
//!
//! Implementations of these traits live in `adapters`.

mod key_value_store;
mod prompt_enhancer;

pub use key_value_store::*;
pub use prompt_enhancer::*;
