//! Infrastructure layer
//!
//! Concrete implementations of the outbound ports.

pub mod persistence;

pub use persistence::{InMemoryFormStore, JsonFileStore};
