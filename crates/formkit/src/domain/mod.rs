//! Domain module
//!
//! Schema model, validation engine and derived-field engine.

pub mod aggregates;
pub mod services;
pub mod value_objects;

pub use aggregates::*;
pub use services::*;
pub use value_objects::*;
