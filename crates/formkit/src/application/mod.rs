//! Application layer
//!
//! Orchestrates the domain engines for builder and fill-in modes.

pub mod library;
pub mod session;

pub use library::FormLibrary;
pub use session::{FieldView, FormSession};
