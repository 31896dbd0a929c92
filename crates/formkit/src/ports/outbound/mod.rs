//! Outbound ports
//!
//! Hexagonal architecture: the saved-forms collection lives behind this
//! interface so the engines never touch storage directly.

use thiserror::Error;

use crate::domain::aggregates::FormSchema;

/// Blob store for the saved-forms collection.
///
/// `load` returns schemas with their display order already reconstructed
/// from each field's `order`. Records that fail their invariants are
/// dropped from the result rather than failing the load.
pub trait FormStore: Send + Sync {
    /// Load every saved form; an absent collection loads as empty
    fn load(&self) -> Result<Vec<FormSchema>, StoreError>;

    /// Replace the saved collection
    fn save(&self, forms: &[FormSchema]) -> Result<(), StoreError>;
}

/// Store error type
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored form {id} is invalid: {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}
