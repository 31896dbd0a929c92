//! Value Objects module
//!
//! Field definitions, validation rules and derived-field specs.

pub mod field;
pub mod formula;
pub mod rule;

pub use field::{FieldDefinition, FieldType, SelectOption};
pub use formula::{DerivedSpec, Formula};
pub use rule::{RuleKind, RuleParam, ValidationRule};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current values of a form, keyed by field id
pub type FormDataMap = HashMap<String, serde_json::Value>;

/// A user-facing validation failure for a single field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field_id: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field_id, self.message)
    }
}
