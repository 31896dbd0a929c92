//! Formkit Form Builder Core
//!
//! Build data-entry forms from typed fields, attach validation rules, and
//! define fields computed from other fields; then fill them in with live
//! validation and live derived values.
//!
//! ## Architecture
//!
//! - **Domain Layer**: field schema model, validation engine, derived-field engine
//! - **Application Layer**: form sessions (fill-in mode) and the saved-forms library
//! - **Ports Layer**: the `FormStore` persistence interface
//! - **Infrastructure Layer**: in-memory and JSON file stores
//!
//! ## Features
//! - Invariant-checked schemas (unique ids, contiguous order, no derived chains)
//! - Ordered rule evaluation with first-failure messages
//! - Age, concat and sum formulas recomputed on every edit

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports for convenience
pub use application::{FieldView, FormLibrary, FormSession};
pub use config::FormsConfig;
pub use domain::aggregates::{FormBuilder, FormSchema, SchemaError};
pub use domain::services::{Clock, DerivedFieldEngine, FixedClock, SystemClock, ValidationService};
pub use domain::value_objects::{
    formula::formula_templates, DerivedSpec, FieldDefinition, FieldType, FormDataMap, Formula,
    RuleKind, RuleParam, SelectOption, ValidationError, ValidationRule,
};
pub use infrastructure::{InMemoryFormStore, JsonFileStore};
pub use ports::outbound::{FormStore, StoreError};

use thiserror::Error;

// =============================================================================
// Engine entry points
// =============================================================================

/// Validate one field's value against its rules
pub fn validate_field(
    field: &FieldDefinition,
    value: Option<&serde_json::Value>,
    data: &FormDataMap,
) -> Option<String> {
    ValidationService::validate_field(field, value, data)
}

/// Validate every field, returning errors in field order
pub fn validate_form(fields: &[FieldDefinition], data: &FormDataMap) -> Vec<ValidationError> {
    ValidationService::validate_form(fields, data)
}

/// Compute one derived field against the system clock
pub fn calculate_derived_field(field: &FieldDefinition, data: &FormDataMap) -> serde_json::Value {
    DerivedFieldEngine::new().calculate(field, data)
}

/// Recompute every derived field against the system clock
pub fn update_derived_fields(fields: &[FieldDefinition], data: &FormDataMap) -> FormDataMap {
    DerivedFieldEngine::new().update(fields, data)
}

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum FormsError {
    #[error("Form not found")]
    FormNotFound,

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Validation failed with {} error(s)", .0.len())]
    ValidationFailed(Vec<ValidationError>),
}

pub type Result<T> = std::result::Result<T, FormsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use serde_json::json;

    fn derived(id: &str, parents: &[&str], formula: &str) -> FieldDefinition {
        FieldDefinition::with_id(id, FieldType::Text, id)
            .derived_from(DerivedSpec::new(parents.iter().copied(), formula))
    }

    #[test]
    fn test_entry_points() {
        let fields = vec![
            FieldDefinition::with_id("dob", FieldType::Date, "Birth date").required(),
            FieldDefinition::with_id("qty", FieldType::Number, "Qty"),
            FieldDefinition::with_id("extra", FieldType::Text, "Extra"),
            derived("age", &["dob"], "age = current_year - birth_year"),
            derived("total", &["qty", "extra"], "sum = qty + extra"),
        ];
        let mut data = FormDataMap::new();
        data.insert("dob".into(), json!("2000-06-15"));
        data.insert("qty".into(), json!(3));
        data.insert("extra".into(), json!("4.5"));

        let updated = update_derived_fields(&fields, &data);
        assert_eq!(updated["age"], json!(i64::from(chrono::Local::now().year()) - 2000));
        assert_eq!(updated["total"].as_f64(), Some(7.5));
        assert_eq!(calculate_derived_field(&fields[4], &data).as_f64(), Some(7.5));

        assert!(validate_form(&fields, &updated).is_empty());
        assert_eq!(
            validate_field(&fields[0], Some(&json!("")), &updated),
            Some("Birth date is required".to_string())
        );
    }

    #[test]
    fn test_error_display() {
        let err = FormsError::ValidationFailed(vec![ValidationError::new("a", "A is required")]);
        assert_eq!(err.to_string(), "Validation failed with 1 error(s)");

        let err: FormsError = SchemaError::DuplicateId("a".into()).into();
        assert_eq!(err.to_string(), "Schema error: duplicate field id: a");
    }
}
