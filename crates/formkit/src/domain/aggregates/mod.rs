//! Aggregates module
//!
//! `FormSchema` is the frozen, saved form; `FormBuilder` is the editable draft.
//! Both go through [`check_fields`] so every schema in the system satisfies
//! the same structural invariants.

pub mod builder;
pub mod schema;

pub use builder::FormBuilder;
pub use schema::FormSchema;

use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::warn;

use crate::domain::value_objects::{FieldDefinition, FieldType};

/// Structural invariant violation, raised when a schema edit is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate field id: {0}")]
    DuplicateId(String),

    #[error("field {field} has an empty label")]
    EmptyLabel { field: String },

    #[error("{field_type} field {field} needs at least one option")]
    MissingOptions { field: String, field_type: FieldType },

    #[error("field {field} derived flag does not match its derived config")]
    DerivedFlagMismatch { field: String },

    #[error("default value of {field_type} field {field} has the wrong shape")]
    DefaultTypeMismatch { field: String, field_type: FieldType },

    #[error("derived field {field} lists itself as a parent")]
    SelfReference { field: String },

    #[error("derived field {field} references unknown parent {parent}")]
    UnknownParent { field: String, parent: String },

    #[error("derived field {field} references derived field {parent}")]
    ParentIsDerived { field: String, parent: String },

    #[error("derived field {field} has unrecognized formula {formula:?}")]
    UnrecognizedFormula { field: String, formula: String },

    #[error("field {field} has order {found}, expected {expected}")]
    NonContiguousOrder { field: String, expected: u32, found: u32 },

    #[error("field not found: {0}")]
    UnknownField(String),

    #[error("reorder must list every field exactly once")]
    ReorderMismatch,

    #[error("form name is empty")]
    EmptyName,

    #[error("form has no fields")]
    NoFields,
}

/// Check the invariants of an ordered field list.
///
/// `fields` must already be in display order: the n-th field carries
/// `order == n`. With `strict_formulas` set, a derived spec whose formula is
/// not recognized is rejected instead of merely logged.
pub fn check_fields(fields: &[FieldDefinition], strict_formulas: bool) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(fields.len());
    for (position, field) in fields.iter().enumerate() {
        if !seen.insert(field.id.as_str()) {
            return Err(SchemaError::DuplicateId(field.id.clone()));
        }
        field.check()?;

        let expected = position as u32;
        if field.order != expected {
            return Err(SchemaError::NonContiguousOrder {
                field: field.id.clone(),
                expected,
                found: field.order,
            });
        }
    }

    let by_id: HashMap<&str, &FieldDefinition> =
        fields.iter().map(|f| (f.id.as_str(), f)).collect();

    for field in fields {
        let Some(spec) = field.derived_spec() else { continue };

        for parent in spec.parent_fields() {
            if parent == &field.id {
                return Err(SchemaError::SelfReference { field: field.id.clone() });
            }
            match by_id.get(parent.as_str()) {
                None => {
                    return Err(SchemaError::UnknownParent {
                        field: field.id.clone(),
                        parent: parent.clone(),
                    })
                }
                Some(p) if p.is_derived => {
                    return Err(SchemaError::ParentIsDerived {
                        field: field.id.clone(),
                        parent: parent.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        if !spec.intent().is_recognized() {
            if strict_formulas {
                return Err(SchemaError::UnrecognizedFormula {
                    field: field.id.clone(),
                    formula: spec.formula().to_string(),
                });
            }
            warn!(field = %field.id, formula = spec.formula(), "Unrecognized formula, field will compute empty");
        }
    }

    Ok(())
}
