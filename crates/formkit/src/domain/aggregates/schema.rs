//! Form Schema Aggregate
//!
//! A saved form. Fields are frozen at creation; a schema only leaves the
//! collection by explicit deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{check_fields, SchemaError};
use crate::domain::value_objects::{FieldDefinition, FieldType};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "FormSchemaRecord")]
pub struct FormSchema {
    id: String,
    name: String,
    fields: Vec<FieldDefinition>,
    created_at: DateTime<Utc>,
}

impl FormSchema {
    /// Create a schema from fields already in display order
    pub fn new(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Result<Self, SchemaError> {
        Self::create(name.into(), fields, false)
    }

    pub(crate) fn create(
        name: String,
        fields: Vec<FieldDefinition>,
        strict_formulas: bool,
    ) -> Result<Self, SchemaError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        if fields.is_empty() {
            return Err(SchemaError::NoFields);
        }
        check_fields(&fields, strict_formulas)?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            fields,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a schema read back from storage.
    ///
    /// Storage order of the field list is incidental; display order is
    /// restored from each field's `order` before the invariants are checked.
    pub fn from_stored(mut stored: FormSchema) -> Result<Self, SchemaError> {
        stored.fields.sort_by_key(|f| f.order);
        check_fields(&stored.fields, false)?;
        Ok(stored)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn fields(&self) -> &[FieldDefinition] { &self.fields }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }

    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Fields sorted by their `order` attribute
    pub fn sorted_fields(&self) -> Vec<FieldDefinition> {
        let mut fields = self.fields.clone();
        fields.sort_by_key(|f| f.order);
        fields
    }

    pub fn derived_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.is_derived)
    }

    /// Number of fields per type, for saved-form summaries
    pub fn field_type_counts(&self) -> BTreeMap<FieldType, usize> {
        let mut counts = BTreeMap::new();
        for field in &self.fields {
            *counts.entry(field.field_type).or_insert(0) += 1;
        }
        counts
    }
}

/// Stored shape of a [`FormSchema`]; only reachable through `TryFrom`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormSchemaRecord {
    id: String,
    name: String,
    fields: Vec<FieldDefinition>,
    created_at: DateTime<Utc>,
}

impl TryFrom<FormSchemaRecord> for FormSchema {
    type Error = SchemaError;

    fn try_from(record: FormSchemaRecord) -> Result<Self, Self::Error> {
        FormSchema::from_stored(FormSchema {
            id: record.id,
            name: record.name,
            fields: record.fields,
            created_at: record.created_at,
        })
    }
}
