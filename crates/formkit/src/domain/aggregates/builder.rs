//! Form Builder Aggregate
//!
//! The editable draft behind builder mode. Every mutation is applied to a
//! candidate field list and checked before it is committed, so a rejected
//! edit leaves the draft as it was.

use tracing::debug;

use super::{check_fields, FormSchema, SchemaError};
use crate::config::FormsConfig;
use crate::domain::value_objects::FieldDefinition;

#[derive(Clone, Debug, Default)]
pub struct FormBuilder {
    name: String,
    fields: Vec<FieldDefinition>,
    strict_formulas: bool,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &FormsConfig) -> Self {
        Self { strict_formulas: config.strict_formulas, ..Self::default() }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn fields(&self) -> &[FieldDefinition] { &self.fields }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Append a field; its order becomes the next position
    pub fn add_field(&mut self, mut field: FieldDefinition) -> Result<&FieldDefinition, SchemaError> {
        field.order = self.fields.len() as u32;
        let mut candidate = self.fields.clone();
        candidate.push(field);
        self.commit(candidate)?;
        debug!(field_count = self.fields.len(), "Field added to draft");
        Ok(&self.fields[self.fields.len() - 1])
    }

    /// Replace the field with the same id, keeping its position
    pub fn update_field(&mut self, mut field: FieldDefinition) -> Result<(), SchemaError> {
        let index = self.position(&field.id)?;
        field.order = index as u32;
        let mut candidate = self.fields.clone();
        candidate[index] = field;
        self.commit(candidate)
    }

    /// Remove a field and renumber the rest
    pub fn remove_field(&mut self, id: &str) -> Result<FieldDefinition, SchemaError> {
        let index = self.position(id)?;
        let mut candidate = self.fields.clone();
        let removed = candidate.remove(index);
        renumber(&mut candidate);
        self.commit(candidate)?;
        Ok(removed)
    }

    /// Reorder to the given id sequence, which must name every field once
    pub fn reorder_fields<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<(), SchemaError> {
        if ids.len() != self.fields.len() {
            return Err(SchemaError::ReorderMismatch);
        }
        let mut remaining = self.fields.clone();
        let mut candidate = Vec::with_capacity(ids.len());
        for id in ids {
            let index = remaining
                .iter()
                .position(|f| f.id == id.as_ref())
                .ok_or(SchemaError::ReorderMismatch)?;
            candidate.push(remaining.swap_remove(index));
        }
        renumber(&mut candidate);
        self.commit(candidate)
    }

    /// Discard the draft
    pub fn clear(&mut self) {
        self.name.clear();
        self.fields.clear();
    }

    /// Load a saved schema into the draft for editing
    pub fn edit(&mut self, schema: &FormSchema) {
        self.name = schema.name().to_string();
        self.fields = schema.sorted_fields();
    }

    /// Freeze the draft into a new schema
    pub fn build(&self) -> Result<FormSchema, SchemaError> {
        FormSchema::create(self.name.clone(), self.fields.clone(), self.strict_formulas)
    }

    fn position(&self, id: &str) -> Result<usize, SchemaError> {
        self.fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| SchemaError::UnknownField(id.to_string()))
    }

    fn commit(&mut self, candidate: Vec<FieldDefinition>) -> Result<(), SchemaError> {
        check_fields(&candidate, self.strict_formulas)?;
        self.fields = candidate;
        Ok(())
    }
}

fn renumber(fields: &mut [FieldDefinition]) {
    for (index, field) in fields.iter_mut().enumerate() {
        field.order = index as u32;
    }
}
