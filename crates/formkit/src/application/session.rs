//! Form Session
//!
//! Fill-in mode for one form: current values, current errors, and the
//! engines applied to them. Calls are expected one at a time, one per user
//! input event.

use serde_json::Value;
use tracing::debug;

use crate::domain::aggregates::{FormBuilder, FormSchema};
use crate::domain::services::{is_empty_value, DerivedFieldEngine, ValidationService};
use crate::domain::value_objects::{FieldDefinition, FieldType, FormDataMap, ValidationError};
use crate::{FormsError, Result};

/// What the rendering layer needs to draw one field
#[derive(Clone, Debug, PartialEq)]
pub struct FieldView<'a> {
    pub field: &'a FieldDefinition,
    pub value: Option<&'a Value>,
    pub error: Option<&'a str>,
    /// Derived fields are never edited directly
    pub disabled: bool,
    pub helper_text: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct FormSession {
    schema_id: Option<String>,
    fields: Vec<FieldDefinition>,
    data: FormDataMap,
    errors: Vec<ValidationError>,
    engine: DerivedFieldEngine,
}

impl FormSession {
    /// Open a saved form
    pub fn open(schema: &FormSchema) -> Self {
        Self::open_with_engine(schema, DerivedFieldEngine::new())
    }

    pub fn open_with_engine(schema: &FormSchema, engine: DerivedFieldEngine) -> Self {
        let mut session = Self::empty(engine);
        session.load(schema);
        session
    }

    /// Preview the draft being built
    pub fn preview(builder: &FormBuilder) -> Self {
        let mut session = Self::empty(DerivedFieldEngine::new());
        session.install(None, builder.fields().to_vec());
        session
    }

    fn empty(engine: DerivedFieldEngine) -> Self {
        Self {
            schema_id: None,
            fields: vec![],
            data: FormDataMap::new(),
            errors: vec![],
            engine,
        }
    }

    /// Switch to another schema; values and errors start over
    pub fn load(&mut self, schema: &FormSchema) {
        self.install(Some(schema.id().to_string()), schema.sorted_fields());
    }

    fn install(&mut self, schema_id: Option<String>, mut fields: Vec<FieldDefinition>) {
        fields.sort_by_key(|f| f.order);
        self.schema_id = schema_id;
        self.fields = fields;
        self.reset();

        let seeded: FormDataMap = self
            .fields
            .iter()
            .filter_map(|f| {
                f.default_value
                    .as_ref()
                    .filter(|v| !is_empty_value(Some(*v)))
                    .map(|v| (f.id.clone(), seed_value(f, v)))
            })
            .collect();
        self.data = self.engine.update(&self.fields, &seeded);
        debug!(schema = ?self.schema_id, fields = self.fields.len(), "Form session loaded");
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Merge one value, then recompute every derived field. Does not validate.
    pub fn set_value(&mut self, field_id: &str, value: Value) {
        if !self.fields.iter().any(|f| f.id == field_id) {
            debug!(field = field_id, "Value set for a field outside the schema");
        }
        let mut merged = std::mem::take(&mut self.data);
        merged.insert(field_id.to_string(), value);
        self.data = self.engine.update(&self.fields, &merged);
    }

    /// Recompute the error list; true when the form is valid
    pub fn validate(&mut self) -> bool {
        self.errors = ValidationService::validate_form(&self.fields, &self.data);
        debug!(errors = self.errors.len(), "Form validated");
        self.errors.is_empty()
    }

    /// Clear values and errors
    pub fn reset(&mut self) {
        self.data.clear();
        self.errors.clear();
    }

    /// Validate, and hand back the submitted values when valid
    pub fn submit(&mut self) -> Result<FormDataMap> {
        if self.validate() {
            Ok(self.data.clone())
        } else {
            Err(FormsError::ValidationFailed(self.errors.clone()))
        }
    }

    // =========================================================================
    // Read state
    // =========================================================================

    pub fn schema_id(&self) -> Option<&str> { self.schema_id.as_deref() }
    pub fn fields(&self) -> &[FieldDefinition] { &self.fields }
    pub fn values(&self) -> &FormDataMap { &self.data }
    pub fn errors(&self) -> &[ValidationError] { &self.errors }

    pub fn value(&self, field_id: &str) -> Option<&Value> {
        self.data.get(field_id)
    }

    pub fn error_for(&self, field_id: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field_id == field_id)
            .map(|e| e.message.as_str())
    }

    /// Render descriptors in display order
    pub fn views(&self) -> Vec<FieldView<'_>> {
        self.fields
            .iter()
            .map(|field| {
                let error = self.error_for(&field.id);
                let description = field
                    .derived_spec()
                    .map(|spec| spec.description())
                    .filter(|d| !d.is_empty());
                FieldView {
                    field,
                    value: self.data.get(&field.id),
                    error,
                    disabled: field.is_derived,
                    helper_text: error.or(description),
                }
            })
            .collect()
    }
}

/// Default as entered into the session; numeric text on a number field
/// becomes a JSON number so the min/max rules apply to it
fn seed_value(field: &FieldDefinition, default: &Value) -> Value {
    match (field.field_type, default) {
        (FieldType::Number, Value::String(text)) => {
            let text = text.trim();
            if let Ok(n) = text.parse::<i64>() {
                Value::from(n)
            } else {
                text.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map_or_else(|| default.clone(), Value::Number)
            }
        }
        _ => default.clone(),
    }
}
