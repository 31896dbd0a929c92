//! Field definition value object

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DerivedSpec, ValidationRule};
use crate::domain::aggregates::SchemaError;

/// Input type of a field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        Self::Text,
        Self::Number,
        Self::Textarea,
        Self::Select,
        Self::Radio,
        Self::Checkbox,
        Self::Date,
    ];

    /// Choice types must carry a non-empty option list
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
        }
    }

    /// Whether `value` has the runtime shape this type stores
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Number, Value::Number(_)) => true,
            (Self::Number, Value::String(s)) => s.trim().parse::<f64>().is_ok(),
            (Self::Checkbox, Value::Array(items)) => items.iter().all(Value::is_string),
            (Self::Number | Self::Checkbox, _) => false,
            (_, Value::String(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable choice of a select/radio/checkbox field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }
}

/// A typed form field with its rules
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, rename = "validations")]
    pub rules: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default)]
    pub is_derived: bool,
    #[serde(default, rename = "derivedConfig", skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedSpec>,
    #[serde(default)]
    pub order: u32,
}

impl FieldDefinition {
    /// Create a field with a fresh id
    pub fn new(field_type: FieldType, label: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), field_type, label)
    }

    pub fn with_id(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: false,
            default_value: None,
            rules: vec![],
            options: None,
            is_derived: false,
            derived: None,
            order: 0,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_options<I>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = SelectOption>,
    {
        self.options = Some(options.into_iter().collect());
        self
    }

    /// Mark the field as derived from `spec`
    pub fn derived_from(mut self, spec: DerivedSpec) -> Self {
        self.is_derived = true;
        self.derived = Some(spec);
        self
    }

    pub fn at(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// The derived spec, only for fields flagged as derived
    pub fn derived_spec(&self) -> Option<&DerivedSpec> {
        if self.is_derived { self.derived.as_ref() } else { None }
    }

    /// Checks that need nothing but the field itself
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.label.trim().is_empty() {
            return Err(SchemaError::EmptyLabel { field: self.id.clone() });
        }

        if self.field_type.is_choice() && self.options.as_ref().map_or(true, Vec::is_empty) {
            return Err(SchemaError::MissingOptions {
                field: self.id.clone(),
                field_type: self.field_type,
            });
        }

        if self.is_derived != self.derived.is_some() {
            return Err(SchemaError::DerivedFlagMismatch { field: self.id.clone() });
        }

        if let Some(default) = &self.default_value {
            if !self.field_type.accepts(default) {
                return Err(SchemaError::DefaultTypeMismatch {
                    field: self.id.clone(),
                    field_type: self.field_type,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_assigns_unique_ids() {
        let a = FieldDefinition::new(FieldType::Text, "Name");
        let b = FieldDefinition::new(FieldType::Text, "Name");
        assert_ne!(a.id, b.id);
        assert!(!a.required);
        assert!(a.rules.is_empty());
    }

    #[test]
    fn test_choice_field_requires_options() {
        let field = FieldDefinition::with_id("color", FieldType::Select, "Color");
        assert!(matches!(field.check(), Err(SchemaError::MissingOptions { .. })));

        let field = field.with_options(vec![]);
        assert!(matches!(field.check(), Err(SchemaError::MissingOptions { .. })));

        let field = field.with_options([SelectOption::new("red", "Red")]);
        assert!(field.check().is_ok());
    }

    #[test]
    fn test_derived_flag_requires_spec() {
        let mut field = FieldDefinition::with_id("age", FieldType::Number, "Age");
        field.is_derived = true;
        assert!(matches!(field.check(), Err(SchemaError::DerivedFlagMismatch { .. })));
    }

    #[test]
    fn test_default_must_match_type() {
        let field = FieldDefinition::with_id("qty", FieldType::Number, "Qty").with_default("many");
        assert!(matches!(field.check(), Err(SchemaError::DefaultTypeMismatch { .. })));

        let field = FieldDefinition::with_id("qty", FieldType::Number, "Qty").with_default(3);
        assert!(field.check().is_ok());

        let field = FieldDefinition::with_id("tags", FieldType::Checkbox, "Tags")
            .with_options([SelectOption::new("a", "A")])
            .with_default(json!(["a"]));
        assert!(field.check().is_ok());
    }

    #[test]
    fn test_blank_label_rejected() {
        let field = FieldDefinition::with_id("x", FieldType::Text, "  ");
        assert!(matches!(field.check(), Err(SchemaError::EmptyLabel { .. })));
    }

    #[test]
    fn test_wire_shape() {
        let field: FieldDefinition = serde_json::from_value(json!({
            "id": "full",
            "type": "text",
            "label": "Full name",
            "required": false,
            "validations": [],
            "isDerived": true,
            "derivedConfig": {
                "parentFields": ["first", "last"],
                "formula": "concat",
                "description": "First and last"
            },
            "order": 2
        })).unwrap();
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.order, 2);
        assert!(field.derived_spec().is_some());

        let back = serde_json::to_value(&field).unwrap();
        assert_eq!(back["derivedConfig"]["formula"], "concat");
        assert!(back.get("options").is_none());
    }
}
