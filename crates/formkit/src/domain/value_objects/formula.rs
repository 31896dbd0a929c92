//! Derived-field formulas
//!
//! Formula text is free-form but only a closed set of intents is recognized.
//! The text is classified once when a [`DerivedSpec`] is built (or deserialized)
//! and the resulting [`Formula`] tag is cached on it.

use serde::{Deserialize, Serialize};

use super::FieldType;

/// Recognized formula intent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formula {
    /// Current year minus the year of the first parent's date
    Age,
    /// Space-joined non-empty parent values
    Concat,
    /// Numeric sum of all parent values
    Sum,
    /// Nothing recognized; computes to an empty value
    Unknown,
}

impl Formula {
    /// Classify formula text by keyword. Age takes precedence over concat,
    /// concat over sum.
    pub fn classify(text: &str) -> Self {
        if text.contains("age") && text.contains("current_year") && text.contains("birth_year") {
            Self::Age
        } else if text.contains("concat") {
            Self::Concat
        } else if text.contains("sum") {
            Self::Sum
        } else {
            Self::Unknown
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Quick-pick formula texts offered for a field type
pub fn formula_templates(field_type: FieldType) -> &'static [&'static str] {
    match field_type {
        FieldType::Number => &[
            "age = current_year - birth_year",
            "sum = field1 + field2",
            "total = price * quantity",
        ],
        FieldType::Text => &[
            "concat = field1 + \" \" + field2",
            "fullname = firstname + \" \" + lastname",
        ],
        _ => &[],
    }
}

/// How a derived field obtains its value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "DerivedSpecRecord", into = "DerivedSpecRecord")]
pub struct DerivedSpec {
    parent_fields: Vec<String>,
    formula: String,
    description: String,
    intent: Formula,
}

impl DerivedSpec {
    pub fn new<I, S>(parent_fields: I, formula: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let formula = formula.into();
        Self {
            parent_fields: parent_fields.into_iter().map(Into::into).collect(),
            intent: Formula::classify(&formula),
            formula,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn parent_fields(&self) -> &[String] { &self.parent_fields }
    pub fn formula(&self) -> &str { &self.formula }
    pub fn description(&self) -> &str { &self.description }
    pub fn intent(&self) -> Formula { self.intent }
}

/// Persisted shape of a [`DerivedSpec`]; the intent is never stored
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSpecRecord {
    #[serde(default)]
    pub parent_fields: Vec<String>,
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub description: String,
}

impl From<DerivedSpecRecord> for DerivedSpec {
    fn from(record: DerivedSpecRecord) -> Self {
        DerivedSpec::new(record.parent_fields, record.formula).with_description(record.description)
    }
}

impl From<DerivedSpec> for DerivedSpecRecord {
    fn from(spec: DerivedSpec) -> Self {
        Self {
            parent_fields: spec.parent_fields,
            formula: spec.formula,
            description: spec.description,
        }
    }
}
