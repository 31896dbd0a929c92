//! Validation rule value object

use serde::{Deserialize, Serialize};

/// Kind of constraint a rule applies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Email,
    Password,
    Min,
    Max,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Email => "email",
            Self::Password => "password",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// Rule parameter, numeric or textual as entered in the builder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleParam {
    Number(f64),
    Text(String),
}

impl RuleParam {
    /// Numeric reading of the parameter; non-numeric text yields `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for RuleParam {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for RuleParam {
    fn from(value: u32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for RuleParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A named constraint attached to a field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleParam>,
    pub message: String,
}

impl ValidationRule {
    /// Create a rule with the builder's default message for `label`
    pub fn new(kind: RuleKind, label: &str) -> Self {
        Self {
            kind,
            value: None,
            message: format!("Invalid {}", label),
        }
    }

    pub fn with_value(mut self, value: impl Into<RuleParam>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn min_length(len: u32, message: impl Into<String>) -> Self {
        Self { kind: RuleKind::MinLength, value: Some(len.into()), message: message.into() }
    }

    pub fn max_length(len: u32, message: impl Into<String>) -> Self {
        Self { kind: RuleKind::MaxLength, value: Some(len.into()), message: message.into() }
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self { kind: RuleKind::Email, value: None, message: message.into() }
    }

    pub fn password(message: impl Into<String>) -> Self {
        Self { kind: RuleKind::Password, value: None, message: message.into() }
    }

    pub fn min(bound: f64, message: impl Into<String>) -> Self {
        Self { kind: RuleKind::Min, value: Some(bound.into()), message: message.into() }
    }

    pub fn max(bound: f64, message: impl Into<String>) -> Self {
        Self { kind: RuleKind::Max, value: Some(bound.into()), message: message.into() }
    }

    /// Numeric parameter, if any
    pub fn bound(&self) -> Option<f64> {
        self.value.as_ref().and_then(RuleParam::as_f64)
    }
}
