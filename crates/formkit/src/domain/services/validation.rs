//! Validation Engine
//!
//! A field is checked in three steps: the required check, the empty-optional
//! short circuit, then its rules in declared order until the first failure.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::{coerce_to_string, is_empty_value};
use crate::domain::value_objects::{
    FieldDefinition, FormDataMap, RuleKind, ValidationError, ValidationRule,
};

/// Minimum password length
pub const PASSWORD_MIN_LENGTH: usize = 8;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

fn digit_pattern() -> &'static Regex {
    static DIGIT: OnceLock<Regex> = OnceLock::new();
    DIGIT.get_or_init(|| Regex::new(r"\d").expect("valid digit pattern"))
}

/// Field and form validation domain service
pub struct ValidationService;

impl ValidationService {
    /// Validate one field's value; returns the message of the first failure.
    ///
    /// `_data` is the whole snapshot, reserved for cross-field rules.
    pub fn validate_field(
        field: &FieldDefinition,
        value: Option<&Value>,
        _data: &FormDataMap,
    ) -> Option<String> {
        let empty = is_empty_value(value);

        if field.required && empty {
            return Some(format!("{} is required", field.label));
        }

        // Remaining rules only apply to values that are present
        let value = match value {
            Some(v) if !empty => v,
            _ => return None,
        };

        field
            .rules
            .iter()
            .find(|rule| Self::rule_fails(rule, value))
            .map(|rule| rule.message.clone())
    }

    /// Validate every field against the snapshot, in field order
    pub fn validate_form(fields: &[FieldDefinition], data: &FormDataMap) -> Vec<ValidationError> {
        fields
            .iter()
            .filter_map(|field| {
                Self::validate_field(field, data.get(&field.id), data)
                    .map(|message| ValidationError::new(&field.id, message))
            })
            .collect()
    }

    /// Whether `rule` rejects a present value.
    ///
    /// Length and pattern rules only look at strings and numeric bounds only
    /// at numbers; a rule with a missing or non-numeric bound passes.
    pub fn rule_fails(rule: &ValidationRule, value: &Value) -> bool {
        match rule.kind {
            RuleKind::Required => is_empty_value(Some(value)),
            RuleKind::MinLength => match (value, rule.bound()) {
                (Value::String(s), Some(min)) => (s.chars().count() as f64) < min,
                _ => false,
            },
            RuleKind::MaxLength => match (value, rule.bound()) {
                (Value::String(s), Some(max)) => (s.chars().count() as f64) > max,
                _ => false,
            },
            RuleKind::Email => match value {
                Value::String(s) => !email_pattern().is_match(s),
                _ => false,
            },
            RuleKind::Password => {
                let text = coerce_to_string(value);
                !(digit_pattern().is_match(&text) && text.chars().count() >= PASSWORD_MIN_LENGTH)
            }
            RuleKind::Min => match (value.as_f64(), rule.bound()) {
                (Some(n), Some(min)) => n < min,
                _ => false,
            },
            RuleKind::Max => match (value.as_f64(), rule.bound()) {
                (Some(n), Some(max)) => n > max,
                _ => false,
            },
        }
    }
}
