//! Domain services module
//!
//! Stateless engines applied to a field list and a data snapshot. Neither
//! engine returns errors: they run inline on every edit.

pub mod derived;
pub mod validation;

pub use derived::{Clock, DerivedFieldEngine, FixedClock, SystemClock};
pub use validation::ValidationService;

use serde_json::Value;

/// Empty means missing, null or the empty string
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// String form of a value as the form layer displays it
pub(crate) fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(|f| f.to_string()).unwrap_or_default(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(coerce_to_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_empty_value() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&Value::Null)));
        assert!(is_empty_value(Some(&json!(""))));
        assert!(!is_empty_value(Some(&json!(" "))));
        assert!(!is_empty_value(Some(&json!(0))));
        assert!(!is_empty_value(Some(&json!([]))));
    }

    #[test]
    fn test_coerce_to_string() {
        assert_eq!(coerce_to_string(&json!(7.0)), "7");
        assert_eq!(coerce_to_string(&json!(7.5)), "7.5");
        assert_eq!(coerce_to_string(&json!(-3)), "-3");
        assert_eq!(coerce_to_string(&json!(["a", "b"])), "a,b");
        assert_eq!(coerce_to_string(&json!(true)), "true");
    }
}
