//! Derived-Field Engine
//!
//! Recomputes derived fields from their parents in a single pass over one
//! data snapshot. Derived fields only ever read non-derived parents, so the
//! pass never depends on another derived value produced in the same pass.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use super::coerce_to_string;
use crate::domain::value_objects::{FieldDefinition, FormDataMap, Formula};

/// Source of the current calendar year for age formulas
pub trait Clock: Send + Sync {
    fn current_year(&self) -> i32;
}

/// Local wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_year(&self) -> i32 {
        Local::now().year()
    }
}

/// A clock pinned to a given year
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
    fn current_year(&self) -> i32 {
        self.0
    }
}

#[derive(Clone)]
pub struct DerivedFieldEngine {
    clock: Arc<dyn Clock>,
}

impl Default for DerivedFieldEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DerivedFieldEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedFieldEngine")
            .field("current_year", &self.clock.current_year())
            .finish()
    }
}

impl DerivedFieldEngine {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Value of one derived field given the snapshot.
    ///
    /// Non-derived fields, unknown formulas and unusable parents all yield
    /// an empty string.
    pub fn calculate(&self, field: &FieldDefinition, data: &FormDataMap) -> Value {
        let Some(spec) = field.derived_spec() else {
            return empty();
        };
        let parents = spec.parent_fields();

        match spec.intent() {
            Formula::Age => parents
                .first()
                .and_then(|id| data.get(id))
                .and_then(parse_year)
                .map(|year| json!(i64::from(self.clock.current_year()) - i64::from(year)))
                .unwrap_or_else(empty),
            Formula::Concat => {
                let parts: Vec<String> = parents
                    .iter()
                    .filter_map(|id| data.get(id))
                    .filter(|v| is_truthy(v))
                    .map(coerce_to_string)
                    .filter(|s| !s.is_empty())
                    .collect();
                Value::String(parts.join(" "))
            }
            Formula::Sum => {
                let total: f64 = parents
                    .iter()
                    .map(|id| data.get(id).map_or(0.0, to_number))
                    .sum();
                // JSON has no infinity or NaN
                if total.is_finite() {
                    json!(total)
                } else {
                    empty()
                }
            }
            Formula::Unknown => empty(),
        }
    }

    /// New snapshot with every derived field recomputed from `data`
    pub fn update(&self, fields: &[FieldDefinition], data: &FormDataMap) -> FormDataMap {
        let mut updated = data.clone();
        for field in fields.iter().filter(|f| f.is_derived) {
            let value = self.calculate(field, data);
            debug!(field = %field.id, value = %value, "Derived field recomputed");
            updated.insert(field.id.clone(), value);
        }
        updated
    }
}

fn empty() -> Value {
    Value::String(String::new())
}

/// Falsy values are dropped from concatenation
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Year of a date or date-time string
fn parse_year(value: &Value) -> Option<i32> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.year());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.year());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.year())
}

/// Numbers pass through; anything else is read by its leading numeric text
fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_float_prefix(s).unwrap_or(0.0),
        other => parse_float_prefix(&coerce_to_string(other)).unwrap_or(0.0),
    }
}

/// Longest leading decimal literal, so `"4.5kg"` reads as 4.5
fn parse_float_prefix(text: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let pattern = NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid number pattern")
    });
    pattern.find(text.trim_start()).and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{DerivedSpec, FieldType};
    use proptest::prelude::*;

    fn engine() -> DerivedFieldEngine {
        DerivedFieldEngine::with_clock(Arc::new(FixedClock(2026)))
    }

    fn derived(id: &str, parents: &[&str], formula: &str) -> FieldDefinition {
        FieldDefinition::with_id(id, FieldType::Text, id)
            .derived_from(DerivedSpec::new(parents.iter().copied(), formula))
    }

    fn data(pairs: &[(&str, Value)]) -> FormDataMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_age_from_birth_date() {
        let field = derived("age", &["dob"], "age = current_year - birth_year");
        let value = engine().calculate(&field, &data(&[("dob", json!("2000-06-15"))]));
        assert_eq!(value, json!(26));
    }

    #[test]
    fn test_age_with_system_clock() {
        let field = derived("age", &["dob"], "age = current_year - birth_year");
        let value = DerivedFieldEngine::new().calculate(&field, &data(&[("dob", json!("2000-06-15"))]));
        assert_eq!(value, json!(i64::from(Local::now().year()) - 2000));
    }

    #[test]
    fn test_age_accepts_date_times() {
        let field = derived("age", &["dob"], "age = current_year - birth_year");
        let e = engine();
        assert_eq!(e.calculate(&field, &data(&[("dob", json!("1990-01-01T08:30:00Z"))])), json!(36));
        assert_eq!(e.calculate(&field, &data(&[("dob", json!("1990-01-01T08:30"))])), json!(36));
    }

    #[test]
    fn test_age_missing_or_bad_parent_is_empty() {
        let field = derived("age", &["dob"], "age = current_year - birth_year");
        let e = engine();
        assert_eq!(e.calculate(&field, &FormDataMap::new()), json!(""));
        assert_eq!(e.calculate(&field, &data(&[("dob", json!(""))])), json!(""));
        assert_eq!(e.calculate(&field, &data(&[("dob", json!("not a date"))])), json!(""));

        let orphan = derived("age", &[], "age = current_year - birth_year");
        assert_eq!(e.calculate(&orphan, &FormDataMap::new()), json!(""));
    }

    #[test]
    fn test_concat_drops_empty() {
        let field = derived("full", &["first", "middle", "last"], "concat");
        let snapshot = data(&[("first", json!("John")), ("middle", json!("")), ("last", json!("Doe"))]);
        assert_eq!(engine().calculate(&field, &snapshot), json!("John Doe"));
    }

    #[test]
    fn test_concat_coerces_and_drops_falsy() {
        let field = derived("tag", &["a", "b", "c", "d", "e"], "concat = a + b");
        let snapshot = data(&[
            ("a", json!(42)),
            ("b", json!(0)),
            ("c", Value::Null),
            ("d", json!(["x", "y"])),
        ]);
        assert_eq!(engine().calculate(&field, &snapshot), json!("42 x,y"));
    }

    #[test]
    fn test_sum_mixed() {
        let field = derived("total", &["a", "b"], "sum = a + b");
        let snapshot = data(&[("a", json!(3)), ("b", json!("4.5"))]);
        assert_eq!(engine().calculate(&field, &snapshot).as_f64(), Some(7.5));
    }

    #[test]
    fn test_sum_unparsable_counts_zero() {
        let field = derived("total", &["a", "b", "c", "d"], "sum");
        let snapshot = data(&[("a", json!("abc")), ("b", json!("2kg")), ("c", json!(true))]);
        assert_eq!(engine().calculate(&field, &snapshot).as_f64(), Some(2.0));
    }

    #[test]
    fn test_sum_overflow_is_empty() {
        let field = derived("total", &["a", "b"], "sum = a + b");
        let snapshot = data(&[("a", json!("1e400")), ("b", json!(1))]);
        assert_eq!(engine().calculate(&field, &snapshot), json!(""));

        let snapshot = data(&[("a", json!(f64::MAX)), ("b", json!(f64::MAX))]);
        assert_eq!(engine().calculate(&field, &snapshot), json!(""));
    }

    #[test]
    fn test_unknown_formula_is_empty() {
        let field = derived("total", &["a"], "total = price * quantity");
        assert_eq!(engine().calculate(&field, &data(&[("a", json!(3))])), json!(""));
    }

    #[test]
    fn test_non_derived_is_empty() {
        let field = FieldDefinition::with_id("plain", FieldType::Text, "Plain");
        assert_eq!(engine().calculate(&field, &FormDataMap::new()), json!(""));
    }

    #[test]
    fn test_update_passes_through_non_derived() {
        let fields = vec![
            FieldDefinition::with_id("first", FieldType::Text, "First"),
            FieldDefinition::with_id("last", FieldType::Text, "Last"),
            derived("full", &["first", "last"], "concat"),
        ];
        let snapshot = data(&[("first", json!("Ada")), ("last", json!("Lovelace")), ("extra", json!(1))]);
        let updated = engine().update(&fields, &snapshot);
        assert_eq!(updated["full"], json!("Ada Lovelace"));
        assert_eq!(updated["first"], json!("Ada"));
        assert_eq!(updated["extra"], json!(1));
        assert_eq!(updated.len(), 4);
    }

    #[test]
    fn test_update_reads_only_the_input_snapshot() {
        // Not a valid schema, but the engine must still read stale values
        let fields = vec![
            FieldDefinition::with_id("a", FieldType::Text, "A"),
            derived("b", &["a"], "concat"),
            derived("c", &["b"], "concat"),
        ];
        let snapshot = data(&[("a", json!("new")), ("b", json!("old"))]);
        let updated = engine().update(&fields, &snapshot);
        assert_eq!(updated["b"], json!("new"));
        assert_eq!(updated["c"], json!("old"));
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("  4.5"), Some(4.5));
        assert_eq!(parse_float_prefix("-2e3x"), Some(-2000.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("7."), Some(7.0));
        assert_eq!(parse_float_prefix("x7"), None);
    }

    proptest! {
        #[test]
        fn prop_update_is_idempotent(
            first in "[a-zA-Z ]{0,8}",
            last in "[a-zA-Z ]{0,8}",
            a in -1000.0f64..1000.0,
            b in "[0-9.]{0,6}",
            year in 1900i32..2026,
        ) {
            let fields = vec![
                FieldDefinition::with_id("first", FieldType::Text, "First"),
                FieldDefinition::with_id("last", FieldType::Text, "Last"),
                FieldDefinition::with_id("a", FieldType::Number, "A"),
                FieldDefinition::with_id("b", FieldType::Text, "B"),
                FieldDefinition::with_id("dob", FieldType::Date, "Dob"),
                derived("full", &["first", "last"], "concat"),
                derived("total", &["a", "b"], "sum"),
                derived("age", &["dob"], "age current_year birth_year"),
            ];
            let snapshot = data(&[
                ("first", json!(first)),
                ("last", json!(last)),
                ("a", json!(a)),
                ("b", json!(b)),
                ("dob", json!(format!("{year}-03-01"))),
            ]);
            let e = engine();
            let once = e.update(&fields, &snapshot);
            let twice = e.update(&fields, &once);
            prop_assert_eq!(once, twice);
        }
    }
}
