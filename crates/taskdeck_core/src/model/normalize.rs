//! Coercion of arbitrary stored records into canonical task records.
//!
//! # Responsibility
//! - Turn any JSON value (legacy, partial or corrupted) into a `TaskRecord`.
//! - Supply defaults for missing or invalid fields, one field at a time.
//!
//! # Invariants
//! - `normalize` is total: it never fails and never panics.
//! - `normalize` is idempotent over its own output.
//! - An invalid field never poisons the other fields of the same record.
//!
//! # Id coercion
//! Only scalar ids (string, number, boolean) are kept. Array and object ids
//! are replaced with a fresh id instead of being stringified, because every
//! object would stringify to the same text and collide.

use crate::model::task::{Category, Priority, TaskRecord};
use crate::ports::{Clock, IdGenerator};
use serde_json::{Map, Number, Value};

/// Largest float that converts to `i64` without overflow (2^63).
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

static MISSING: Value = Value::Null;

/// Normalizes one raw record.
///
/// Non-object input is treated as an empty object, so every field falls back
/// to its default.
pub fn normalize(raw: &Value, clock: &dyn Clock, ids: &dyn IdGenerator) -> TaskRecord {
    let empty = Map::new();
    let fields = raw.as_object().unwrap_or(&empty);
    let field = |name: &str| fields.get(name).unwrap_or(&MISSING);

    TaskRecord {
        id: coerce_text(field("id")).unwrap_or_else(|| ids.fresh_id()),
        title: coerce_trimmed(field("title")),
        description: coerce_trimmed(field("description")),
        completed: truthy(field("completed")),
        category: field("category")
            .as_str()
            .and_then(Category::parse)
            .unwrap_or_default(),
        priority: field("priority")
            .as_str()
            .and_then(Priority::parse)
            .unwrap_or_default(),
        due_date: field("dueDate").as_str().unwrap_or_default().to_string(),
        created_at: finite_integer(field("createdAt")).unwrap_or_else(|| clock.now_ms()),
    }
}

fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number_to_text(number)),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_trimmed(value: &Value) -> String {
    coerce_text(value)
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

// Integral floats print without a fraction so `1.0` and `1` coerce alike.
fn number_to_text(number: &Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(int) = number.as_u64() {
        return int.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() < I64_BOUND => {
            (float as i64).to_string()
        }
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|float| float != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn finite_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(int) = number.as_i64() {
        return Some(int);
    }
    if number.is_u64() {
        return None;
    }
    let float = number.as_f64()?;
    if float.is_finite() && float.fract() == 0.0 && float >= -I64_BOUND && float < I64_BOUND {
        Some(float as i64)
    } else {
        None
    }
}
