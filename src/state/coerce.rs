//! Wire-type coercion
//!
//! The cloud reports the same logical attribute as `1`, `"1"`, `"1.0"` or
//! `true` depending on firmware and endpoint. Coercion is total: a failure
//! resolves to the spec default and never aborts the snapshot.

use crate::registry::{AttrValue, AttributeSpec, ValueType};
use crate::state::history;
use serde_json::Value;

/// Strings accepted as true, case-insensitively
const TRUTHY_STRINGS: &[&str] = &["1", "true", "on", "yes"];

/// Truthy table over heterogeneous wire values
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let normalized = s.trim().to_ascii_lowercase();
            TRUTHY_STRINGS.contains(&normalized.as_str())
        }
        _ => false,
    }
}

/// Numeric view of a wire value; float-then-truncate integer parses hang
/// off this so that `"1.0"`-style strings survive
pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Coerce a wire value per its spec
pub fn coerce(spec: &AttributeSpec, raw: &Value) -> AttrValue {
    if raw.is_null() {
        return spec.default.clone();
    }

    match spec.value_type {
        ValueType::Int => match value_to_f64(raw) {
            Some(parsed) => scaled(spec, parsed, AttrValue::Int(parsed.trunc() as i64)),
            None => spec.default.clone(),
        },
        ValueType::Float => match value_to_f64(raw) {
            Some(parsed) => scaled(spec, parsed, AttrValue::Float(parsed)),
            None => spec.default.clone(),
        },
        ValueType::String => match raw {
            Value::String(s) => AttrValue::Str(s.clone()),
            Value::Number(n) => AttrValue::Str(n.to_string()),
            Value::Bool(b) => AttrValue::Str(b.to_string()),
            _ => spec.default.clone(),
        },
        ValueType::Bool => AttrValue::Bool(truthy(raw)),
        ValueType::Timestamp => match value_to_f64(raw) {
            Some(ts) => AttrValue::Float(history::normalize_epoch_seconds(ts)),
            None => spec.default.clone(),
        },
    }
}

fn scaled(spec: &AttributeSpec, parsed: f64, unscaled: AttrValue) -> AttrValue {
    match spec.scale {
        Some(scale) => AttrValue::Float(parsed * scale),
        None => unscaled,
    }
}
