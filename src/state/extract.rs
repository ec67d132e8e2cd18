//! Tolerant extraction from unreliable response shapes
//!
//! The same logical endpoint answers with several incompatible shapes: a
//! bare list, or an object wrapping the list under one of a few container
//! keys. Each extraction strategy is a standalone function; they are tried
//! in a fixed order and the first hit wins.

use serde_json::Value;

/// Container keys probed for attribute item lists, in order
const ITEM_CONTAINER_KEYS: &[&str] = &["attributes", "data", "list", "items", "result"];

/// Container keys probed for history event lists, in order
const EVENT_CONTAINER_KEYS: &[&str] = &["data", "list", "items"];

type Strategy = fn(&Value) -> Option<&[Value]>;

fn bare_list(value: &Value) -> Option<&[Value]> {
    value.as_array().map(Vec::as_slice)
}

fn keyed_item_list(value: &Value) -> Option<&[Value]> {
    keyed_list(value, ITEM_CONTAINER_KEYS)
}

fn keyed_event_list(value: &Value) -> Option<&[Value]> {
    keyed_list(value, EVENT_CONTAINER_KEYS)
}

fn keyed_list<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a [Value]> {
    let object = value.as_object()?;
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
}

fn run<'a>(value: &'a Value, strategies: &[Strategy]) -> &'a [Value] {
    strategies
        .iter()
        .find_map(|strategy| strategy(value))
        .unwrap_or(&[])
}

/// Attribute items from a query result, whatever the wrapping shape
pub fn result_items(result: &Value) -> &[Value] {
    run(result, &[bare_list, keyed_item_list])
}

/// Events from a history result, whatever the wrapping shape
pub fn history_events(result: &Value) -> &[Value] {
    run(result, &[bare_list, keyed_event_list])
}

/// Attribute key of one item
pub fn item_attr(item: &Value) -> Option<&str> {
    item.get("attr").and_then(Value::as_str)
}

/// Item value, unwrapping a one-level `{value: ...}` nesting
pub fn item_value(item: &Value) -> Option<&Value> {
    let value = item.get("value")?;
    match value.get("value") {
        Some(inner) => Some(inner),
        None => Some(value),
    }
}

/// Resource id of an item or event, falling back to the `attr` field
pub fn resource_id(item: &Value) -> Option<String> {
    let raw = item.get("resourceId").or_else(|| item.get("attr"))?;
    stringify(raw)
}

/// Discrete event value as a string
pub fn event_value(event: &Value) -> Option<String> {
    stringify(event.get("value")?)
}

/// Event timestamp under any of the observed field names
pub fn event_timestamp(event: &Value) -> Option<f64> {
    let raw = event
        .get("timeStamp")
        .or_else(|| event.get("timestamp"))
        .or_else(|| event.get("time"))?;
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
