//! Normalized device state
//!
//! A [`Snapshot`] is the product of one poll cycle for one device: every
//! normalized key of the driving spec set mapped to a coerced value, plus
//! the fetch timestamp. Snapshots fully replace their predecessor; nothing
//! is merged across cycles.

pub mod coerce;
pub mod composite;
pub mod extract;
pub mod history;
pub mod query;

use crate::registry::AttrValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Normalized attribute state for one device at one instant
#[derive(Debug, Clone)]
pub struct Snapshot {
    values: HashMap<String, AttrValue>,
    /// When the snapshot was produced
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Coerced value for a normalized key
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AttrValue) {
        self.values.insert(key.into(), value);
    }

    /// Insert unless the key is already present; composite sources are
    /// disjoint by construction, so earlier sources win
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: AttrValue) {
        self.values.entry(key.into()).or_insert(value);
    }

    /// Fold another snapshot in without overwriting existing keys
    pub fn merge_absent(&mut self, other: Snapshot) {
        for (key, value) in other.values {
            self.insert_if_absent(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Whether a history-derived timestamp signal is currently active
    ///
    /// Applies the hold-window decay rule against the wall clock; see
    /// [`history::signal_active`].
    pub fn signal_active(&self, key: &str, hold_seconds: u32) -> bool {
        let now = Utc::now().timestamp_millis() as f64 / 1000.0;
        self.signal_active_at(key, hold_seconds, now)
    }

    /// Decay evaluation against an explicit clock
    pub fn signal_active_at(&self, key: &str, hold_seconds: u32, now_secs: f64) -> bool {
        match self.get(key).and_then(AttrValue::as_f64) {
            Some(ts) => history::signal_active(ts, hold_seconds, now_secs),
            None => false,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_if_absent_keeps_first_value() {
        let mut snapshot = Snapshot::new();
        snapshot.insert_if_absent("lux", AttrValue::Int(120));
        snapshot.insert_if_absent("lux", AttrValue::Int(999));
        assert_eq!(snapshot.get("lux"), Some(&AttrValue::Int(120)));
    }

    #[test]
    fn signal_active_requires_numeric_timestamp() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("gesture_ok", AttrValue::Null);
        assert!(!snapshot.signal_active_at("gesture_ok", 10, 1_700_000_000.0));

        snapshot.insert("gesture_ok", AttrValue::Float(1_699_999_995.0));
        assert!(snapshot.signal_active_at("gesture_ok", 10, 1_700_000_000.0));
    }
}
