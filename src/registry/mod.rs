//! Attribute spec registry
//!
//! Declarative tables of attribute descriptors, one collection per device
//! family. The registry is pure data validated once at startup; resolver
//! logic never changes when a family is added.

pub mod camera;
pub mod hub;
pub mod presence;

use crate::error::{AqaraError, Result};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Default hold window for history-derived signals, seconds
pub const DEFAULT_HOLD_SECONDS: u32 = 5;

/// Default number of events requested per history scan
pub const DEFAULT_HISTORY_SIZE: u32 = 10;

/// Wire value type governing coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    String,
    Bool,
    /// Epoch seconds derived from the event-history feed
    Timestamp,
}

/// A coerced attribute value as it appears in a snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    /// Zero-equivalent default for a value type
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Int => Self::Int(0),
            ValueType::Float => Self::Float(0.0),
            ValueType::String => Self::Str(String::new()),
            ValueType::Bool => Self::Bool(false),
            ValueType::Timestamp => Self::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Lossless passthrough from a wire value, for sources that carry raw state
/// (the presence-sensor status and settings reads).
impl From<&Value> for AttrValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => Self::Str(s.clone()),
            other => Self::Str(other.to_string()),
        }
    }
}

/// Describes one logical piece of device state
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    /// Attribute identifier for a live batched read; absent for
    /// history-only specs
    pub wire_key: Option<&'static str>,

    /// Key under which the coerced value appears in a snapshot
    pub normalized_key: &'static str,

    /// Governs coercion of the wire value
    pub value_type: ValueType,

    /// Multiplier applied after numeric parse (raw centidegrees → degrees)
    pub scale: Option<f64>,

    /// Value used when the wire read is absent or unparseable
    pub default: AttrValue,

    /// Event-feed identifier for history-derived specs
    pub history_resource: Option<&'static str>,

    /// Discrete event value that counts as "signal observed"
    pub history_value: Option<&'static str>,

    /// How long after the derived timestamp the signal stays active
    pub hold_seconds: u32,

    /// Events requested per history scan
    pub history_size: u32,
}

impl AttributeSpec {
    /// A spec resolved by the live batched read
    pub fn live(wire_key: &'static str, normalized_key: &'static str, value_type: ValueType) -> Self {
        Self {
            wire_key: Some(wire_key),
            normalized_key,
            value_type,
            scale: None,
            default: AttrValue::zero(value_type),
            history_resource: None,
            history_value: None,
            hold_seconds: DEFAULT_HOLD_SECONDS,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }

    /// A spec resolved from the event-history feed
    pub fn history(
        resource: &'static str,
        value: &'static str,
        normalized_key: &'static str,
    ) -> Self {
        Self {
            wire_key: None,
            normalized_key,
            value_type: ValueType::Timestamp,
            scale: None,
            default: AttrValue::Null,
            history_resource: Some(resource),
            history_value: Some(value),
            hold_seconds: DEFAULT_HOLD_SECONDS,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_default(mut self, default: AttrValue) -> Self {
        self.default = default;
        self
    }

    pub fn with_hold_seconds(mut self, hold_seconds: u32) -> Self {
        self.hold_seconds = hold_seconds;
        self
    }

    pub fn with_history_size(mut self, history_size: u32) -> Self {
        self.history_size = history_size;
        self
    }
}

/// Device family, one spec collection each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFamily {
    /// G3 camera
    Camera,
    /// M3 hub
    Hub,
    /// FP2 presence sensor
    Presence,
}

impl DeviceFamily {
    /// Resolve a family from a cloud model identifier
    pub fn for_model(model: &str) -> Option<Self> {
        if camera::MODELS.contains(&model) {
            Some(Self::Camera)
        } else if hub::MODELS.contains(&model) {
            Some(Self::Hub)
        } else if model == presence::MODEL {
            Some(Self::Presence)
        } else {
            None
        }
    }

    /// Poll cadence observed for the family
    pub fn poll_interval(&self) -> Duration {
        match self {
            Self::Camera | Self::Hub => Duration::from_secs(1),
            Self::Presence => Duration::from_secs(2),
        }
    }
}

/// Immutable registry of per-family spec collections, built once at startup
pub struct SpecRegistry {
    families: HashMap<DeviceFamily, Vec<AttributeSpec>>,
}

impl SpecRegistry {
    /// Build and validate the standard registry
    ///
    /// The presence family carries no batched spec list here; its state
    /// spans three query types and is assembled by the composite
    /// aggregator from the tables in [`presence`].
    pub fn standard() -> Result<Self> {
        let mut families = HashMap::new();
        families.insert(DeviceFamily::Camera, camera::specs());
        families.insert(DeviceFamily::Hub, hub::specs());

        let registry = Self { families };
        registry.validate()?;
        Ok(registry)
    }

    /// Spec collection for a family; empty for families without one
    pub fn specs(&self, family: DeviceFamily) -> &[AttributeSpec] {
        self.families.get(&family).map_or(&[], Vec::as_slice)
    }

    fn validate(&self) -> Result<()> {
        for (family, specs) in &self.families {
            let mut seen = HashSet::new();
            for spec in specs {
                if !seen.insert(spec.normalized_key) {
                    return Err(AqaraError::invalid_spec(format!(
                        "{family:?}: duplicate normalized key '{}'",
                        spec.normalized_key
                    )));
                }
                if spec.wire_key.is_none() && spec.history_resource.is_none() {
                    return Err(AqaraError::invalid_spec(format!(
                        "{family:?}: '{}' has neither wire key nor history resource",
                        spec.normalized_key
                    )));
                }
                if spec.history_resource.is_some() != spec.history_value.is_some() {
                    return Err(AqaraError::invalid_spec(format!(
                        "{family:?}: '{}' must pair history resource with history value",
                        spec.normalized_key
                    )));
                }
                if spec.history_resource.is_some() && spec.value_type != ValueType::Timestamp {
                    return Err(AqaraError::invalid_spec(format!(
                        "{family:?}: history spec '{}' must be timestamp-typed",
                        spec.normalized_key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_validates() {
        let registry = SpecRegistry::standard().unwrap();
        assert!(!registry.specs(DeviceFamily::Camera).is_empty());
        assert!(!registry.specs(DeviceFamily::Hub).is_empty());
        assert!(registry.specs(DeviceFamily::Presence).is_empty());
    }

    #[test]
    fn family_resolution_by_model() {
        assert_eq!(
            DeviceFamily::for_model("lumi.camera.gwpgl1"),
            Some(DeviceFamily::Camera)
        );
        assert_eq!(
            DeviceFamily::for_model("lumi.gateway.acn012"),
            Some(DeviceFamily::Hub)
        );
        assert_eq!(
            DeviceFamily::for_model("lumi.motion.agl001"),
            Some(DeviceFamily::Presence)
        );
        assert_eq!(DeviceFamily::for_model("lumi.plug.unknown"), None);
    }

    #[test]
    fn duplicate_normalized_keys_are_rejected() {
        let mut families = HashMap::new();
        families.insert(
            DeviceFamily::Camera,
            vec![
                AttributeSpec::live("a", "same", ValueType::Bool),
                AttributeSpec::live("b", "same", ValueType::Bool),
            ],
        );
        assert!(SpecRegistry { families }.validate().is_err());
    }

    #[test]
    fn sourceless_spec_is_rejected() {
        let orphan = AttributeSpec {
            wire_key: None,
            history_resource: None,
            ..AttributeSpec::live("x", "x", ValueType::Bool)
        };
        let mut families = HashMap::new();
        families.insert(DeviceFamily::Hub, vec![orphan]);
        assert!(SpecRegistry { families }.validate().is_err());
    }

    #[test]
    fn zero_defaults_match_value_types() {
        assert_eq!(AttrValue::zero(ValueType::Int), AttrValue::Int(0));
        assert_eq!(AttrValue::zero(ValueType::Bool), AttrValue::Bool(false));
        assert_eq!(AttrValue::zero(ValueType::Timestamp), AttrValue::Null);
    }
}
