//! M3 hub capability set

use super::{AttrValue, AttributeSpec, ValueType};

/// Hub model identifiers
pub const MODELS: &[&str] = &["lumi.gateway.acn012", "lumi.gateway.agl004"];

/// Hub attribute specs: volumes, durations, ringtone/language selects and
/// environmental readings
pub fn specs() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::live("system_volume", "system_volume", ValueType::Int),
        AttributeSpec::live("alarm_bell_volume", "alarm_bell_volume", ValueType::Int),
        AttributeSpec::live("doorbell_bell_volume", "doorbell_bell_volume", ValueType::Int),
        AttributeSpec::live("alarm_time_length", "alarm_time_length", ValueType::Int),
        AttributeSpec::live("doorbell_time_length", "doorbell_time_length", ValueType::Int),
        // Selects report null until the device answers once
        AttributeSpec::live("gateway_language", "gateway_language", ValueType::Int)
            .with_default(AttrValue::Null),
        AttributeSpec::live("alarm_bell_index", "alarm_bell_index", ValueType::Int)
            .with_default(AttrValue::Null),
        AttributeSpec::live("doorbell_bell_index", "doorbell_bell_index", ValueType::Int)
            .with_default(AttrValue::Null),
        // Raw centidegrees from the wire
        AttributeSpec::live("temperature_value", "temperature_value", ValueType::Float)
            .with_scale(0.01)
            .with_default(AttrValue::Null),
        AttributeSpec::live("humidity_value", "humidity_value", ValueType::Float)
            .with_default(AttrValue::Null),
    ]
}
