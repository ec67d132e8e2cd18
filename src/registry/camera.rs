//! G3 camera capability set

use super::{AttributeSpec, ValueType};

/// Camera model identifiers
pub const MODELS: &[&str] = &["lumi.camera.gwpgl1"];

/// Gesture events share one history resource
const GESTURE_RESOURCE: &str = "13.96.85";

/// Gestures decay faster than the default hold window would suggest
const GESTURE_HOLD_SECONDS: u32 = 10;

fn gesture(value: &'static str, normalized_key: &'static str) -> AttributeSpec {
    AttributeSpec::history(GESTURE_RESOURCE, value, normalized_key)
        .with_hold_seconds(GESTURE_HOLD_SECONDS)
}

/// Camera attribute specs: live toggles, volume, and history-derived
/// gesture signals
pub fn specs() -> Vec<AttributeSpec> {
    vec![
        AttributeSpec::live("set_video", "camera_active", ValueType::Bool),
        AttributeSpec::live("humans_track_enable", "human_detect_enable", ValueType::Bool),
        AttributeSpec::live("pets_track_enable", "pets_track_enable", ValueType::Bool),
        AttributeSpec::live("gesture_detect_enable", "gesture_detect_enable", ValueType::Bool),
        AttributeSpec::live("face_detect_enable", "face_detect_enable", ValueType::Bool),
        AttributeSpec::live("ptz_cruise_enable", "ptz_cruise_enable", ValueType::Bool),
        AttributeSpec::live("device_night_tip_light", "night_vision", ValueType::Bool),
        AttributeSpec::live("system_volume", "volume", ValueType::Int),
        gesture("2", "gesture_v_sign"),
        gesture("4", "gesture_four"),
        gesture("5", "gesture_high_five"),
        gesture("6", "gesture_finger_gun"),
        gesture("10", "gesture_ok"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_specs_share_one_resource() {
        let resources: Vec<_> = specs()
            .into_iter()
            .filter_map(|s| s.history_resource)
            .collect();
        assert_eq!(resources.len(), 5);
        assert!(resources.iter().all(|r| *r == GESTURE_RESOURCE));
    }

    #[test]
    fn gesture_hold_overrides_default() {
        let gesture = specs()
            .into_iter()
            .find(|s| s.normalized_key == "gesture_v_sign")
            .unwrap();
        assert_eq!(gesture.hold_seconds, GESTURE_HOLD_SECONDS);
        assert_eq!(gesture.history_value, Some("2"));
    }
}
