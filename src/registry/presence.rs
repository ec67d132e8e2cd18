//! FP2 presence sensor tables
//!
//! The FP2's full state spans three query types: a live status read over
//! the attribute list below, a resource-id-keyed settings read, and a
//! presence-transition history scan. The composite aggregator in
//! [`crate::state::composite`] fans them out and merges the results.

/// Presence sensor model identifier
pub const MODEL: &str = "lumi.motion.agl001";

/// Detection zones reported by the device
pub const ZONE_COUNT: usize = 30;

/// Zones with per-minute people counters
pub const MINUTE_ZONE_COUNT: usize = 7;

/// Events requested per presence history scan
pub const PRESENCE_HISTORY_SIZE: u32 = 5;

/// Presence-transition history resources (two firmware variants)
pub const PRESENCE_RESOURCES: &[&str] = &["3.51.85", "3.52.85"];

/// Snapshot keys emitted by the presence-transition reduction
pub const PRESENCE_STATE_KEY: &str = "fp2_presence_state";
pub const PRESENCE_TS_KEY: &str = "fp2_presence_ts";
pub const PRESENCE_SOURCE_KEY: &str = "fp2_presence_source";

const BASE_STATUS_ATTRS: &[&str] = &[
    "heartrate_value",
    "respiration_rate_value",
    "sleep_state",
    "body_movement_value",
    "lux",
    "installation_angle",
    "set_device_mode4",
    "device_offline_status",
    "view_zoom",
    "mounting_position",
    "attitude_status",
];

const GLOBAL_COUNT_ATTRS: &[&str] = &[
    "all_zone_statistics",
    "people_counting",
    "people_counting_by_mins",
];

/// Settings resource ids and the normalized keys they map to
pub const SETTING_RESOURCES: &[(&str, &str)] = &[
    ("14.30.85", "fall_detection_sens"),
    ("14.55.85", "detection_dir"),
    ("14.51.85", "reverse_coordinate_dir"),
    ("14.1.85", "presence_detection_sens"),
    ("14.47.85", "proximity_sensing_dist"),
    ("4.23.85", "anti_light_poll"),
    ("4.72.85", "ai_person_det"),
];

/// Normalized key for a settings resource id
pub fn setting_key(resource_id: &str) -> Option<&'static str> {
    SETTING_RESOURCES
        .iter()
        .find(|(rid, _)| *rid == resource_id)
        .map(|(_, key)| *key)
}

/// Full status attribute list for the live batched read
pub fn status_attributes() -> Vec<String> {
    let mut attrs: Vec<String> = BASE_STATUS_ATTRS
        .iter()
        .chain(GLOBAL_COUNT_ATTRS)
        .map(ToString::to_string)
        .collect();
    for index in 1..=ZONE_COUNT {
        attrs.push(format!("zone{index}_statistics"));
    }
    for index in 1..=MINUTE_ZONE_COUNT {
        attrs.push(format!("zone{index}_people_counting_by_mins"));
    }
    for index in 1..=ZONE_COUNT {
        attrs.push(format!("detection_area{index}"));
    }
    attrs
}
