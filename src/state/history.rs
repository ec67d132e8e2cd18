//! History-derived signal resolution
//!
//! Some boolean signals (camera gestures, presence transitions) have no
//! live attribute; they are reconstructed from the event-history feed as
//! "last transition timestamp" per logical signal. A presentation layer
//! then treats the signal as active while the timestamp sits inside the
//! spec's hold window.

use crate::client::{AqaraApi, HistoryRequest};
use crate::error::Result;
use crate::registry::{AttributeSpec, DEFAULT_HISTORY_SIZE};
use crate::state::extract;
use std::collections::HashMap;
use tracing::debug;

/// Tolerated forward clock drift between device and host, seconds
pub const CLOCK_SKEW_SECONDS: f64 = 5.0;

/// Timestamps above this are in milliseconds
const MILLIS_THRESHOLD: f64 = 1e12;

/// Normalize a wire timestamp to epoch seconds
///
/// The feed mixes second and millisecond precision; anything above 10^12
/// can only be milliseconds.
pub fn normalize_epoch_seconds(ts: f64) -> f64 {
    if ts > MILLIS_THRESHOLD {
        ts / 1000.0
    } else {
        ts
    }
}

/// Hold-window decay rule for a derived timestamp
///
/// Active while `now - ts <= hold` (floored at one second), provided the
/// timestamp is strictly positive and not in the future beyond the skew
/// tolerance.
pub fn signal_active(ts_secs: f64, hold_seconds: u32, now_secs: f64) -> bool {
    if ts_secs <= 0.0 || ts_secs > now_secs + CLOCK_SKEW_SECONDS {
        return false;
    }
    now_secs - ts_secs <= f64::from(hold_seconds.max(1))
}

/// Derive last-transition timestamps for history-backed specs
///
/// One batched history query covers all unique resources; per spec, the
/// first matching event wins (the feed is newest-first). Specs with no
/// matching event are absent from the result map; the caller's
/// default-fill covers them.
pub async fn resolve_history_signals(
    api: &dyn AqaraApi,
    did: &str,
    specs: &[&AttributeSpec],
) -> Result<HashMap<String, f64>> {
    let mut resolved = HashMap::new();
    if specs.is_empty() {
        return Ok(resolved);
    }

    let mut resource_ids: Vec<String> = Vec::new();
    for spec in specs {
        if let Some(resource) = spec.history_resource {
            if !resource_ids.iter().any(|r| r == resource) {
                resource_ids.push(resource.to_string());
            }
        }
    }
    let size = specs
        .iter()
        .map(|s| s.history_size)
        .max()
        .unwrap_or(DEFAULT_HISTORY_SIZE);

    let request = HistoryRequest::recent(did, resource_ids, size);
    let response = api.res_history(&request).await?;
    let result = response.ensure_success("query device history")?;

    // Group events per resource, preserving newest-first order
    let mut grouped: HashMap<String, Vec<&serde_json::Value>> = HashMap::new();
    for event in extract::history_events(&result) {
        if let Some(rid) = extract::resource_id(event) {
            grouped.entry(rid).or_default().push(event);
        }
    }

    for spec in specs {
        let (Some(resource), Some(desired)) = (spec.history_resource, spec.history_value) else {
            continue;
        };
        let Some(events) = grouped.get(resource) else {
            continue;
        };
        for event in events {
            if extract::event_value(event).as_deref() != Some(desired) {
                continue;
            }
            match extract::event_timestamp(event) {
                Some(ts) => {
                    resolved.insert(
                        spec.normalized_key.to_string(),
                        normalize_epoch_seconds(ts),
                    );
                }
                None => {
                    debug!(
                        "unparseable timestamp for {} in {event:?}",
                        spec.normalized_key
                    );
                }
            }
            break;
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_timestamps_are_normalized() {
        assert_eq!(normalize_epoch_seconds(1_700_000_000_000.0), 1_700_000_000.0);
    }

    #[test]
    fn second_timestamps_stay_unchanged() {
        assert_eq!(normalize_epoch_seconds(1_700_000_000.0), 1_700_000_000.0);
    }

    #[test]
    fn signal_active_within_hold_window() {
        let now = 1_700_000_000.0;
        assert!(signal_active(now - 5.0, 10, now));
    }

    #[test]
    fn signal_decays_past_hold_window() {
        let now = 1_700_000_000.0;
        assert!(!signal_active(now - 5.0, 3, now));
    }

    #[test]
    fn future_timestamp_beyond_skew_is_inactive() {
        let now = 1_700_000_000.0;
        assert!(!signal_active(now + 5.0 + 0.1, 10, now));
        // Inside the skew tolerance still counts
        assert!(signal_active(now + 4.0, 10, now));
    }

    #[test]
    fn non_positive_timestamp_is_inactive() {
        assert!(!signal_active(0.0, 10, 100.0));
        assert!(!signal_active(-1.0, 10, 100.0));
    }

    #[test]
    fn hold_window_is_floored_at_one_second() {
        let now = 1_700_000_000.0;
        assert!(signal_active(now - 0.5, 0, now));
        assert!(!signal_active(now - 2.0, 0, now));
    }
}
