//! FP2 composite state aggregation
//!
//! The presence sensor's state is scattered over three query types: a
//! live status read, a resource-id-keyed settings read, and the
//! presence-transition history feed. All three run concurrently; the key
//! sets are disjoint, so the merge never overwrites. Any branch failing
//! fails the whole fetch.

use crate::client::{AqaraApi, HistoryRequest, QueryRequest};
use crate::error::Result;
use crate::registry::{presence, AttrValue};
use crate::state::{extract, history, Snapshot};
use tracing::debug;

/// Fetch the full merged FP2 snapshot
pub async fn fetch_full_state(api: &dyn AqaraApi, did: &str) -> Result<Snapshot> {
    let (status, settings, presence) = tokio::try_join!(
        fetch_status(api, did),
        fetch_settings(api, did),
        fetch_presence(api, did),
    )?;

    let mut snapshot = status;
    snapshot.merge_absent(settings);
    snapshot.merge_absent(presence);
    Ok(snapshot)
}

/// Live batched read over the full status attribute list
async fn fetch_status(api: &dyn AqaraApi, did: &str) -> Result<Snapshot> {
    let request = QueryRequest::batched(did, presence::status_attributes());
    let response = api.res_query(&request).await?;
    let result = response.ensure_success("query presence status")?;

    let mut snapshot = Snapshot::new();
    for item in extract::result_items(&result) {
        let Some(key) = extract::item_attr(item) else {
            continue;
        };
        let Some(value) = extract::item_value(item) else {
            continue;
        };
        snapshot.insert(key, AttrValue::from(value));
    }
    debug!("presence status for {did}: {} attributes", snapshot.len());
    Ok(snapshot)
}

/// Resource-id-keyed settings read
async fn fetch_settings(api: &dyn AqaraApi, did: &str) -> Result<Snapshot> {
    let ids = presence::SETTING_RESOURCES.iter().map(|(rid, _)| *rid);
    let request = QueryRequest::batched(did, ids);
    let response = api.res_query_resource(&request).await?;
    let result = response.ensure_success("query presence settings")?;

    let mut snapshot = Snapshot::new();
    for item in extract::result_items(&result) {
        let Some(rid) = extract::resource_id(item) else {
            continue;
        };
        let Some(key) = presence::setting_key(&rid) else {
            continue;
        };
        let Some(value) = extract::item_value(item) else {
            continue;
        };
        snapshot.insert(key, AttrValue::from(value));
    }
    Ok(snapshot)
}

/// Reduce the presence-transition history to the latest event
///
/// Both firmware variants report transitions on different resource ids;
/// the newest event across both wins. No event at all leaves the
/// presence keys out of the snapshot entirely.
async fn fetch_presence(api: &dyn AqaraApi, did: &str) -> Result<Snapshot> {
    let resource_ids = presence::PRESENCE_RESOURCES
        .iter()
        .map(ToString::to_string)
        .collect();
    let request = HistoryRequest::recent(did, resource_ids, presence::PRESENCE_HISTORY_SIZE);
    let response = api.res_history(&request).await?;
    let result = response.ensure_success("query presence history")?;

    let mut latest: Option<(f64, String, String)> = None;
    for event in extract::history_events(&result) {
        let Some(rid) = extract::resource_id(event) else {
            continue;
        };
        if !presence::PRESENCE_RESOURCES.contains(&rid.as_str()) {
            continue;
        }
        let Some(raw_ts) = extract::event_timestamp(event) else {
            continue;
        };
        let Some(value) = extract::event_value(event) else {
            continue;
        };
        let ts = history::normalize_epoch_seconds(raw_ts);
        if latest.as_ref().map_or(true, |(best, _, _)| ts > *best) {
            latest = Some((ts, value, rid));
        }
    }

    let mut snapshot = Snapshot::new();
    if let Some((ts, value, rid)) = latest {
        // The transition feed is a strict enum: only "1" means present
        snapshot.insert(presence::PRESENCE_STATE_KEY, AttrValue::Bool(value == "1"));
        snapshot.insert(presence::PRESENCE_TS_KEY, AttrValue::Float(ts));
        snapshot.insert(presence::PRESENCE_SOURCE_KEY, AttrValue::Str(rid));
    }
    Ok(snapshot)
}
