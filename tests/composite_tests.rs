//! Tests for the FP2 composite aggregation

mod common;

use aqara_cloud::registry::AttrValue;
use aqara_cloud::state::composite::fetch_full_state;
use common::MockApi;
use serde_json::json;

#[tokio::test]
async fn three_sources_merge_into_one_snapshot() {
    let api = MockApi::new();
    api.set_query_result(json!([
        {"attr": "lux", "value": 300},
        {"attr": "people_counting", "value": "2"},
    ]))
    .await;
    api.set_resource_result(json!([
        {"resourceId": "14.1.85", "value": 3},
    ]))
    .await;
    api.set_history_result(json!({"data": [
        {"resourceId": "3.51.85", "value": "1", "timeStamp": 1_700_000_000_000i64},
    ]}))
    .await;

    let snapshot = fetch_full_state(&api, "lumi.fp2").await.unwrap();

    // Status values pass through untouched
    assert_eq!(snapshot.get("lux"), Some(&AttrValue::Int(300)));
    assert_eq!(
        snapshot.get("people_counting"),
        Some(&AttrValue::Str("2".to_string()))
    );
    // Settings land under their normalized keys
    assert_eq!(
        snapshot.get("presence_detection_sens"),
        Some(&AttrValue::Int(3))
    );
    // Presence reduction emits state, timestamp and source
    assert_eq!(
        snapshot.get("fp2_presence_state"),
        Some(&AttrValue::Bool(true))
    );
    assert_eq!(
        snapshot.get("fp2_presence_ts"),
        Some(&AttrValue::Float(1_700_000_000.0))
    );
    assert_eq!(
        snapshot.get("fp2_presence_source"),
        Some(&AttrValue::Str("3.51.85".to_string()))
    );
}

#[tokio::test]
async fn newest_presence_event_wins_across_resources() {
    let api = MockApi::new();
    api.set_history_result(json!({"data": [
        {"resourceId": "3.51.85", "value": "1", "timeStamp": 1_700_000_100_000i64},
        {"resourceId": "3.52.85", "value": "0", "timeStamp": 1_700_000_200_000i64},
    ]}))
    .await;

    let snapshot = fetch_full_state(&api, "lumi.fp2").await.unwrap();

    assert_eq!(
        snapshot.get("fp2_presence_state"),
        Some(&AttrValue::Bool(false))
    );
    assert_eq!(
        snapshot.get("fp2_presence_source"),
        Some(&AttrValue::Str("3.52.85".to_string()))
    );
}

#[tokio::test]
async fn only_the_literal_one_counts_as_present() {
    let api = MockApi::new();
    api.set_history_result(json!({"data": [
        {"resourceId": "3.51.85", "value": "2", "timeStamp": 1_700_000_000_000i64},
    ]}))
    .await;

    let snapshot = fetch_full_state(&api, "lumi.fp2").await.unwrap();

    assert_eq!(
        snapshot.get("fp2_presence_state"),
        Some(&AttrValue::Bool(false))
    );
    // The event is still the latest transition; timestamp and source stay
    assert_eq!(
        snapshot.get("fp2_presence_ts"),
        Some(&AttrValue::Float(1_700_000_000.0))
    );
    assert_eq!(
        snapshot.get("fp2_presence_source"),
        Some(&AttrValue::Str("3.51.85".to_string()))
    );
}

#[tokio::test]
async fn no_presence_event_leaves_presence_keys_absent() {
    let api = MockApi::new();
    let snapshot = fetch_full_state(&api, "lumi.fp2").await.unwrap();

    assert_eq!(snapshot.get("fp2_presence_state"), None);
    assert_eq!(snapshot.get("fp2_presence_ts"), None);
    assert_eq!(snapshot.get("fp2_presence_source"), None);
}

#[tokio::test]
async fn one_failing_source_fails_the_whole_fetch() {
    let api = MockApi::new();
    *api.fail_resource.write().await = true;

    let result = fetch_full_state(&api, "lumi.fp2").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn settings_query_names_every_resource_id() {
    let api = MockApi::new();
    fetch_full_state(&api, "lumi.fp2").await.unwrap();

    let requests = api.query_requests.read().await;
    // One status batch and one settings batch
    assert_eq!(requests.len(), 2);
    let settings = requests
        .iter()
        .find(|r| r.data[0].options.iter().any(|o| o == "14.1.85"))
        .unwrap();
    assert_eq!(settings.data[0].options.len(), 7);
}
