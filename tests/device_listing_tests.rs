//! Tests for the device listing helpers

mod common;

use aqara_cloud::client::{list_devices_by_model, AqaraDevice};
use common::MockApi;

fn device(did: &str, model: &str) -> AqaraDevice {
    AqaraDevice {
        did: did.to_string(),
        model: model.to_string(),
        device_name: String::new(),
    }
}

#[tokio::test]
async fn listing_filters_by_exact_model() {
    let api = MockApi::new();
    *api.devices.write().await = vec![
        device("lumi.cam1", "lumi.camera.gwpgl1"),
        device("lumi.hub1", "lumi.gateway.acn012"),
        device("lumi.cam2", "lumi.camera.gwpgl1"),
    ];

    let cameras = list_devices_by_model(&api, "lumi.camera.gwpgl1")
        .await
        .unwrap();
    assert_eq!(cameras.len(), 2);
    assert!(cameras.iter().all(|d| d.model == "lumi.camera.gwpgl1"));

    let none = list_devices_by_model(&api, "lumi.motion.agl001")
        .await
        .unwrap();
    assert!(none.is_empty());
}
