//! Aqara cloud client: wire types and the raw API surface
//!
//! [`AqaraApi`] is the seam between the state engines and the network.
//! Production code talks through [`http_client::AqaraHttpClient`]; tests
//! substitute a canned implementation.

pub mod auth;
pub mod http_client;

use crate::error::{AqaraError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute write/query endpoint
pub const WRITE_PATH: &str = "/app/v1.0/lumi/res/write";
/// Batched attribute query endpoint
pub const QUERY_PATH: &str = "/app/v1.0/lumi/res/query";
/// Event-history feed endpoint
pub const HISTORY_PATH: &str = "/app/v1.0/lumi/res/history/log";
/// Device listing endpoint
pub const DEVICES_PATH: &str = "/app/v1.0/lumi/app/position/device/query";
/// Camera PTZ operation endpoint
pub const OPERATE_PATH: &str = "/app/v1.0/lumi/devex/camera/operate";
/// Resource-id-keyed query endpoint
pub const RESOURCE_QUERY_PATH: &str = "/app/v1.0/lumi/res/query/by/resourceId";
/// Login endpoint
pub const LOGIN_PATH: &str = "/app/v1.0/lumi/user/login";

/// Fixed start-of-epoch for history scans (2018-01-01 UTC, millis)
pub const HISTORY_START_MS: u64 = 1_514_736_000_000;

/// A device as reported by the cloud listing call
///
/// Immutable for the session lifetime; the listing is fetched once after
/// login and treated as static.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqaraDevice {
    /// Stable opaque device identifier
    pub did: String,

    /// Model family identifier (e.g. "lumi.camera.gwpgl1")
    #[serde(default)]
    pub model: String,

    /// Display name assigned in the vendor app
    #[serde(default, rename = "deviceName")]
    pub device_name: String,
}

/// Generic response envelope shared by every endpoint
///
/// The server is inconsistent about the status code type: both `0` and
/// `"0"` mean success.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Top-level status code (integer or string)
    #[serde(default)]
    pub code: Value,

    /// Optional human-readable message
    #[serde(default)]
    pub message: Option<String>,

    /// Endpoint-specific payload
    #[serde(default)]
    pub result: Value,
}

impl ApiResponse {
    /// Whether the response reports success
    pub fn is_success(&self) -> bool {
        match &self.code {
            Value::Number(n) => n.as_i64() == Some(0),
            Value::String(s) => s == "0",
            _ => false,
        }
    }

    /// Turn a non-zero status code into a query error
    pub fn ensure_success(self, context: &str) -> Result<Value> {
        if self.is_success() {
            Ok(self.result)
        } else {
            let detail = self.message.unwrap_or_default();
            Err(AqaraError::query(format!(
                "{context}: code {} {detail}",
                self.code
            )))
        }
    }
}

/// Batched attribute read request
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub data: Vec<QueryBatch>,
}

/// One batch of attribute keys (or resource ids) for a single device
#[derive(Debug, Clone, Serialize)]
pub struct QueryBatch {
    pub options: Vec<String>,
    #[serde(rename = "subjectId")]
    pub subject_id: String,
}

impl QueryRequest {
    /// One batch naming all keys for one device
    pub fn batched(did: &str, options: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            data: vec![QueryBatch {
                options: options.into_iter().map(Into::into).collect(),
                subject_id: did.to_string(),
            }],
        }
    }
}

/// Event-history request over one or more resource ids
#[derive(Debug, Clone, Serialize)]
pub struct HistoryRequest {
    #[serde(rename = "resourceIds")]
    pub resource_ids: Vec<String>,
    #[serde(rename = "scanId")]
    pub scan_id: String,
    pub size: u32,
    #[serde(rename = "startTime")]
    pub start_time: u64,
    #[serde(rename = "subjectId")]
    pub subject_id: String,
}

impl HistoryRequest {
    /// Most-recent `size` events for the given resources
    pub fn recent(did: &str, resource_ids: Vec<String>, size: u32) -> Self {
        Self {
            resource_ids,
            scan_id: String::new(),
            size,
            start_time: HISTORY_START_MS,
            subject_id: did.to_string(),
        }
    }
}

/// Raw attribute write request
#[derive(Debug, Clone, Serialize)]
pub struct WriteRequest {
    pub data: serde_json::Map<String, Value>,
    #[serde(rename = "subjectId")]
    pub subject_id: String,
}

impl WriteRequest {
    /// Write a group of attributes in one call
    pub fn new(did: &str, data: serde_json::Map<String, Value>) -> Self {
        Self {
            data,
            subject_id: did.to_string(),
        }
    }

    /// Write a single attribute
    pub fn single(did: &str, key: &str, value: Value) -> Self {
        let mut data = serde_json::Map::new();
        data.insert(key.to_string(), value);
        Self::new(did, data)
    }
}

/// Raw wire operations against the Aqara cloud
///
/// Everything except `login` requires a completed login and fails with an
/// authentication error otherwise.
#[async_trait]
pub trait AqaraApi: Send + Sync {
    /// Authenticate and install the session token
    async fn login(&self, username: &str, password: &str) -> Result<auth::SessionInfo>;

    /// Whether a session token is installed
    async fn is_logged_in(&self) -> bool;

    /// Batched attribute read
    async fn res_query(&self, request: &QueryRequest) -> Result<ApiResponse>;

    /// Resource-id-keyed settings read
    async fn res_query_resource(&self, request: &QueryRequest) -> Result<ApiResponse>;

    /// Event-history read
    async fn res_history(&self, request: &HistoryRequest) -> Result<ApiResponse>;

    /// Raw attribute write
    async fn res_write(&self, request: &WriteRequest) -> Result<ApiResponse>;

    /// Fetch the device listing
    async fn list_devices(&self) -> Result<Vec<AqaraDevice>>;

    /// PTZ-style camera operation
    async fn camera_operate(&self, did: &str, action: &str) -> Result<()>;
}

/// Filter the device listing by model identifier
pub async fn list_devices_by_model(api: &dyn AqaraApi, model: &str) -> Result<Vec<AqaraDevice>> {
    let devices = api.list_devices().await?;
    Ok(devices.into_iter().filter(|d| d.model == model).collect())
}

/// Write a group of attributes and check the status code
pub async fn write_attributes(
    api: &dyn AqaraApi,
    did: &str,
    data: serde_json::Map<String, Value>,
) -> Result<()> {
    let request = WriteRequest::new(did, data);
    let response = api.res_write(&request).await?;
    response.ensure_success("write device attributes")?;
    Ok(())
}

/// Write a single attribute and check the status code
pub async fn write_attribute(
    api: &dyn AqaraApi,
    did: &str,
    key: &str,
    value: Value,
) -> Result<()> {
    let request = WriteRequest::single(did, key, value);
    let response = api.res_write(&request).await?;
    response.ensure_success("write device attribute")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_code_accepts_int_and_string() {
        let int_ok: ApiResponse = serde_json::from_value(json!({"code": 0})).unwrap();
        let str_ok: ApiResponse = serde_json::from_value(json!({"code": "0"})).unwrap();
        let failed: ApiResponse = serde_json::from_value(json!({"code": 108})).unwrap();
        assert!(int_ok.is_success());
        assert!(str_ok.is_success());
        assert!(!failed.is_success());
    }

    #[test]
    fn missing_code_is_not_success() {
        let response: ApiResponse = serde_json::from_value(json!({"result": []})).unwrap();
        assert!(!response.is_success());
    }

    #[test]
    fn ensure_success_reports_code_and_message() {
        let response: ApiResponse =
            serde_json::from_value(json!({"code": 302, "message": "token invalid"})).unwrap();
        let err = response.ensure_success("query states").unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("302"));
        assert!(rendered.contains("token invalid"));
    }

    #[test]
    fn query_request_shape_matches_wire_format() {
        let request = QueryRequest::batched("lumi.123", ["set_video", "system_volume"]);
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            json!({"data": [{"options": ["set_video", "system_volume"], "subjectId": "lumi.123"}]})
        );
    }

    #[test]
    fn history_request_uses_fixed_start_time() {
        let request = HistoryRequest::recent("lumi.123", vec!["13.96.85".into()], 10);
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["startTime"], json!(HISTORY_START_MS));
        assert_eq!(wire["scanId"], json!(""));
    }

    #[test]
    fn device_listing_tolerates_missing_fields() {
        let device: AqaraDevice = serde_json::from_value(json!({"did": "lumi.1"})).unwrap();
        assert_eq!(device.did, "lumi.1");
        assert!(device.model.is_empty());
        assert!(device.device_name.is_empty());
    }
}
