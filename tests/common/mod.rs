//! Shared test fixtures
//!
//! [`MockApi`] is a canned [`AqaraApi`] implementation: each endpoint
//! returns a preloaded response envelope, with per-endpoint failure
//! switches and request capture for verification.

use aqara_cloud::client::{
    auth::SessionInfo, ApiResponse, AqaraApi, AqaraDevice, HistoryRequest, QueryRequest,
    WriteRequest,
};
use aqara_cloud::error::{AqaraError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Canned cloud API for tests
pub struct MockApi {
    /// Response envelope for batched attribute queries
    pub query_response: Arc<RwLock<Value>>,

    /// Response envelope for resource-id-keyed queries
    pub resource_response: Arc<RwLock<Value>>,

    /// Response envelope for history queries
    pub history_response: Arc<RwLock<Value>>,

    /// Response envelope for attribute writes
    pub write_response: Arc<RwLock<Value>>,

    /// Device listing to return
    pub devices: Arc<RwLock<Vec<AqaraDevice>>>,

    /// Per-endpoint failure switches (transport-level errors)
    pub fail_query: Arc<RwLock<bool>>,
    pub fail_resource: Arc<RwLock<bool>>,
    pub fail_history: Arc<RwLock<bool>>,

    /// Captured requests for verification
    pub query_requests: Arc<RwLock<Vec<QueryRequest>>>,
    pub history_requests: Arc<RwLock<Vec<HistoryRequest>>>,
    pub write_requests: Arc<RwLock<Vec<WriteRequest>>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            query_response: Arc::new(RwLock::new(ok(json!([])))),
            resource_response: Arc::new(RwLock::new(ok(json!([])))),
            history_response: Arc::new(RwLock::new(ok(json!({"data": []})))),
            write_response: Arc::new(RwLock::new(ok(Value::Null))),
            devices: Arc::new(RwLock::new(Vec::new())),
            fail_query: Arc::new(RwLock::new(false)),
            fail_resource: Arc::new(RwLock::new(false)),
            fail_history: Arc::new(RwLock::new(false)),
            query_requests: Arc::new(RwLock::new(Vec::new())),
            history_requests: Arc::new(RwLock::new(Vec::new())),
            write_requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_query_result(&self, result: Value) {
        *self.query_response.write().await = ok(result);
    }

    pub async fn set_resource_result(&self, result: Value) {
        *self.resource_response.write().await = ok(result);
    }

    pub async fn set_history_result(&self, result: Value) {
        *self.history_response.write().await = ok(result);
    }

    /// Make the query endpoint answer with a non-zero status code
    pub async fn set_query_failure_code(&self, code: i64, message: &str) {
        *self.query_response.write().await = json!({"code": code, "message": message});
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Success envelope around a result payload
pub fn ok(result: Value) -> Value {
    json!({"code": 0, "result": result})
}

fn parse(envelope: &Value) -> Result<ApiResponse> {
    Ok(serde_json::from_value(envelope.clone())?)
}

#[async_trait]
impl AqaraApi for MockApi {
    async fn login(&self, _username: &str, _password: &str) -> Result<SessionInfo> {
        Ok(SessionInfo {
            token: "test-token".to_string(),
            user_id: "test-user".to_string(),
        })
    }

    async fn is_logged_in(&self) -> bool {
        true
    }

    async fn res_query(&self, request: &QueryRequest) -> Result<ApiResponse> {
        self.query_requests.write().await.push(request.clone());
        if *self.fail_query.read().await {
            return Err(AqaraError::connection("simulated query outage"));
        }
        parse(&*self.query_response.read().await)
    }

    async fn res_query_resource(&self, request: &QueryRequest) -> Result<ApiResponse> {
        self.query_requests.write().await.push(request.clone());
        if *self.fail_resource.read().await {
            return Err(AqaraError::connection("simulated settings outage"));
        }
        parse(&*self.resource_response.read().await)
    }

    async fn res_history(&self, request: &HistoryRequest) -> Result<ApiResponse> {
        self.history_requests.write().await.push(request.clone());
        if *self.fail_history.read().await {
            return Err(AqaraError::connection("simulated history outage"));
        }
        parse(&*self.history_response.read().await)
    }

    async fn res_write(&self, request: &WriteRequest) -> Result<ApiResponse> {
        self.write_requests.write().await.push(request.clone());
        parse(&*self.write_response.read().await)
    }

    async fn list_devices(&self) -> Result<Vec<AqaraDevice>> {
        Ok(self.devices.read().await.clone())
    }

    async fn camera_operate(&self, _did: &str, _action: &str) -> Result<()> {
        Ok(())
    }
}
