//! HTTP client for the Aqara cloud RPC endpoints

use crate::client::auth::{SessionInfo, SigningSession};
use crate::client::{
    ApiResponse, AqaraApi, AqaraDevice, HistoryRequest, QueryRequest, WriteRequest, DEVICES_PATH,
    HISTORY_PATH, LOGIN_PATH, OPERATE_PATH, QUERY_PATH, RESOURCE_QUERY_PATH, WRITE_PATH,
};
use crate::config::AqaraConfig;
use crate::error::{AqaraError, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

/// Login request body; field order matters because the signed canonical
/// string embeds the serialized body verbatim.
#[derive(Serialize)]
struct LoginRequest<'a> {
    account: &'a str,
    #[serde(rename = "encryptType")]
    encrypt_type: u8,
    password: String,
}

/// HTTP client implementing [`AqaraApi`] against a regional RPC host
pub struct AqaraHttpClient {
    client: Client,
    base_url: Url,
    session: SigningSession,
    config: AqaraConfig,
}

impl AqaraHttpClient {
    /// Create a client for the configured region
    pub fn new(config: AqaraConfig) -> Result<Self> {
        config.validate()?;

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AqaraError::connection(format!("Failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(config.area.server())
            .map_err(|e| AqaraError::config(format!("Invalid region host: {e}")))?;

        Ok(Self {
            client,
            base_url,
            session: SigningSession::new(config.area),
            config,
        })
    }

    /// Signing session, shared by all pollers
    pub fn session(&self) -> &SigningSession {
        &self.session
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AqaraError::connection(format!("Invalid URL path {path}: {e}")))
    }

    async fn post(&self, path: &str, headers: HeaderMap, body: String) -> Result<ApiResponse> {
        let url = self.build_url(path)?;
        debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AqaraError::authentication(format!("HTTP {status}: {text}"))
                }
                s if s.is_server_error() => {
                    AqaraError::connection(format!("Server error {status}: {text}"))
                }
                _ => AqaraError::connection(format!("HTTP {status}: {text}")),
            });
        }

        let text = response.text().await.map_err(map_transport_error)?;
        let parsed: ApiResponse = serde_json::from_str(&text)?;
        Ok(parsed)
    }

    /// POST with the signed login header set
    async fn post_signed(&self, path: &str, body: String) -> Result<ApiResponse> {
        let headers = self.session.signed_headers(&body).await?;
        self.post(path, headers, body).await
    }

    /// POST with the token/userid header set
    async fn post_rest<T: Serialize>(&self, path: &str, payload: &T) -> Result<ApiResponse> {
        let headers = self.session.rest_headers().await?;
        let body = serde_json::to_string(payload)?;
        self.post(path, headers, body).await
    }
}

fn map_transport_error(e: reqwest::Error) -> AqaraError {
    if e.is_timeout() {
        AqaraError::timeout(format!("HTTP request timed out: {e}"))
    } else if e.is_connect() {
        AqaraError::connection(format!("HTTP connect failed: {e}"))
    } else {
        AqaraError::Http(e)
    }
}

#[async_trait]
impl AqaraApi for AqaraHttpClient {
    async fn login(&self, username: &str, password: &str) -> Result<SessionInfo> {
        info!("Logging in to Aqara cloud ({})", self.config.area.label());

        let request = LoginRequest {
            account: username,
            encrypt_type: 2,
            password: SigningSession::password_envelope(password)?,
        };
        let body = serde_json::to_string(&request)?;

        let response = self.post_signed(LOGIN_PATH, body).await?;
        if !response.is_success() {
            let detail = response.message.unwrap_or_default();
            return Err(AqaraError::authentication(format!(
                "login rejected: code {} {detail}",
                response.code
            )));
        }

        let result = &response.result;
        let token = result
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| AqaraError::authentication("login response missing token"))?;
        let user_id = result
            .get("userId")
            .or_else(|| result.get("userid"))
            .and_then(Value::as_str)
            .ok_or_else(|| AqaraError::authentication("login response missing userId"))?;

        let info = SessionInfo {
            token: token.to_string(),
            user_id: user_id.to_string(),
        };
        self.session.install(info.clone()).await;
        info!("Login successful for user {}", info.user_id);
        Ok(info)
    }

    async fn is_logged_in(&self) -> bool {
        self.session.is_logged_in().await
    }

    async fn res_query(&self, request: &QueryRequest) -> Result<ApiResponse> {
        self.post_rest(QUERY_PATH, request).await
    }

    async fn res_query_resource(&self, request: &QueryRequest) -> Result<ApiResponse> {
        self.post_rest(RESOURCE_QUERY_PATH, request).await
    }

    async fn res_history(&self, request: &HistoryRequest) -> Result<ApiResponse> {
        self.post_rest(HISTORY_PATH, request).await
    }

    async fn res_write(&self, request: &WriteRequest) -> Result<ApiResponse> {
        self.post_rest(WRITE_PATH, request).await
    }

    async fn list_devices(&self) -> Result<Vec<AqaraDevice>> {
        let response = self.post_rest(DEVICES_PATH, &json!({})).await?;
        let result = response.ensure_success("list devices")?;
        let devices = result
            .get("devices")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let devices: Vec<AqaraDevice> = serde_json::from_value(devices)?;
        debug!("Device listing returned {} devices", devices.len());
        Ok(devices)
    }

    async fn camera_operate(&self, did: &str, action: &str) -> Result<()> {
        let payload = json!({
            "method": "ctrl_ptz",
            "params": {"action": action},
            "did": did,
        });
        let response = self.post_rest(OPERATE_PATH, &payload).await?;
        if !response.is_success() {
            return Err(AqaraError::device_control(format!(
                "camera operate '{action}' rejected: code {}",
                response.code
            )));
        }
        Ok(())
    }
}
