//! Signing session for Aqara cloud requests
//!
//! Two header schemes exist. The login call is signed: an MD5 digest over a
//! canonical string of the app id, nonce, timestamp, optional token, request
//! body and app key. Post-login calls use a plain token/userid header set
//! with no signature. The MD5 digest is a protocol-compatibility
//! requirement, not a security measure; the server accepts nothing else.
//!
//! The password itself is never transmitted: its MD5 hex digest is encrypted
//! with a fixed vendor RSA public key (PKCS#1 v1.5 padding) and sent
//! base64-encoded.

use crate::config::Area;
use crate::error::{AqaraError, Result};
use base64::{engine::general_purpose, Engine as _};
use openssl::rsa::{Padding, Rsa};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Vendor RSA public key used to envelope the password digest
const AQARA_RSA_PUBKEY: &str = "-----BEGIN PUBLIC KEY-----
MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQCG46slB57013JJs4Vvj5cVyMpR
9b+B2F+YJU6qhBEYbiEmIdWpFPpOuBikDs2FcPS19MiWq1IrmxJtkICGurqImRUt
4lP688IWlEmqHfSxSRf2+aH0cH8VWZ2OaZn5DWSIHIPBF2kxM71q8stmoYiV0oZs
rZzBHsMuBwA4LQdxBwIDAQAB
-----END PUBLIC KEY-----
";

/// Token state produced by a successful login
///
/// Immutable for the process lifetime; there is no refresh path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Bearer token for post-login calls
    pub token: String,
    /// Account user id
    pub user_id: String,
}

/// Credentials-derived token state plus per-request header assembly
pub struct SigningSession {
    area: Area,
    /// Stable per-client phone id, uppercased UUID
    phone_id: String,
    /// Written once by login, read by every poller
    session: RwLock<Option<SessionInfo>>,
}

impl SigningSession {
    /// Create a session for the given region
    pub fn new(area: Area) -> Self {
        Self {
            area,
            phone_id: Uuid::new_v4().to_string().to_uppercase(),
            session: RwLock::new(None),
        }
    }

    /// Encrypt the MD5 digest of the password with the vendor public key
    pub fn password_envelope(password: &str) -> Result<String> {
        let digest = format!("{:x}", md5::compute(password.as_bytes()));

        let rsa = Rsa::public_key_from_pem(AQARA_RSA_PUBKEY.as_bytes())
            .map_err(|e| AqaraError::crypto(format!("Failed to parse vendor public key: {e}")))?;

        let mut encrypted = vec![0u8; rsa.size() as usize];
        let encrypted_len = rsa
            .public_encrypt(digest.as_bytes(), &mut encrypted, Padding::PKCS1)
            .map_err(|e| AqaraError::crypto(format!("Password encryption failed: {e}")))?;
        encrypted.truncate(encrypted_len);

        Ok(general_purpose::STANDARD.encode(&encrypted))
    }

    /// Random request nonce, hex
    pub fn nonce() -> String {
        format!("{:x}", md5::compute(Uuid::new_v4().to_string().as_bytes()))
    }

    /// Unix time in milliseconds as a string
    pub fn now_millis() -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        millis.to_string()
    }

    /// Install the token after a successful login (single writer)
    pub async fn install(&self, info: SessionInfo) {
        *self.session.write().await = Some(info);
    }

    /// Whether login has completed
    pub async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Current session info, if logged in
    pub async fn session_info(&self) -> Option<SessionInfo> {
        self.session.read().await.clone()
    }

    /// Headers for the signed login call
    ///
    /// Field order in the canonical string is fixed by the protocol; the
    /// body is the exact byte string that will be POSTed.
    pub async fn signed_headers(&self, request_body: &str) -> Result<HeaderMap> {
        let nonce = Self::nonce();
        let time = Self::now_millis();
        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.token.clone());

        let sign = sign_canonical(
            self.area.app_id(),
            &nonce,
            &time,
            token.as_deref(),
            request_body,
            self.area.app_key(),
        );

        let mut headers = HeaderMap::new();
        insert(&mut headers, "app-version", "3.0.0")?;
        insert(&mut headers, "sys-type", "1")?;
        insert(&mut headers, "lang", "en")?;
        insert(&mut headers, "phone-model", "aqara-cloud")?;
        insert(&mut headers, "phoneid", &self.phone_id)?;
        insert(&mut headers, "area", self.area.label())?;
        insert(&mut headers, "appid", self.area.app_id())?;
        insert(&mut headers, "nonce", &nonce)?;
        insert(&mut headers, "time", &time)?;
        if let Some(token) = &token {
            insert(&mut headers, "token", token)?;
        }
        insert(&mut headers, "sign", &sign)?;
        insert(&mut headers, "content-type", "application/json")?;
        Ok(headers)
    }

    /// Headers for post-login calls: token and userid only, no signature
    pub async fn rest_headers(&self) -> Result<HeaderMap> {
        let session = self.session.read().await;
        let info = session
            .as_ref()
            .ok_or_else(|| AqaraError::authentication("not logged in: token/userid missing"))?;

        let mut headers = HeaderMap::new();
        insert(&mut headers, "sys-type", "1")?;
        insert(&mut headers, "appid", self.area.app_id())?;
        insert(&mut headers, "userid", &info.user_id)?;
        insert(&mut headers, "token", &info.token)?;
        insert(&mut headers, "content-type", "application/json; charset=utf-8")?;
        Ok(headers)
    }
}

/// Compute the request signature over the canonical string
///
/// Pre-token: `Appid={..}&Nonce={..}&Time={..}&{body}&{appkey}`.
/// Post-token inserts `Token={..}` and joins body and appkey with `&&`,
/// then collapses every double ampersand, matching the vendor client
/// byte-for-byte (an empty body would otherwise leave one behind).
pub fn sign_canonical(
    app_id: &str,
    nonce: &str,
    time: &str,
    token: Option<&str>,
    request_body: &str,
    app_key: &str,
) -> String {
    let canonical = match token {
        Some(token) => format!(
            "Appid={app_id}&Nonce={nonce}&Time={time}&Token={token}&{request_body}&&{app_key}"
        )
        .replace("&&", "&"),
        None => format!("Appid={app_id}&Nonce={nonce}&Time={time}&{request_body}&{app_key}"),
    };
    format!("{:x}", md5::compute(canonical.as_bytes()))
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| AqaraError::config(format!("Invalid header value for {name}: {e}")))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
