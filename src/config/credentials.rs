//! Credential handling for cloud login

use crate::error::{AqaraError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Account credentials for the Aqara cloud
///
/// The plaintext password never leaves the process: login sends an
/// RSA-encrypted digest instead (see [`crate::client::auth`]).
#[derive(Clone, Serialize, Deserialize)]
pub struct AqaraCredentials {
    /// Account name (email or phone number)
    pub username: String,

    /// Account password
    pub password: String,
}

impl AqaraCredentials {
    /// Create credentials from explicit values
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Load credentials from `AQARA_USERNAME` / `AQARA_PASSWORD`
    pub fn from_env() -> Result<Self> {
        let username = env::var("AQARA_USERNAME")
            .map_err(|_| AqaraError::credentials("AQARA_USERNAME not set"))?;
        let password = env::var("AQARA_PASSWORD")
            .map_err(|_| AqaraError::credentials("AQARA_PASSWORD not set"))?;

        let credentials = Self { username, password };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Validate credentials
    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(AqaraError::credentials("Username cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(AqaraError::credentials("Password cannot be empty"));
        }
        Ok(())
    }
}

// Keep the password out of logs and error chains.
impl std::fmt::Debug for AqaraCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AqaraCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
