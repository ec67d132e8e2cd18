//! Configuration for the Aqara cloud client

pub mod credentials;

use crate::error::{AqaraError, Result};
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};

/// Cloud region selection
///
/// Each area maps to a fixed RPC host and application id. Unrecognized
/// area strings fall back to [`Area::Other`], which shares the US host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Area {
    Eu,
    Us,
    Cn,
    Ru,
    Other,
}

/// Application id shared by every region
const APP_ID: &str = "444c476ef7135e53330f46e7";

/// App key as observed on the wire; the signing string needs the literal
const APP_KEY: &str = "NULL";

impl Area {
    /// Parse an area label, falling back to `Other` for anything unknown
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "EU" => Self::Eu,
            "US" => Self::Us,
            "CN" => Self::Cn,
            "RU" => Self::Ru,
            _ => Self::Other,
        }
    }

    /// Base URL of the region's RPC endpoint
    pub fn server(&self) -> &'static str {
        match self {
            Self::Eu => "https://rpc-ger.aqara.com",
            Self::Us | Self::Other => "https://aiot-rpc-usa.aqara.com",
            Self::Cn => "https://aiot-rpc.aqara.cn",
            Self::Ru => "https://rpc-ru.aqara.com",
        }
    }

    /// Application id for signed requests
    pub fn app_id(&self) -> &'static str {
        APP_ID
    }

    /// App key fed into the signing string
    pub fn app_key(&self) -> &'static str {
        APP_KEY
    }

    /// Wire label sent in the `Area` header during login
    pub fn label(&self) -> &'static str {
        match self {
            Self::Eu => "EU",
            Self::Us => "US",
            Self::Cn => "CN",
            Self::Ru => "RU",
            Self::Other => "OTHER",
        }
    }
}

impl Default for Area {
    fn default() -> Self {
        Self::Other
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqaraConfig {
    /// Cloud region
    pub area: Area,

    /// Request timeout
    pub timeout: Duration,

    /// Client tag sent as User-Agent
    pub user_agent: String,
}

impl Default for AqaraConfig {
    fn default() -> Self {
        Self {
            area: Area::default(),
            timeout: Duration::from_secs(30),
            user_agent: format!("aqara-cloud/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AqaraConfig {
    /// Load configuration from environment variables
    ///
    /// Recognizes `AQARA_AREA` and `AQARA_TIMEOUT` (seconds).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(area) = env::var("AQARA_AREA") {
            config.area = Area::parse(&area);
        }

        if let Ok(timeout) = env::var("AQARA_TIMEOUT") {
            config.timeout = Duration::from_secs(
                timeout
                    .parse()
                    .map_err(|e| AqaraError::config(format!("Invalid AQARA_TIMEOUT: {e}")))?,
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(AqaraError::config("Timeout must be greater than zero"));
        }
        if self.user_agent.is_empty() {
            return Err(AqaraError::config("User agent cannot be empty"));
        }
        Ok(())
    }
}
