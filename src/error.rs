//! Error types for the Aqara cloud client
//!
//! The taxonomy mirrors how failures propagate through the crate:
//! authentication failures abort setup, query and transport failures are
//! recoverable and surface to the polling scheduler as a missed cycle,
//! coercion failures are always resolved locally to a spec default and
//! never appear here.

use thiserror::Error;

/// Result type alias for Aqara operations
pub type Result<T> = std::result::Result<T, AqaraError>;

/// Error types for Aqara cloud operations
#[derive(Error, Debug)]
pub enum AqaraError {
    /// Login rejected, or an authenticated call attempted before login
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Non-zero status code from a query endpoint
    #[error("Query failed: {0}")]
    Query(String),

    /// Connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential errors
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Cryptographic errors (password envelope construction)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Attribute spec registry errors
    #[error("Invalid attribute spec: {0}")]
    InvalidSpec(String),

    /// Device control errors
    #[error("Device control error: {0}")]
    DeviceControl(String),
}

impl AqaraError {
    /// Create an authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a query error
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a credential error
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Create a crypto error
    pub fn crypto(msg: impl Into<String>) -> Self {
        Self::Crypto(msg.into())
    }

    /// Create an invalid spec error
    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        Self::InvalidSpec(msg.into())
    }

    /// Create a device control error
    pub fn device_control(msg: impl Into<String>) -> Self {
        Self::DeviceControl(msg.into())
    }

    /// Whether the next poll cycle may succeed without operator action
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Query(_) | Self::Connection(_) | Self::Timeout(_) | Self::Http(_)
        )
    }

    /// Whether this failure requires a new login to clear
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::Credentials(_))
    }
}
