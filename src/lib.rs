//! Aqara cloud synchronization core
//!
//! This crate talks to the Aqara smart-home cloud: signed request
//! transport, attribute normalization over per-family spec tables,
//! history-derived transient signals, and per-device polling.
//!
//! # Features
//!
//! - MD5-signed request protocol with RSA-enveloped login
//! - Declarative attribute specs per device family (camera, hub, presence)
//! - Coercion of loosely-typed wire values into normalized state
//! - Event-history reduction with hold-window decay for momentary signals
//! - Composite three-way aggregation for the FP2 presence sensor
//! - Per-device poll loops with availability tracking
//!
//! # Example
//!
//! ```rust,no_run
//! use aqara_cloud::{AqaraApi, AqaraConfig, AqaraCredentials, AqaraHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AqaraConfig::from_env()?;
//!     let credentials = AqaraCredentials::from_env()?;
//!     let client = AqaraHttpClient::new(config)?;
//!     client.login(&credentials.username, &credentials.password).await?;
//!     let devices = client.list_devices().await?;
//!     println!("{} devices", devices.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod poll;
pub mod registry;
pub mod state;

// Re-export main types
pub use crate::{
    client::{http_client::AqaraHttpClient, ApiResponse, AqaraApi, AqaraDevice},
    config::{credentials::AqaraCredentials, Area, AqaraConfig},
    error::{AqaraError, Result},
    poll::PollScheduler,
    registry::{AttrValue, AttributeSpec, DeviceFamily, SpecRegistry},
    state::Snapshot,
};
