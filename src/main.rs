//! Aqara cloud sync daemon
//!
//! Logs in, lists the account's devices, probes every supported one, and
//! keeps polling until interrupted.

use aqara_cloud::{
    AqaraApi, AqaraConfig, AqaraCredentials, AqaraHttpClient, DeviceFamily, PollScheduler,
    Result, SpecRegistry,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AqaraConfig::from_env()?;
    let credentials = AqaraCredentials::from_env()?;

    let client = Arc::new(AqaraHttpClient::new(config)?);
    let session = client
        .login(&credentials.username, &credentials.password)
        .await?;
    info!("logged in as user {}", session.user_id);

    let devices = client.list_devices().await?;
    info!("account has {} devices", devices.len());

    let registry = Arc::new(SpecRegistry::standard()?);
    let mut scheduler = PollScheduler::new(client.clone() as Arc<dyn AqaraApi>, registry);

    for device in devices {
        if DeviceFamily::for_model(&device.model).is_none() {
            warn!("skipping unsupported model {} ({})", device.model, device.did);
            continue;
        }
        scheduler.probe(&device).await?;
        scheduler.watch(device)?;
    }

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| aqara_cloud::AqaraError::config(format!("signal handler: {e}")))?;
    info!("shutting down");
    scheduler.stop();
    Ok(())
}
