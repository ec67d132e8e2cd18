//! Per-device polling scheduler
//!
//! Each watched device gets its own loop on the family's cadence, with at
//! most one fetch in flight per device. A failed poll keeps the last good
//! snapshot and flips the device to unavailable until the next success.
//! The startup probe is the exception: its failure escalates to the
//! caller so misconfiguration surfaces immediately instead of as a
//! silently-unavailable device.

use crate::client::{AqaraApi, AqaraDevice};
use crate::error::{AqaraError, Result};
use crate::registry::{DeviceFamily, SpecRegistry};
use crate::state::{composite, query, Snapshot};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Last known state of one watched device
#[derive(Debug, Clone)]
pub struct DeviceState {
    /// Most recent successful snapshot
    pub snapshot: Snapshot,

    /// Whether the most recent poll succeeded
    pub available: bool,
}

/// Owns the per-device poll loops and their shared state map
pub struct PollScheduler {
    api: Arc<dyn AqaraApi>,
    registry: Arc<SpecRegistry>,
    states: Arc<RwLock<HashMap<String, DeviceState>>>,
    tasks: Vec<JoinHandle<()>>,
}

impl PollScheduler {
    pub fn new(api: Arc<dyn AqaraApi>, registry: Arc<SpecRegistry>) -> Self {
        Self {
            api,
            registry,
            states: Arc::new(RwLock::new(HashMap::new())),
            tasks: Vec::new(),
        }
    }

    /// One-shot startup fetch; failure escalates to the caller
    pub async fn probe(&self, device: &AqaraDevice) -> Result<Snapshot> {
        let family = family_for(device)?;
        let snapshot = fetch_device(self.api.as_ref(), &self.registry, family, &device.did).await?;
        self.states.write().await.insert(
            device.did.clone(),
            DeviceState {
                snapshot: snapshot.clone(),
                available: true,
            },
        );
        info!(
            "probed {} ({}): {} attributes",
            device.did,
            device.model,
            snapshot.len()
        );
        Ok(snapshot)
    }

    /// Start the poll loop for one device
    pub fn watch(&mut self, device: AqaraDevice) -> Result<()> {
        let family = family_for(&device)?;
        let api = Arc::clone(&self.api);
        let registry = Arc::clone(&self.registry);
        let states = Arc::clone(&self.states);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(family.poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match fetch_device(api.as_ref(), &registry, family, &device.did).await {
                    Ok(snapshot) => {
                        debug!("polled {}: {} attributes", device.did, snapshot.len());
                        let mut states = states.write().await;
                        states.insert(
                            device.did.clone(),
                            DeviceState {
                                snapshot,
                                available: true,
                            },
                        );
                    }
                    Err(err) => {
                        warn!("poll failed for {}: {err}", device.did);
                        let mut states = states.write().await;
                        if let Some(state) = states.get_mut(&device.did) {
                            state.available = false;
                        } else {
                            states.insert(
                                device.did.clone(),
                                DeviceState {
                                    snapshot: Snapshot::new(),
                                    available: false,
                                },
                            );
                        }
                    }
                }
            }
        });
        self.tasks.push(handle);
        Ok(())
    }

    /// Last good snapshot for a device, if any poll ever succeeded
    pub async fn snapshot(&self, did: &str) -> Option<Snapshot> {
        self.states
            .read()
            .await
            .get(did)
            .map(|state| state.snapshot.clone())
    }

    /// Whether the most recent poll for a device succeeded
    pub async fn is_available(&self, did: &str) -> bool {
        self.states
            .read()
            .await
            .get(did)
            .map_or(false, |state| state.available)
    }

    /// Abort every poll loop
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn family_for(device: &AqaraDevice) -> Result<DeviceFamily> {
    DeviceFamily::for_model(&device.model).ok_or_else(|| {
        AqaraError::invalid_spec(format!(
            "no attribute family for model {} (device {})",
            device.model, device.did
        ))
    })
}

/// Dispatch one fetch by family
async fn fetch_device(
    api: &dyn AqaraApi,
    registry: &SpecRegistry,
    family: DeviceFamily,
    did: &str,
) -> Result<Snapshot> {
    match family {
        DeviceFamily::Presence => composite::fetch_full_state(api, did).await,
        family => query::fetch_states(api, did, registry.specs(family)).await,
    }
}
