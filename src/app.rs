// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Application wiring.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::control::LightController;
use crate::error::Result;
use crate::persistence::{DurableStore, StorageConfig};
#[cfg(feature = "http")]
use crate::remote::RemoteConfig;
use crate::remote::{OfflineRecordStore, RecordStore};
use crate::store::{EventBus, LightStore};

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use govee_sync::app::AppConfig;
/// use govee_sync::persistence::StorageConfig;
///
/// let config = AppConfig::new()
///     .with_storage(StorageConfig::new().with_shared_root("/tmp/govee"))
///     .with_event_capacity(64);
/// assert_eq!(config.event_capacity(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    storage: StorageConfig,
    #[cfg(feature = "http")]
    remote: Option<RemoteConfig>,
    event_capacity: usize,
}

impl AppConfig {
    /// Default capacity of the store event bus.
    pub const DEFAULT_EVENT_CAPACITY: usize = EventBus::DEFAULT_CAPACITY;

    /// Creates a configuration with process-local storage and no remote.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: StorageConfig::new(),
            #[cfg(feature = "http")]
            remote: None,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Sets the durable storage configuration.
    #[must_use]
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Sets the remote record store.
    #[cfg(feature = "http")]
    #[must_use]
    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Sets the event bus capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Returns the storage configuration.
    #[must_use]
    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    /// Returns the event bus capacity.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    fn record_store(&self) -> Result<Arc<dyn RecordStore>> {
        #[cfg(feature = "http")]
        {
            if let Some(remote) = &self.remote {
                return Ok(Arc::new(remote.clone().into_store()?));
            }
        }
        Ok(Arc::new(OfflineRecordStore))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Composition root: owns the store, coordinator and controller.
///
/// # Examples
///
/// ```no_run
/// use govee_sync::app::{AppConfig, SmartLights};
///
/// #[tokio::main]
/// async fn main() -> govee_sync::Result<()> {
///     let app = SmartLights::start(AppConfig::new()).await?;
///     app.spawn_auto_refresh();
///
///     for device in app.controller().visible_devices() {
///         println!("{} ({})", device.name, device.model);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct SmartLights {
    controller: Arc<LightController>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl SmartLights {
    /// Opens storage, loads settings and enables the selected transports.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if settings cannot be read, or
    /// `Error::Network` if the HTTP client cannot be built.
    pub async fn start(config: AppConfig) -> Result<Self> {
        let durable = DurableStore::open(config.storage()).await;
        let records = config.record_store()?;
        Self::start_with(
            durable,
            records,
            EventBus::with_capacity(config.event_capacity()),
        )
        .await
    }

    /// Starts over explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if settings cannot be read.
    pub async fn start_with(
        durable: DurableStore,
        records: Arc<dyn RecordStore>,
        event_bus: EventBus,
    ) -> Result<Self> {
        tracing::info!(storage = %durable.info(), "Starting smart lights");
        let settings = durable.load_settings().await?;

        let store = LightStore::with_event_bus(event_bus);
        let coordinator = Arc::new(crate::sync::SyncCoordinator::new(store, durable, records));
        let controller = Arc::new(LightController::new(coordinator, settings));
        controller.apply_transport_settings().await;

        Ok(Self {
            controller,
            refresh_task: Mutex::new(None),
        })
    }

    /// Returns the controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<LightController> {
        &self.controller
    }

    /// Starts refreshing every `auto_refresh_interval` seconds.
    ///
    /// The interval is re-read whenever settings change; 0 pauses the
    /// refresh. Replaces any previously spawned task.
    pub fn spawn_auto_refresh(&self) {
        let controller = Arc::clone(&self.controller);
        let handle = tokio::spawn(auto_refresh(controller));
        if let Some(previous) = self.refresh_task.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Stops the auto-refresh task, if any.
    pub fn stop_auto_refresh(&self) {
        if let Some(handle) = self.refresh_task.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for SmartLights {
    fn drop(&mut self) {
        self.stop_auto_refresh();
    }
}

async fn auto_refresh(controller: Arc<LightController>) {
    let mut settings = controller.watch_settings();

    loop {
        let interval = settings.borrow_and_update().auto_refresh_interval;
        if interval == 0 {
            tracing::debug!("Auto-refresh paused");
            if settings.changed().await.is_err() {
                break;
            }
            continue;
        }

        tokio::select! {
            () = tokio::time::sleep(Duration::from_secs(u64::from(interval))) => {
                tracing::debug!(interval, "Auto-refresh");
                controller.refresh().await;
            }
            changed = settings.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SyncedSettings;

    #[tokio::test]
    async fn start_enables_default_transports() {
        let app = SmartLights::start(AppConfig::new()).await.unwrap();
        let coordinator = app.controller().coordinator();

        assert!(coordinator.is_enabled(crate::sync::Transport::SharedStorage));
        assert!(coordinator.is_enabled(crate::sync::Transport::Remote));
        assert!(coordinator.status().is_connected_via_shared_storage);
        assert!(!coordinator.status().is_connected_via_cloud);
    }

    #[tokio::test]
    async fn start_honours_stored_settings() {
        let durable = DurableStore::local();
        durable
            .save_settings(&SyncedSettings {
                cloud_sync_enabled: false,
                ..SyncedSettings::default()
            })
            .await
            .unwrap();

        let app = SmartLights::start_with(durable, Arc::new(OfflineRecordStore), EventBus::new())
            .await
            .unwrap();

        assert!(!app.controller().coordinator().is_enabled(crate::sync::Transport::Remote));
    }
}
