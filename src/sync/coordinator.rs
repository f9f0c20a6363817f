// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport coordinator.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, watch};

use crate::error::{Error, Result};
use crate::model::{Device, Group, SyncedSettings};
use crate::persistence::DurableStore;
use crate::remote::{RecordStore, RemoteStore, SaveReport};
use crate::store::LightStore;
use crate::types::timestamp;

use super::{SyncStatus, Transport};

/// Single authority over which transports are active and the only writer
/// of the durable and remote backends.
///
/// Transport failures never propagate; they update [`SyncStatus`] and
/// leave the in-memory store untouched. Only durable encode/decode/storage
/// failures are returned as errors.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use govee_sync::persistence::DurableStore;
/// use govee_sync::remote::OfflineRecordStore;
/// use govee_sync::store::LightStore;
/// use govee_sync::sync::{SyncCoordinator, Transport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let coordinator = SyncCoordinator::new(
///     LightStore::new(),
///     DurableStore::local(),
///     Arc::new(OfflineRecordStore),
/// );
///
/// coordinator.enable_transport(Transport::SharedStorage).await.unwrap();
/// assert!(coordinator.status().is_connected_via_shared_storage);
///
/// assert!(coordinator.enable_transport(Transport::Bluetooth).await.is_err());
/// # }
/// ```
#[derive(Debug)]
pub struct SyncCoordinator {
    store: LightStore,
    durable: DurableStore,
    remote: RemoteStore,
    enabled: Mutex<BTreeSet<Transport>>,
    status: watch::Sender<SyncStatus>,
    /// Single-flight guard for `sync_now`.
    sync_lock: AsyncMutex<()>,
    /// Orders snapshot-and-persist sequences.
    persist_lock: AsyncMutex<()>,
    /// Orders settings writes.
    settings_lock: AsyncMutex<()>,
}

impl SyncCoordinator {
    /// Creates a coordinator with no transport enabled.
    #[must_use]
    pub fn new(store: LightStore, durable: DurableStore, records: Arc<dyn RecordStore>) -> Self {
        let remote = RemoteStore::new(records, durable.clone());
        let (status, _) = watch::channel(SyncStatus::default());

        Self {
            store,
            durable,
            remote,
            enabled: Mutex::new(BTreeSet::new()),
            status,
            sync_lock: AsyncMutex::new(()),
            persist_lock: AsyncMutex::new(()),
            settings_lock: AsyncMutex::new(()),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the in-memory store this coordinator fills.
    #[must_use]
    pub fn store(&self) -> &LightStore {
        &self.store
    }

    /// Returns the durable store.
    #[must_use]
    pub fn durable(&self) -> &DurableStore {
        &self.durable
    }

    /// Returns the current status snapshot.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Subscribes to status changes.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Returns `true` if `transport` is enabled.
    #[must_use]
    pub fn is_enabled(&self, transport: Transport) -> bool {
        self.enabled.lock().contains(&transport)
    }

    /// Returns the enabled transports.
    #[must_use]
    pub fn enabled_transports(&self) -> Vec<Transport> {
        self.enabled.lock().iter().copied().collect()
    }

    // =========================================================================
    // Transport lifecycle
    // =========================================================================

    /// Enables a transport and brings it up.
    ///
    /// Enabling an already-enabled transport does nothing. Bring-up failures
    /// are reported through [`status`](Self::status), not as errors.
    ///
    /// # Errors
    ///
    /// Returns `Error::TransportNotImplemented` for transports without a
    /// working bring-up. Such transports are never marked enabled.
    pub async fn enable_transport(&self, transport: Transport) -> Result<()> {
        if !transport.is_implemented() {
            tracing::warn!(%transport, "Transport is not implemented");
            self.set_message(format!("{transport} transport is not implemented"));
            return Err(Error::TransportNotImplemented(transport));
        }

        if !self.enabled.lock().insert(transport) {
            tracing::debug!(%transport, "Transport already enabled");
            return Ok(());
        }

        tracing::info!(%transport, "Enabling transport");
        self.bring_up(transport).await;
        Ok(())
    }

    /// Disables a transport and clears its connected flag.
    ///
    /// Disabling a transport that is not enabled does nothing. A
    /// bring-up still in flight for `transport` discards its result.
    pub fn disable_transport(&self, transport: Transport) {
        let mut enabled = self.enabled.lock();
        if !enabled.remove(&transport) {
            tracing::debug!(%transport, "Transport not enabled");
            return;
        }

        tracing::info!(%transport, "Disabled transport");
        self.status.send_modify(|s| {
            s.set_connected(transport, false);
            s.status_message = format!("Disabled {transport}");
        });
    }

    /// Re-runs bring-up for every enabled transport.
    ///
    /// Concurrent calls are serialized. The status message and sync time are
    /// stamped at the end regardless of individual transport outcomes; check
    /// the connected flags for per-transport results.
    pub async fn sync_now(&self) {
        let _guard = self.sync_lock.lock().await;

        let transports = self.enabled_transports();
        tracing::debug!(?transports, "Syncing enabled transports");
        for transport in transports {
            self.bring_up(transport).await;
        }

        let now = timestamp::now();
        self.status.send_modify(|s| {
            s.last_sync_time = Some(now);
            s.status_message = format!("Synced at {}", timestamp::format(&now));
        });
    }

    async fn bring_up(&self, transport: Transport) {
        match transport {
            Transport::Remote => self.bring_up_remote().await,
            Transport::SharedStorage => self.bring_up_shared_storage().await,
            Transport::LocalNetwork | Transport::Bluetooth => {}
        }
    }

    async fn bring_up_remote(&self) {
        let available = self.remote.check_availability().await;
        let applied = self.while_enabled(Transport::Remote, || {
            self.status.send_modify(|s| {
                s.is_connected_via_cloud = available;
                if !available {
                    s.status_message = "Remote record store unavailable".to_string();
                }
            });
        });
        if !applied || !available {
            return;
        }

        let devices = match self.remote.fetch_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!(error = %e, "Remote device fetch failed");
                self.while_enabled(Transport::Remote, || {
                    self.set_message(format!("Cloud sync failed: {e}"));
                });
                return;
            }
        };
        let count = devices.len();
        if !self.while_enabled(Transport::Remote, || self.store.replace_devices(devices)) {
            return;
        }

        match self.remote.fetch_groups().await {
            Ok(groups) => {
                if !self.while_enabled(Transport::Remote, || self.store.replace_groups(groups)) {
                    return;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Remote group fetch failed"),
        }

        let now = timestamp::now();
        self.while_enabled(Transport::Remote, || {
            tracing::info!(devices = count, "Synced from remote record store");
            self.status.send_modify(|s| {
                s.last_sync_time = Some(now);
                s.status_message = format!("Synced {count} devices from cloud");
            });
        });
    }

    async fn bring_up_shared_storage(&self) {
        let loaded = match self.durable.load_devices().await {
            Ok(devices) => self.durable.load_groups().await.map(|groups| (devices, groups)),
            Err(e) => Err(e),
        };

        self.while_enabled(Transport::SharedStorage, || match loaded {
            Ok((devices, groups)) => {
                let count = devices.len();
                self.store.replace_devices(devices);
                self.store.replace_groups(groups);
                tracing::info!(devices = count, "Loaded shared storage");
                self.status.send_modify(|s| {
                    s.is_connected_via_shared_storage = true;
                    s.status_message = format!("Loaded {count} devices from shared storage");
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Shared storage read failed");
                self.status.send_modify(|s| {
                    s.is_connected_via_shared_storage = false;
                    s.status_message = format!("Shared storage error: {e}");
                });
            }
        });
    }

    /// Runs `apply` only if `transport` is still enabled, holding the
    /// enabled set so a concurrent disable cannot interleave.
    fn while_enabled(&self, transport: Transport, apply: impl FnOnce()) -> bool {
        let enabled = self.enabled.lock();
        if !enabled.contains(&transport) {
            tracing::debug!(%transport, "Transport disabled during bring-up, discarding result");
            return false;
        }
        apply();
        true
    }

    // =========================================================================
    // Write fan-out
    // =========================================================================

    /// Writes devices durably, then to the remote store if connected.
    ///
    /// # Errors
    ///
    /// Returns the durable store's error. Remote failures only update the
    /// status.
    pub async fn save_devices(&self, devices: &[Device]) -> Result<()> {
        self.durable.save_devices(devices).await?;
        if self.status.borrow().is_connected_via_cloud {
            let report = self.remote.push_devices(devices).await;
            self.record_remote_outcome("devices", &report);
        }
        Ok(())
    }

    /// Writes groups durably, then to the remote store if connected.
    ///
    /// # Errors
    ///
    /// Returns the durable store's error.
    pub async fn save_groups(&self, groups: &[Group]) -> Result<()> {
        self.durable.save_groups(groups).await?;
        if self.status.borrow().is_connected_via_cloud {
            let report = self.remote.push_groups(groups).await;
            self.record_remote_outcome("groups", &report);
        }
        Ok(())
    }

    /// Snapshots the store's devices and saves them.
    ///
    /// Concurrent calls are ordered so a later snapshot is never overwritten
    /// by an earlier one.
    ///
    /// # Errors
    ///
    /// Returns the durable store's error.
    pub async fn persist_devices(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let devices = self.store.devices();
        self.save_devices(&devices).await
    }

    /// Snapshots the store's groups and saves them.
    ///
    /// # Errors
    ///
    /// Returns the durable store's error.
    pub async fn persist_groups(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let groups = self.store.groups();
        self.save_groups(&groups).await
    }

    fn record_remote_outcome(&self, what: &str, report: &SaveReport) {
        if report.is_complete() {
            return;
        }
        let message = match &report.error {
            Some(error) => format!("Cloud save of {what} failed: {error}"),
            None => format!(
                "Cloud save of {what} incomplete: {} of {} saved",
                report.saved, report.attempted
            ),
        };
        self.set_message(message);
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Loads settings from the durable store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` if the backend cannot be read.
    pub async fn load_settings(&self) -> Result<SyncedSettings> {
        self.durable.load_settings().await
    }

    /// Saves settings to the durable store. Settings never go remote.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encoding` or `Error::Storage`.
    pub async fn save_settings(&self, settings: &SyncedSettings) -> Result<()> {
        let _guard = self.settings_lock.lock().await;
        self.durable.save_settings(settings).await
    }

    /// Saves the settings `snapshot` returns. The snapshot is taken under
    /// the settings lock, so concurrent writers land in the order they read.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encoding` or `Error::Storage`.
    pub async fn persist_settings(&self, snapshot: impl FnOnce() -> SyncedSettings) -> Result<()> {
        let _guard = self.settings_lock.lock().await;
        let settings = snapshot();
        self.durable.save_settings(&settings).await
    }

    fn set_message(&self, message: String) {
        self.status.send_modify(|s| s.status_message = message);
    }
}
