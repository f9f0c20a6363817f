// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Durable store adapter.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::model::{DEFAULT_SHARED_STORAGE_GROUP_ID, Device, Group, SyncedSettings};

use super::backend::{FileBackend, KeyValueBackend, MemoryBackend};

/// Key holding the JSON array of devices.
pub const DEVICES_KEY: &str = "com.govee.smartlights.devices";

/// Key holding the JSON array of groups.
pub const GROUPS_KEY: &str = "com.govee.smartlights.groups";

/// Key holding the JSON settings record.
pub const SETTINGS_KEY: &str = "com.govee.smartlights.settings";

/// Configuration for the durable store.
///
/// # Examples
///
/// ```
/// use govee_sync::persistence::StorageConfig;
///
/// let config = StorageConfig::new()
///     .with_shared_root("/var/lib/govee")
///     .with_group_id("group.com.example.lights");
/// assert_eq!(config.group_id(), "group.com.example.lights");
/// ```
#[derive(Debug, Clone)]
pub struct StorageConfig {
    shared_root: Option<PathBuf>,
    group_id: String,
}

impl StorageConfig {
    /// Creates a configuration with no shared root and the default group.
    ///
    /// Without a shared root the store always uses the process-local
    /// fallback.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared_root: None,
            group_id: DEFAULT_SHARED_STORAGE_GROUP_ID.to_string(),
        }
    }

    /// Sets the directory containing shared namespaces.
    #[must_use]
    pub fn with_shared_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.shared_root = Some(root.into());
        self
    }

    /// Sets the shared namespace identifier.
    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = group_id.into();
        self
    }

    /// Returns the shared root, if configured.
    #[must_use]
    pub fn shared_root(&self) -> Option<&PathBuf> {
        self.shared_root.as_ref()
    }

    /// Returns the shared namespace identifier.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Which kind of backend the durable store is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// The shared cross-process namespace.
    Shared,
    /// The process-local fallback.
    Local,
}

/// Encodes devices, groups and settings to a namespaced key-value backend.
///
/// Reads of an absent key return an empty collection or the default
/// settings. A corrupt device or group value is a [`Error::Decoding`];
/// corrupt settings are logged and replaced by the defaults so startup never
/// fails on them.
///
/// The store is cheap to clone; clones share the backend.
#[derive(Debug, Clone)]
pub struct DurableStore {
    backend: Arc<dyn KeyValueBackend>,
    kind: BackendKind,
}

impl DurableStore {
    /// Binds the shared namespace, falling back to process-local storage.
    ///
    /// The fallback is transparent: both backends store identical bytes and
    /// every operation behaves the same. Use [`info`](Self::info) to tell
    /// them apart.
    pub async fn open(config: &StorageConfig) -> Self {
        let Some(root) = config.shared_root() else {
            tracing::info!("No shared storage root configured, using process-local storage");
            return Self::local();
        };

        match FileBackend::open(root, config.group_id()).await {
            Ok(backend) => {
                tracing::info!(dir = %backend.dir().display(), "Bound shared storage namespace");
                Self::with_backend(Arc::new(backend), BackendKind::Shared)
            }
            Err(e) => {
                tracing::warn!(
                    group_id = config.group_id(),
                    error = %e,
                    "Shared storage unavailable, falling back to process-local storage"
                );
                Self::local()
            }
        }
    }

    /// Creates a store over a process-local memory backend.
    #[must_use]
    pub fn local() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), BackendKind::Local)
    }

    /// Creates a store over an arbitrary backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn KeyValueBackend>, kind: BackendKind) -> Self {
        Self { backend, kind }
    }

    /// Returns which backend is bound.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Returns `true` when bound to the shared namespace.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.kind == BackendKind::Shared
    }

    /// Diagnostic description of the active backend.
    #[must_use]
    pub fn info(&self) -> String {
        match self.kind {
            BackendKind::Shared => format!("Shared storage: {}", self.backend.describe()),
            BackendKind::Local => format!("Local storage (fallback): {}", self.backend.describe()),
        }
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// Loads devices; an absent key yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decoding` for corrupt data or `Error::Storage` if the
    /// backend cannot be read.
    pub async fn load_devices(&self) -> Result<Vec<Device>> {
        Ok(self.load(DEVICES_KEY, "devices").await?.unwrap_or_default())
    }

    /// Saves the full device list.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encoding` or `Error::Storage`.
    pub async fn save_devices(&self, devices: &[Device]) -> Result<()> {
        self.save(DEVICES_KEY, "devices", devices).await
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Loads groups; an absent key yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decoding` for corrupt data or `Error::Storage` if the
    /// backend cannot be read.
    pub async fn load_groups(&self) -> Result<Vec<Group>> {
        Ok(self.load(GROUPS_KEY, "groups").await?.unwrap_or_default())
    }

    /// Saves the full group list.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encoding` or `Error::Storage`.
    pub async fn save_groups(&self, groups: &[Group]) -> Result<()> {
        self.save(GROUPS_KEY, "groups", groups).await
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Loads settings; absent or corrupt data yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Storage` only if the backend itself cannot be read.
    pub async fn load_settings(&self) -> Result<SyncedSettings> {
        match self.load(SETTINGS_KEY, "settings").await {
            Ok(settings) => Ok(settings.unwrap_or_default()),
            Err(e @ Error::Decoding { .. }) => {
                tracing::warn!(error = %e, "Discarding corrupt settings, using defaults");
                Ok(SyncedSettings::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Saves the settings record.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encoding` or `Error::Storage`.
    pub async fn save_settings(&self, settings: &SyncedSettings) -> Result<()> {
        self.save(SETTINGS_KEY, "settings", settings).await
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    async fn load<T: DeserializeOwned>(&self, key: &str, what: &str) -> Result<Option<T>> {
        let Some(bytes) = self.backend.get(key).await? else {
            tracing::debug!(key, "No stored value");
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::decoding(what, e))
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, what: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| Error::encoding(what, e))?;
        tracing::debug!(key, bytes = bytes.len(), "Writing durable value");
        self.backend.set(key, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CapabilitySet;

    #[tokio::test]
    async fn empty_store_returns_empty_collections_and_defaults() {
        let store = DurableStore::local();
        assert!(store.load_devices().await.unwrap().is_empty());
        assert!(store.load_groups().await.unwrap().is_empty());
        assert_eq!(store.load_settings().await.unwrap(), SyncedSettings::default());
    }

    #[tokio::test]
    async fn devices_round_trip() {
        let store = DurableStore::local();
        let devices = vec![
            Device::new("a", "A", "H6008").with_capabilities(CapabilitySet::full_color()),
            Device::new("b", "B", "H6159"),
        ];

        store.save_devices(&devices).await.unwrap();
        assert_eq!(store.load_devices().await.unwrap(), devices);
    }

    #[tokio::test]
    async fn corrupt_devices_is_a_decoding_error() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set(DEVICES_KEY, b"{not json".to_vec()).await.unwrap();
        let store = DurableStore::with_backend(backend, BackendKind::Local);

        let err = store.load_devices().await.unwrap_err();
        assert!(matches!(err, Error::Decoding { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn corrupt_settings_fall_back_to_defaults() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set(SETTINGS_KEY, b"[]".to_vec()).await.unwrap();
        let store = DurableStore::with_backend(backend, BackendKind::Local);

        assert_eq!(store.load_settings().await.unwrap(), SyncedSettings::default());
    }

    #[tokio::test]
    async fn open_without_root_is_local() {
        let store = DurableStore::open(&StorageConfig::new()).await;
        assert_eq!(store.kind(), BackendKind::Local);
        assert!(store.info().starts_with("Local storage"));
    }

    #[tokio::test]
    async fn open_with_root_is_shared() {
        let root = tempfile::tempdir().unwrap();
        let config = StorageConfig::new().with_shared_root(root.path());
        let store = DurableStore::open(&config).await;

        assert!(store.is_shared());
        assert!(store.info().contains("group.com.govee.mac"));
        assert!(root.path().join("group.com.govee.mac").is_dir());
    }

    #[tokio::test]
    async fn open_falls_back_when_root_is_unusable() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let store = DurableStore::open(&StorageConfig::new().with_shared_root(&file)).await;
        assert_eq!(store.kind(), BackendKind::Local);

        // Fallback behaves identically
        store.save_settings(&SyncedSettings::default()).await.unwrap();
        assert_eq!(store.load_settings().await.unwrap(), SyncedSettings::default());
    }
}
