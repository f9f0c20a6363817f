// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-facing synchronization settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::Transport;
use crate::types::timestamp;

/// Default shared-storage namespace.
pub const DEFAULT_SHARED_STORAGE_GROUP_ID: &str = "group.com.govee.mac";

/// Default remote record-store container.
pub const DEFAULT_REMOTE_CONTAINER_ID: &str = "iCloud.com.govee.smartlights";

/// Flat settings record persisted in the durable store.
///
/// Settings are loaded once at startup and changed only through
/// [`LightController::update_settings`](crate::control::LightController::update_settings),
/// which also drives the transport enable/disable side effects. Missing keys
/// take their default value when decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
// Each flag is an independent user toggle.
#[allow(clippy::struct_excessive_bools)]
pub struct SyncedSettings {
    /// Sync through the remote record store.
    pub cloud_sync_enabled: bool,
    /// Local-network discovery (no working transport).
    pub local_network_enabled: bool,
    /// Bluetooth discovery (no working transport).
    pub bluetooth_enabled: bool,
    /// Share state through the shared storage namespace.
    pub shared_storage_enabled: bool,
    /// Seconds between automatic refreshes, 0 disables.
    pub auto_refresh_interval: u32,
    /// Whether offline devices are listed.
    pub show_offline_devices: bool,
    /// Last completed sync.
    #[serde(with = "timestamp::iso8601::option")]
    pub last_sync_time: Option<DateTime<Utc>>,
    /// Shared-storage namespace identifier.
    pub shared_storage_group_id: String,
    /// Remote container identifier.
    pub remote_container_id: String,
}

impl Default for SyncedSettings {
    fn default() -> Self {
        Self {
            cloud_sync_enabled: true,
            local_network_enabled: false,
            bluetooth_enabled: false,
            shared_storage_enabled: true,
            auto_refresh_interval: 30,
            show_offline_devices: true,
            last_sync_time: None,
            shared_storage_group_id: DEFAULT_SHARED_STORAGE_GROUP_ID.to_string(),
            remote_container_id: DEFAULT_REMOTE_CONTAINER_ID.to_string(),
        }
    }
}

impl SyncedSettings {
    /// Returns whether the toggle for `transport` is on.
    #[must_use]
    pub fn transport_enabled(&self, transport: Transport) -> bool {
        match transport {
            Transport::Remote => self.cloud_sync_enabled,
            Transport::SharedStorage => self.shared_storage_enabled,
            Transport::LocalNetwork => self.local_network_enabled,
            Transport::Bluetooth => self.bluetooth_enabled,
        }
    }
}
