// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observable coordinator status.

use chrono::{DateTime, Utc};

use super::Transport;

/// Connectivity snapshot published by the
/// [`SyncCoordinator`](super::SyncCoordinator).
///
/// Transport failures never surface as errors; they land here instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    /// Remote record store account is usable.
    pub is_connected_via_cloud: bool,
    /// Shared storage was read successfully.
    pub is_connected_via_shared_storage: bool,
    /// Human-readable outcome of the last operation.
    pub status_message: String,
    /// Last completed sync.
    pub last_sync_time: Option<DateTime<Utc>>,
}

impl SyncStatus {
    /// Returns the connected flag for `transport`.
    ///
    /// Transports without a bring-up are never connected.
    #[must_use]
    pub fn is_connected(&self, transport: Transport) -> bool {
        match transport {
            Transport::Remote => self.is_connected_via_cloud,
            Transport::SharedStorage => self.is_connected_via_shared_storage,
            Transport::LocalNetwork | Transport::Bluetooth => false,
        }
    }

    pub(crate) fn set_connected(&mut self, transport: Transport, connected: bool) {
        match transport {
            Transport::Remote => self.is_connected_via_cloud = connected,
            Transport::SharedStorage => self.is_connected_via_shared_storage = connected,
            Transport::LocalNetwork | Transport::Bluetooth => {}
        }
    }
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            is_connected_via_cloud: false,
            is_connected_via_shared_storage: false,
            status_message: "Not synced".to_string(),
            last_sync_time: None,
        }
    }
}
