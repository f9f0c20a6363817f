// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronization transport identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A synchronization channel that can be enabled at runtime.
///
/// Only [`Remote`](Self::Remote) and [`SharedStorage`](Self::SharedStorage)
/// have a working bring-up. The other variants are reserved identifiers;
/// enabling them fails with
/// [`Error::TransportNotImplemented`](crate::Error::TransportNotImplemented).
///
/// # Examples
///
/// ```
/// use govee_sync::sync::Transport;
///
/// assert!(Transport::Remote.is_implemented());
/// assert!(!Transport::Bluetooth.is_implemented());
/// assert_eq!(Transport::SharedStorage.to_string(), "shared storage");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Transport {
    /// Remote record store relay.
    Remote,
    /// Shared cross-process durable storage.
    SharedStorage,
    /// Local-network discovery.
    LocalNetwork,
    /// Bluetooth discovery.
    Bluetooth,
}

impl Transport {
    /// Every transport, in bring-up order.
    pub const ALL: [Self; 4] = [
        Self::SharedStorage,
        Self::Remote,
        Self::LocalNetwork,
        Self::Bluetooth,
    ];

    /// Returns `true` if the transport has a working bring-up.
    #[must_use]
    pub const fn is_implemented(self) -> bool {
        matches!(self, Self::Remote | Self::SharedStorage)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Remote => "remote",
            Self::SharedStorage => "shared storage",
            Self::LocalNetwork => "local network",
            Self::Bluetooth => "bluetooth",
        };
        f.write_str(name)
    }
}
