// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Store change events.

use crate::model::{Device, Group};

/// Change notifications emitted by the [`LightStore`](super::LightStore).
///
/// Events are published after the store lock is released, so a subscriber
/// may immediately read the store and observe the change.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The device collection was replaced wholesale.
    DevicesReplaced {
        /// Number of devices after the replace.
        count: usize,
    },

    /// A device was inserted or mutated.
    DeviceChanged {
        /// The device after the change.
        device: Device,
    },

    /// A device was removed.
    DeviceRemoved {
        /// The identifier of the removed device.
        device_id: String,
    },

    /// The group collection was replaced wholesale.
    GroupsReplaced {
        /// Number of groups after the replace.
        count: usize,
    },

    /// A group was inserted or mutated.
    GroupChanged {
        /// The group after the change.
        group: Group,
    },

    /// A group was removed.
    GroupRemoved {
        /// The identifier of the removed group.
        group_id: String,
    },

    /// The subscriber fell behind and events were dropped. Re-read the
    /// store.
    Resync {
        /// Number of events dropped.
        missed: u64,
    },
}

impl StoreEvent {
    /// Returns `true` when observers should re-read whole collections.
    #[must_use]
    pub fn is_replace(&self) -> bool {
        matches!(
            self,
            Self::DevicesReplaced { .. } | Self::GroupsReplaced { .. } | Self::Resync { .. }
        )
    }

    /// Returns the device identifier for device-scoped events.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::DeviceChanged { device } => Some(&device.id),
            Self::DeviceRemoved { device_id } => Some(device_id),
            _ => None,
        }
    }
}
