// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted aggregates: devices, groups and settings.
//!
//! A [`Device`] refers to its [`Group`] weakly through `group_id`; a group
//! lists its members through `device_ids`. Neither side owns the other.

mod device;
mod group;
mod settings;

pub use device::Device;
pub use group::Group;
pub use settings::{
    DEFAULT_REMOTE_CONTAINER_ID, DEFAULT_SHARED_STORAGE_GROUP_ID, SyncedSettings,
};
