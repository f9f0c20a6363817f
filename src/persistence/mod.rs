// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Durable key-value persistence shared with the host application.
//!
//! The host process polls the same namespace and reads three JSON values:
//!
//! | Key | Value |
//! |---|---|
//! | `com.govee.smartlights.devices` | array of devices |
//! | `com.govee.smartlights.groups` | array of groups |
//! | `com.govee.smartlights.settings` | settings record |
//!
//! Timestamps are ISO-8601 strings without fractional seconds.

mod backend;
mod durable_store;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use durable_store::{
    BackendKind, DEVICES_KEY, DurableStore, GROUPS_KEY, SETTINGS_KEY, StorageConfig,
};
