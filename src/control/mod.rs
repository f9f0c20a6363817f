// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control facade.
//!
//! All user-initiated mutations go through [`LightController`]: validate,
//! mutate the in-memory store, then persist the full collection through the
//! [`SyncCoordinator`](crate::sync::SyncCoordinator).

mod controller;
mod update;

pub use controller::LightController;
pub use update::DeviceUpdate;
