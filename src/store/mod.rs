// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory store with change notification.
//!
//! The [`LightStore`] is the authoritative in-process view of devices and
//! groups. It supports two kinds of writes: wholesale replace (sync reads)
//! and mutate-by-id (user intents). Every write is announced on an
//! [`EventBus`], so any number of observers can follow the store without
//! depending on a UI framework. An observer that falls behind receives
//! [`StoreEvent::Resync`] and re-reads the store.
//!
//! # Examples
//!
//! ```
//! use govee_sync::store::{LightStore, StoreEvent};
//!
//! # async fn example() {
//! let store = LightStore::new();
//! let mut events = store.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         if let StoreEvent::DeviceChanged { device } = event {
//!             println!("{} is now {}", device.name, device.power_state);
//!         }
//!     }
//! });
//! # }
//! ```

mod event;
mod event_bus;
mod light_store;

pub use event::StoreEvent;
pub use event_bus::{EventBus, StoreSubscription};
pub use light_store::{LightStore, StoreTxn};
