// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `govee_sync` - keeps smart-light state in sync across transports.
//!
//! The library mirrors a collection of lights and groups between an
//! in-memory store, a durable key-value namespace shared with a host
//! application, and a best-effort remote record store. The host reads the
//! desired state from the shared namespace, drives the hardware and writes
//! back reachability.
//!
//! # Architecture
//!
//! - [`control::LightController`]: validates and applies user mutations
//! - [`sync::SyncCoordinator`]: enables transports and fans writes out,
//!   durable first, remote best-effort
//! - [`persistence::DurableStore`]: JSON values under three well-known keys
//! - [`remote::RemoteStore`]: flat records pushed to a [`remote::RecordStore`]
//! - [`store::LightStore`]: the in-memory view with change events
//!
//! # Quick Start
//!
//! ```no_run
//! use govee_sync::app::{AppConfig, SmartLights};
//! use govee_sync::persistence::StorageConfig;
//!
//! #[tokio::main]
//! async fn main() -> govee_sync::Result<()> {
//!     let config = AppConfig::new()
//!         .with_storage(StorageConfig::new().with_shared_root("/var/lib/govee"));
//!     let app = SmartLights::start(config).await?;
//!     let lights = app.controller();
//!
//!     lights.set_power("AA:BB:CC:DD:EE:FF", true).await?;
//!     lights.set_color_temperature("AA:BB:CC:DD:EE:FF", 2700).await?;
//!
//!     let group = lights.create_group("Living Room", ["AA:BB:CC:DD:EE:FF"]).await?;
//!     lights.set_group_brightness(&group.id, 60).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Observing changes
//!
//! ```no_run
//! # async fn example(app: govee_sync::app::SmartLights) {
//! let mut events = app.controller().coordinator().store().subscribe();
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # }
//! ```
//!
//! # Features
//!
//! - `http` (default): [`remote::HttpRecordStore`] backed by `reqwest`

pub mod app;
pub mod control;
pub mod demo;
pub mod error;
pub mod model;
pub mod persistence;
pub mod remote;
pub mod store;
pub mod sync;
pub mod types;

pub use app::{AppConfig, SmartLights};
pub use control::{DeviceUpdate, LightController};
pub use error::{Error, Result, ValueError};
pub use model::{Device, Group, SyncedSettings};
pub use sync::{SyncCoordinator, SyncStatus, Transport};
pub use types::{Brightness, Capability, CapabilitySet, Color, ColorTemperature};
