// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport coordination.
//!
//! The [`SyncCoordinator`] decides which transports are active, fills the
//! in-memory store from them and fans writes out to the durable store
//! first and the remote store second. Its [`SyncStatus`] is published on a
//! watch channel:
//!
//! ```no_run
//! # async fn example(coordinator: &govee_sync::sync::SyncCoordinator) {
//! let mut status = coordinator.watch_status();
//! while status.changed().await.is_ok() {
//!     println!("{}", status.borrow().status_message);
//! }
//! # }
//! ```

mod coordinator;
mod status;
mod transport;

pub use coordinator::SyncCoordinator;
pub use status::SyncStatus;
pub use transport::Transport;
