// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan-out of store changes to observers.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use super::StoreEvent;

/// Fans [`StoreEvent`]s out to any number of [`StoreSubscription`]s.
///
/// Cloning yields another handle on the same channel, so a bus can be
/// created up front and handed to the store while the caller keeps a handle
/// for subscribing.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Events buffered per subscriber before it is considered lagging.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a bus with [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a bus buffering at most `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> StoreSubscription {
        StoreSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub(crate) fn publish(&self, event: StoreEvent) {
        // Nobody listening
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A subscriber's view of store changes.
///
/// A subscriber that falls behind does not get an error. It receives one
/// [`StoreEvent::Resync`] in place of the dropped events and should re-read
/// the store.
///
/// # Examples
///
/// ```
/// use govee_sync::model::Device;
/// use govee_sync::store::{LightStore, StoreEvent};
///
/// let store = LightStore::new();
/// let mut events = store.subscribe();
///
/// store.replace_devices(vec![Device::new("d1", "Desk", "H6008")]);
/// assert_eq!(events.try_recv(), Some(StoreEvent::DevicesReplaced { count: 1 }));
/// assert_eq!(events.try_recv(), None);
/// ```
#[derive(Debug)]
pub struct StoreSubscription {
    receiver: broadcast::Receiver<StoreEvent>,
}

impl StoreSubscription {
    /// Waits for the next event.
    ///
    /// Returns `None` once every store handle has been dropped.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(missed)) => Some(lagged(missed)),
            Err(RecvError::Closed) => None,
        }
    }

    /// Returns the next buffered event without waiting.
    pub fn try_recv(&mut self) -> Option<StoreEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Lagged(missed)) => Some(lagged(missed)),
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }
}

fn lagged(missed: u64) -> StoreEvent {
    tracing::warn!(missed, "Store subscriber lagged, requesting resync");
    StoreEvent::Resync { missed }
}
