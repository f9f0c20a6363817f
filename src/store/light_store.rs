// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observable in-memory device and group collections.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::{Device, Group};

use super::{EventBus, StoreEvent, StoreSubscription};

#[derive(Debug, Default)]
struct Collections {
    devices: Vec<Device>,
    groups: Vec<Group>,
}

/// Keyed, insertion-ordered collection of devices and groups.
///
/// The store is cheap to clone; clones share the same state and event bus.
/// All access goes through a short synchronous lock that is never held
/// across an `.await`, so persistence and network I/O always happen
/// outside of it. Events are published after the lock is released.
///
/// # Examples
///
/// ```
/// use govee_sync::model::Device;
/// use govee_sync::store::LightStore;
///
/// let store = LightStore::new();
/// store.replace_devices(vec![Device::new("d1", "Lamp", "H6008")]);
///
/// let updated = store.update_device("d1", |d| d.power_state = true);
/// assert!(updated.unwrap().power_state);
/// ```
#[derive(Debug, Clone)]
pub struct LightStore {
    inner: Arc<RwLock<Collections>>,
    event_bus: EventBus,
}

impl LightStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::new())
    }

    /// Creates an empty store publishing on `event_bus`.
    #[must_use]
    pub fn with_event_bus(event_bus: EventBus) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Collections::default())),
            event_bus,
        }
    }

    /// Subscribes to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> StoreSubscription {
        self.event_bus.subscribe()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns a snapshot of all devices.
    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        self.inner.read().devices.clone()
    }

    /// Returns a snapshot of all groups.
    #[must_use]
    pub fn groups(&self) -> Vec<Group> {
        self.inner.read().groups.clone()
    }

    /// Returns a device by identifier.
    #[must_use]
    pub fn device(&self, device_id: &str) -> Option<Device> {
        self.inner
            .read()
            .devices
            .iter()
            .find(|d| d.id == device_id)
            .cloned()
    }

    /// Returns a group by identifier.
    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<Group> {
        self.inner
            .read()
            .groups
            .iter()
            .find(|g| g.id == group_id)
            .cloned()
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.inner.read().devices.len()
    }

    /// Returns the number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.inner.read().groups.len()
    }

    // =========================================================================
    // Wholesale replace
    // =========================================================================

    /// Replaces every device, dropping duplicate identifiers (last one wins).
    pub fn replace_devices(&self, devices: Vec<Device>) {
        let devices = dedup_by_id(devices, |d| &d.id);
        let count = devices.len();
        self.inner.write().devices = devices;
        self.event_bus.publish(StoreEvent::DevicesReplaced { count });
    }

    /// Replaces every group, dropping duplicate identifiers (last one wins).
    pub fn replace_groups(&self, groups: Vec<Group>) {
        let groups = dedup_by_id(groups, |g| &g.id);
        let count = groups.len();
        self.inner.write().groups = groups;
        self.event_bus.publish(StoreEvent::GroupsReplaced { count });
    }

    // =========================================================================
    // Single-record edits
    // =========================================================================

    /// Inserts a device or replaces the one with the same identifier.
    pub fn upsert_device(&self, device: Device) {
        self.edit(|txn| txn.upsert_device(device));
    }

    /// Mutates a device in place, returning the result.
    pub fn update_device<F>(&self, device_id: &str, f: F) -> Option<Device>
    where
        F: FnOnce(&mut Device),
    {
        self.edit(|txn| {
            let device = txn.device_mut(device_id)?;
            f(device);
            Some(device.clone())
        })
    }

    /// Removes a device, returning it if it existed.
    pub fn remove_device(&self, device_id: &str) -> Option<Device> {
        self.edit(|txn| txn.remove_device(device_id))
    }

    /// Runs `f` with exclusive access to both collections.
    ///
    /// Use this for edits that must keep devices and groups consistent with
    /// each other. Change events for everything touched through the
    /// transaction are published once `f` returns.
    pub fn edit<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut StoreTxn<'_>) -> R,
    {
        let (result, events) = {
            let mut guard = self.inner.write();
            let mut txn = StoreTxn {
                collections: &mut *guard,
                touched_devices: Vec::new(),
                touched_groups: Vec::new(),
                removed: Vec::new(),
            };
            let result = f(&mut txn);
            (result, txn.into_events())
        };

        for event in events {
            self.event_bus.publish(event);
        }
        result
    }
}

impl Default for LightStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive view of the store used by [`LightStore::edit`].
pub struct StoreTxn<'a> {
    collections: &'a mut Collections,
    touched_devices: Vec<String>,
    touched_groups: Vec<String>,
    removed: Vec<StoreEvent>,
}

impl StoreTxn<'_> {
    /// Returns a device by identifier.
    #[must_use]
    pub fn device(&self, device_id: &str) -> Option<&Device> {
        self.collections.devices.iter().find(|d| d.id == device_id)
    }

    /// Returns a mutable device and marks it changed.
    pub fn device_mut(&mut self, device_id: &str) -> Option<&mut Device> {
        let device = self
            .collections
            .devices
            .iter_mut()
            .find(|d| d.id == device_id)?;
        mark(&mut self.touched_devices, device_id);
        Some(device)
    }

    /// Returns a group by identifier.
    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.collections.groups.iter().find(|g| g.id == group_id)
    }

    /// Returns a mutable group and marks it changed.
    pub fn group_mut(&mut self, group_id: &str) -> Option<&mut Group> {
        let group = self
            .collections
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)?;
        mark(&mut self.touched_groups, group_id);
        Some(group)
    }

    /// Returns all devices.
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.collections.devices
    }

    /// Returns all groups.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.collections.groups
    }

    /// Inserts a device or replaces the one with the same identifier.
    pub fn upsert_device(&mut self, device: Device) {
        mark(&mut self.touched_devices, &device.id);
        match self
            .collections
            .devices
            .iter_mut()
            .find(|d| d.id == device.id)
        {
            Some(existing) => *existing = device,
            None => self.collections.devices.push(device),
        }
    }

    /// Removes a device, returning it if it existed.
    pub fn remove_device(&mut self, device_id: &str) -> Option<Device> {
        let index = self
            .collections
            .devices
            .iter()
            .position(|d| d.id == device_id)?;
        self.touched_devices.retain(|id| id != device_id);
        self.removed.push(StoreEvent::DeviceRemoved {
            device_id: device_id.to_string(),
        });
        Some(self.collections.devices.remove(index))
    }

    /// Inserts a group or replaces the one with the same identifier.
    pub fn upsert_group(&mut self, group: Group) {
        mark(&mut self.touched_groups, &group.id);
        match self
            .collections
            .groups
            .iter_mut()
            .find(|g| g.id == group.id)
        {
            Some(existing) => *existing = group,
            None => self.collections.groups.push(group),
        }
    }

    /// Removes a group, returning it if it existed.
    pub fn remove_group(&mut self, group_id: &str) -> Option<Group> {
        let index = self
            .collections
            .groups
            .iter()
            .position(|g| g.id == group_id)?;
        self.touched_groups.retain(|id| id != group_id);
        self.removed.push(StoreEvent::GroupRemoved {
            group_id: group_id.to_string(),
        });
        Some(self.collections.groups.remove(index))
    }

    fn into_events(self) -> Vec<StoreEvent> {
        let mut events = self.removed;
        for id in &self.touched_devices {
            if let Some(device) = self.collections.devices.iter().find(|d| &d.id == id) {
                events.push(StoreEvent::DeviceChanged {
                    device: device.clone(),
                });
            }
        }
        for id in &self.touched_groups {
            if let Some(group) = self.collections.groups.iter().find(|g| &g.id == id) {
                events.push(StoreEvent::GroupChanged {
                    group: group.clone(),
                });
            }
        }
        events
    }
}

fn mark(touched: &mut Vec<String>, id: &str) {
    if !touched.iter().any(|t| t == id) {
        touched.push(id.to_string());
    }
}

fn dedup_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> &String) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        match out.iter().position(|existing| id(existing) == id(&item)) {
            Some(index) => out[index] = item,
            None => out.push(item),
        }
    }
    out
}
