// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-facing light controller.

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{Error, Result, ValueError};
use crate::model::{Device, Group, SyncedSettings};
use crate::store::{LightStore, StoreTxn};
use crate::sync::{SyncCoordinator, Transport};
use crate::types::{Brightness, Capability, Color, ColorTemperature};

use super::update::{DeviceUpdate, require_capability};

/// Which collections a mutation dirtied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dirty {
    Devices,
    Both,
}

/// Entry point for every user-initiated mutation.
///
/// Each operation validates its input, applies the change to the in-memory
/// store in one critical section and then persists the full collection
/// through the [`SyncCoordinator`]. Validation errors leave the store
/// untouched. Persistence failures for devices and groups are logged and
/// swallowed so the in-memory state keeps reflecting the request.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use govee_sync::control::LightController;
/// use govee_sync::model::{Device, SyncedSettings};
/// use govee_sync::persistence::DurableStore;
/// use govee_sync::remote::OfflineRecordStore;
/// use govee_sync::store::LightStore;
/// use govee_sync::sync::SyncCoordinator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> govee_sync::Result<()> {
/// let coordinator = Arc::new(SyncCoordinator::new(
///     LightStore::new(),
///     DurableStore::local(),
///     Arc::new(OfflineRecordStore),
/// ));
/// let lights = LightController::new(coordinator, SyncedSettings::default());
///
/// lights.add_device(Device::new("d1", "Desk", "H6008")).await?;
/// lights.set_brightness("d1", 40).await?;
///
/// assert_eq!(lights.device("d1").unwrap().brightness.value(), 40);
/// assert!(lights.set_brightness("d1", 140).await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LightController {
    coordinator: Arc<SyncCoordinator>,
    settings: watch::Sender<SyncedSettings>,
}

impl LightController {
    /// Creates a controller over `coordinator` with the given settings.
    ///
    /// The settings are not applied; call
    /// [`apply_transport_settings`](Self::apply_transport_settings) to
    /// enable the transports they select.
    #[must_use]
    pub fn new(coordinator: Arc<SyncCoordinator>, settings: SyncedSettings) -> Self {
        let (settings, _) = watch::channel(settings);
        Self {
            coordinator,
            settings,
        }
    }

    /// Returns the coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.coordinator
    }

    fn store(&self) -> &LightStore {
        self.coordinator.store()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns all devices.
    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        self.store().devices()
    }

    /// Returns the devices to display, hiding offline ones unless
    /// `show_offline_devices` is set.
    #[must_use]
    pub fn visible_devices(&self) -> Vec<Device> {
        let show_offline = self.settings.borrow().show_offline_devices;
        self.store()
            .devices()
            .into_iter()
            .filter(|d| show_offline || d.is_online)
            .collect()
    }

    /// Returns a device by identifier.
    #[must_use]
    pub fn device(&self, device_id: &str) -> Option<Device> {
        self.store().device(device_id)
    }

    /// Returns all groups.
    #[must_use]
    pub fn groups(&self) -> Vec<Group> {
        self.store().groups()
    }

    /// Returns a group by identifier.
    #[must_use]
    pub fn group(&self, group_id: &str) -> Option<Group> {
        self.store().group(group_id)
    }

    /// Returns the current settings.
    #[must_use]
    pub fn settings(&self) -> SyncedSettings {
        self.settings.borrow().clone()
    }

    /// Subscribes to settings changes.
    #[must_use]
    pub fn watch_settings(&self) -> watch::Receiver<SyncedSettings> {
        self.settings.subscribe()
    }

    // =========================================================================
    // Device control
    // =========================================================================

    /// Turns a device on or off.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if the device does not exist.
    pub async fn set_power(&self, device_id: &str, on: bool) -> Result<Device> {
        let device = self.update_existing(device_id, |d| {
            d.power_state = on;
            Ok(())
        })?;
        self.persist(Dirty::Devices).await;
        Ok(device)
    }

    /// Flips a device's power state.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if the device does not exist.
    pub async fn toggle_power(&self, device_id: &str) -> Result<Device> {
        let device = self.update_existing(device_id, |d| {
            d.power_state = !d.power_state;
            Ok(())
        })?;
        self.persist(Dirty::Devices).await;
        Ok(device)
    }

    /// Sets a device's brightness (0-100).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the value is out of range or
    /// `Error::DeviceNotFound` if the device does not exist.
    pub async fn set_brightness(&self, device_id: &str, value: i64) -> Result<Device> {
        let brightness = Brightness::new(value)?;
        let device = self.update_existing(device_id, |d| {
            d.brightness = brightness;
            Ok(())
        })?;
        self.persist(Dirty::Devices).await;
        Ok(device)
    }

    /// Sets a device's RGB color, clearing any color temperature.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if a channel is out of range or the
    /// device lacks the `color` capability, or `Error::DeviceNotFound`.
    pub async fn set_color(&self, device_id: &str, red: i64, green: i64, blue: i64) -> Result<Device> {
        let color = Color::from_channels(red, green, blue)?;
        let device = self.update_existing(device_id, |d| {
            require_capability(d, &Capability::Color)?;
            d.color = color;
            Ok(())
        })?;
        self.persist(Dirty::Devices).await;
        Ok(device)
    }

    /// Overlays a color temperature onto a device's current RGB color.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the value is outside 2000-9000 K or
    /// the device lacks the `colorTemperature` capability, or
    /// `Error::DeviceNotFound`.
    pub async fn set_color_temperature(&self, device_id: &str, kelvin: i64) -> Result<Device> {
        let temperature = ColorTemperature::new(kelvin)?;
        let device = self.update_existing(device_id, |d| {
            require_capability(d, &Capability::ColorTemperature)?;
            d.color = d.color.with_temperature(temperature);
            Ok(())
        })?;
        self.persist(Dirty::Devices).await;
        Ok(device)
    }

    /// Renames a device.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a blank name or
    /// `Error::DeviceNotFound`.
    pub async fn rename_device(&self, device_id: &str, name: &str) -> Result<Device> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValueError::EmptyName("device").into());
        }
        let device = self.update_existing(device_id, |d| {
            d.name = name.to_string();
            Ok(())
        })?;
        self.persist(Dirty::Devices).await;
        Ok(device)
    }

    /// Applies several device updates and persists once.
    ///
    /// Every update is validated, and every target device checked, before
    /// any device changes. One bad update rejects the whole batch.
    ///
    /// # Errors
    ///
    /// Returns the first validation error, `Error::DeviceNotFound`, or
    /// `Error::InvalidInput` for a missing capability.
    pub async fn batch_update(&self, updates: Vec<DeviceUpdate>) -> Result<Vec<Device>> {
        let updates = updates
            .iter()
            .filter(|u| !u.is_empty())
            .map(DeviceUpdate::validate)
            .collect::<Result<Vec<_>>>()?;
        if updates.is_empty() {
            return Ok(Vec::new());
        }

        let devices = self.store().edit(|txn| {
            for update in &updates {
                let device = txn
                    .device(&update.device_id)
                    .ok_or_else(|| Error::DeviceNotFound(update.device_id.clone()))?;
                update.check_capabilities(device)?;
            }

            let mut changed = Vec::with_capacity(updates.len());
            for update in &updates {
                if let Some(device) = txn.device_mut(&update.device_id) {
                    update.apply(device);
                    changed.push(device.clone());
                }
            }
            Ok::<_, Error>(changed)
        })?;

        tracing::debug!(count = devices.len(), "Applied batch update");
        self.persist(Dirty::Devices).await;
        Ok(devices)
    }

    // =========================================================================
    // Device lifecycle
    // =========================================================================

    /// Inserts a device, or replaces the one with the same identifier.
    ///
    /// A `group_id` naming an existing group makes the device a member of
    /// it; a dangling one is cleared.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a blank identifier or name.
    pub async fn add_device(&self, mut device: Device) -> Result<Device> {
        if device.id.trim().is_empty() {
            return Err(Error::InvalidInput("device id must not be empty".to_string()));
        }
        if device.name.trim().is_empty() {
            return Err(ValueError::EmptyName("device").into());
        }
        device.touch();

        let (device, dirty) = self.store().edit(|txn| {
            let previous_group = txn.device(&device.id).and_then(|d| d.group_id.clone());
            let target_group = device
                .group_id
                .take()
                .filter(|gid| txn.group(gid).is_some());

            let mut dirty = Dirty::Devices;
            if previous_group != target_group {
                if let Some(old) = &previous_group {
                    if let Some(group) = txn.group_mut(old) {
                        group.remove_member(&device.id);
                    }
                }
                dirty = Dirty::Both;
            }
            if let Some(gid) = &target_group {
                if let Some(group) = txn.group_mut(gid) {
                    if group.add_member(device.id.clone()) {
                        dirty = Dirty::Both;
                    }
                }
            }

            device.group_id = target_group;
            txn.upsert_device(device.clone());
            (device, dirty)
        });

        tracing::info!(device_id = %device.id, "Added device");
        self.persist(dirty).await;
        Ok(device)
    }

    /// Removes a device and its group membership.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if the device does not exist.
    pub async fn remove_device(&self, device_id: &str) -> Result<Device> {
        let (device, left_group) = self.store().edit(|txn| {
            let device = txn
                .remove_device(device_id)
                .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;
            let left_group = detach_from_groups(txn, device_id);
            Ok::<_, Error>((device, left_group))
        })?;

        tracing::info!(device_id, "Removed device");
        self.persist(if left_group { Dirty::Both } else { Dirty::Devices })
            .await;
        Ok(device)
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Creates a group from existing devices.
    ///
    /// Member devices leave any group they were in. Creation is
    /// all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a blank name or
    /// `Error::DeviceNotFound` naming the first unknown device.
    pub async fn create_group<I, S>(&self, name: &str, device_ids: I) -> Result<Group>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let group = Group::new(name.trim(), device_ids)?;

        let group = self.store().edit(|txn| {
            if let Some(missing) = group.device_ids.iter().find(|id| txn.device(id).is_none()) {
                return Err(Error::DeviceNotFound(missing.clone()));
            }

            for device_id in &group.device_ids {
                detach_from_groups(txn, device_id);
                if let Some(device) = txn.device_mut(device_id) {
                    device.group_id = Some(group.id.clone());
                    device.touch();
                }
            }
            txn.upsert_group(group.clone());
            Ok(group)
        })?;

        tracing::info!(group_id = %group.id, members = group.device_ids.len(), "Created group");
        self.persist(Dirty::Both).await;
        Ok(group)
    }

    /// Deletes a group and clears its members' back-references.
    ///
    /// # Errors
    ///
    /// Returns `Error::GroupNotFound` if the group does not exist.
    pub async fn delete_group(&self, group_id: &str) -> Result<Group> {
        let group = self.store().edit(|txn| {
            let group = txn
                .remove_group(group_id)
                .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))?;

            let referencing: Vec<String> = txn
                .devices()
                .iter()
                .filter(|d| d.group_id.as_deref() == Some(group_id))
                .map(|d| d.id.clone())
                .collect();
            for device_id in referencing {
                if let Some(device) = txn.device_mut(&device_id) {
                    device.group_id = None;
                    device.touch();
                }
            }
            Ok::<_, Error>(group)
        })?;

        tracing::info!(group_id, "Deleted group");
        self.persist(Dirty::Both).await;
        Ok(group)
    }

    /// Turns every member of a group on or off.
    ///
    /// Members missing from the store are skipped. Returns the number of
    /// devices changed.
    ///
    /// # Errors
    ///
    /// Returns `Error::GroupNotFound` if the group does not exist.
    pub async fn set_group_power(&self, group_id: &str, on: bool) -> Result<usize> {
        let changed = self.update_members(group_id, |d| {
            d.power_state = on;
            true
        })?;
        self.persist(Dirty::Devices).await;
        Ok(changed)
    }

    /// Sets the brightness of every member of a group.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an out-of-range value or
    /// `Error::GroupNotFound`.
    pub async fn set_group_brightness(&self, group_id: &str, value: i64) -> Result<usize> {
        let brightness = Brightness::new(value)?;
        let changed = self.update_members(group_id, |d| {
            d.brightness = brightness;
            true
        })?;
        self.persist(Dirty::Devices).await;
        Ok(changed)
    }

    /// Sets the color of every color-capable member of a group.
    ///
    /// Members without the `color` capability are skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an out-of-range channel or
    /// `Error::GroupNotFound`.
    pub async fn set_group_color(
        &self,
        group_id: &str,
        red: i64,
        green: i64,
        blue: i64,
    ) -> Result<usize> {
        let color = Color::from_channels(red, green, blue)?;
        let changed = self.update_members(group_id, |d| {
            if !d.supports(&Capability::Color) {
                tracing::debug!(device_id = %d.id, "Skipping member without color");
                return false;
            }
            d.color = color;
            true
        })?;
        self.persist(Dirty::Devices).await;
        Ok(changed)
    }

    /// Moves a device into a group.
    ///
    /// # Errors
    ///
    /// Returns `Error::GroupNotFound` or `Error::DeviceNotFound`.
    pub async fn add_device_to_group(&self, group_id: &str, device_id: &str) -> Result<Group> {
        let group = self.store().edit(|txn| {
            if txn.group(group_id).is_none() {
                return Err(Error::GroupNotFound(group_id.to_string()));
            }
            if txn.device(device_id).is_none() {
                return Err(Error::DeviceNotFound(device_id.to_string()));
            }

            let already_member = txn
                .device(device_id)
                .is_some_and(|d| d.group_id.as_deref() == Some(group_id));
            if !already_member {
                detach_from_groups(txn, device_id);
            }
            if let Some(device) = txn.device_mut(device_id) {
                device.group_id = Some(group_id.to_string());
                device.touch();
            }
            let group = txn
                .group_mut(group_id)
                .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))?;
            group.add_member(device_id);
            Ok(group.clone())
        })?;

        self.persist(Dirty::Both).await;
        Ok(group)
    }

    /// Removes a device from a group.
    ///
    /// Returns `false` if the device was not a member.
    ///
    /// # Errors
    ///
    /// Returns `Error::GroupNotFound` if the group does not exist.
    pub async fn remove_device_from_group(&self, group_id: &str, device_id: &str) -> Result<bool> {
        let removed = self.store().edit(|txn| {
            let group = txn
                .group_mut(group_id)
                .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))?;
            let removed = group.remove_member(device_id);

            if let Some(device) = txn.device_mut(device_id) {
                if device.group_id.as_deref() == Some(group_id) {
                    device.group_id = None;
                    device.touch();
                }
            }
            Ok::<_, Error>(removed)
        })?;

        if removed {
            self.persist(Dirty::Both).await;
        }
        Ok(removed)
    }

    // =========================================================================
    // Settings and sync
    // =========================================================================

    /// Saves new settings and applies their transport toggles.
    ///
    /// Every toggle transition is applied even when the save fails.
    ///
    /// # Errors
    ///
    /// Returns the settings save error, after the toggles were applied.
    pub async fn update_settings(&self, settings: SyncedSettings) -> Result<()> {
        let mut previous = None;
        let saved = self
            .coordinator
            .persist_settings(|| {
                previous = Some(self.settings.send_replace(settings.clone()));
                settings.clone()
            })
            .await;
        if let Err(e) = &saved {
            tracing::error!(error = %e, "Failed to persist settings");
        }

        self.reconcile_transports(previous.as_ref(), &settings).await;
        saved
    }

    /// Enables every transport the current settings select.
    ///
    /// Used once at startup. Transports without a bring-up are logged and
    /// skipped.
    pub async fn apply_transport_settings(&self) {
        let settings = self.settings();
        self.reconcile_transports(None, &settings).await;
    }

    /// Re-syncs every enabled transport and records the sync time in the
    /// settings.
    pub async fn refresh(&self) {
        self.coordinator.sync_now().await;

        let last_sync_time = self.coordinator.status().last_sync_time;
        let saved = self
            .coordinator
            .persist_settings(|| {
                self.settings.send_modify(|s| s.last_sync_time = last_sync_time);
                self.settings()
            })
            .await;
        if let Err(e) = saved {
            tracing::warn!(error = %e, "Failed to persist last sync time");
        }
    }

    async fn reconcile_transports(
        &self,
        previous: Option<&SyncedSettings>,
        settings: &SyncedSettings,
    ) {
        for transport in Transport::ALL {
            let wanted = settings.transport_enabled(transport);
            let was = previous.is_some_and(|p| p.transport_enabled(transport));

            if wanted && !was {
                if let Err(e) = self.coordinator.enable_transport(transport).await {
                    tracing::warn!(%transport, error = %e, "Could not enable transport");
                }
            } else if !wanted {
                self.coordinator.disable_transport(transport);
            }
        }
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn update_existing<F>(&self, device_id: &str, f: F) -> Result<Device>
    where
        F: FnOnce(&mut Device) -> Result<()>,
    {
        self.store().edit(|txn| {
            let device = txn
                .device(device_id)
                .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;

            // Validate on a copy so a rejected change leaves the store untouched
            let mut updated = device.clone();
            f(&mut updated)?;
            updated.touch();
            txn.upsert_device(updated.clone());
            Ok(updated)
        })
    }

    fn update_members<F>(&self, group_id: &str, mut f: F) -> Result<usize>
    where
        F: FnMut(&mut Device) -> bool,
    {
        self.store().edit(|txn| {
            let members = txn
                .group(group_id)
                .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))?
                .device_ids
                .clone();

            let mut changed = 0;
            for device_id in &members {
                let Some(mut device) = txn.device(device_id).cloned() else {
                    tracing::debug!(group_id, device_id = %device_id, "Skipping missing member");
                    continue;
                };
                if f(&mut device) {
                    device.touch();
                    txn.upsert_device(device);
                    changed += 1;
                }
            }
            Ok(changed)
        })
    }

    async fn persist(&self, dirty: Dirty) {
        if let Err(e) = self.coordinator.persist_devices().await {
            tracing::error!(error = %e, "Failed to persist devices");
        }
        if dirty == Dirty::Both {
            if let Err(e) = self.coordinator.persist_groups().await {
                tracing::error!(error = %e, "Failed to persist groups");
            }
        }
    }
}

/// Removes `device_id` from every group listing it. Returns `true` if any
/// group changed.
fn detach_from_groups(txn: &mut StoreTxn<'_>, device_id: &str) -> bool {
    let holding: Vec<String> = txn
        .groups()
        .iter()
        .filter(|g| g.contains(device_id))
        .map(|g| g.id.clone())
        .collect();

    for group_id in &holding {
        if let Some(group) = txn.group_mut(group_id) {
            group.remove_member(device_id);
        }
    }
    !holding.is_empty()
}
