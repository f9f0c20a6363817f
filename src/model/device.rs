// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Brightness, Capability, CapabilitySet, Color, timestamp};

/// A smart light as mirrored from the host application.
///
/// Devices are created by the host (or locally as demo data), replaced
/// wholesale on every successful sync read and mutated field by field by the
/// [`LightController`](crate::control::LightController). `is_online` is the
/// host's view of device reachability, not connectivity of this library.
///
/// # Examples
///
/// ```
/// use govee_sync::model::Device;
/// use govee_sync::types::{Capability, CapabilitySet};
///
/// let device = Device::new("AA:BB:CC:DD:EE:FF", "Desk Lamp", "H6008")
///     .with_capabilities(CapabilitySet::full_color());
///
/// assert!(device.supports(&Capability::ColorTemperature));
/// assert!(device.group_id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Stable opaque identifier, typically the hardware address.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hardware model string.
    pub model: String,
    /// Host-reported reachability.
    pub is_online: bool,
    /// Desired power state.
    pub power_state: bool,
    /// Desired brightness.
    pub brightness: Brightness,
    /// Desired color.
    pub color: Color,
    /// Supported controls.
    pub capabilities: CapabilitySet,
    /// Time of the last local mutation or host report.
    #[serde(with = "timestamp::iso8601")]
    pub last_seen: DateTime<Utc>,
    /// Weak back-reference to the group containing this device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl Device {
    /// Creates an offline, powered-off device at full brightness.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            model: model.into(),
            is_online: false,
            power_state: false,
            brightness: Brightness::MAX,
            color: Color::WHITE,
            capabilities: CapabilitySet::new(),
            last_seen: timestamp::now(),
            group_id: None,
        }
    }

    /// Sets the capability tags.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Sets the color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Sets the brightness.
    #[must_use]
    pub fn with_brightness(mut self, brightness: Brightness) -> Self {
        self.brightness = brightness;
        self
    }

    /// Sets the online flag.
    #[must_use]
    pub fn with_online(mut self, online: bool) -> Self {
        self.is_online = online;
        self
    }

    /// Returns `true` if the device declares the capability.
    #[must_use]
    pub fn supports(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Stamps `last_seen` with the current time.
    pub fn touch(&mut self) {
        self.last_seen = timestamp::now();
    }
}
