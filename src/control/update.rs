// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batched device updates.

use crate::error::{Error, Result};
use crate::model::Device;
use crate::types::{Brightness, Capability, Color, ColorTemperature};

/// A set of changes to one device, applied by
/// [`LightController::batch_update`](super::LightController::batch_update).
///
/// Raw values are validated when the batch is applied, before any device is
/// touched.
///
/// # Examples
///
/// ```
/// use govee_sync::control::DeviceUpdate;
///
/// let update = DeviceUpdate::new("d1").power(true).brightness(40);
/// assert_eq!(update.device_id(), "d1");
/// assert!(!update.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceUpdate {
    device_id: String,
    power: Option<bool>,
    brightness: Option<i64>,
    color: Option<(i64, i64, i64)>,
    color_temperature: Option<i64>,
}

impl DeviceUpdate {
    /// Starts an empty update for `device_id`.
    #[must_use]
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Self::default()
        }
    }

    /// Sets the power state.
    #[must_use]
    pub fn power(mut self, on: bool) -> Self {
        self.power = Some(on);
        self
    }

    /// Sets the brightness (0-100).
    #[must_use]
    pub fn brightness(mut self, value: i64) -> Self {
        self.brightness = Some(value);
        self
    }

    /// Sets the RGB color, clearing any color temperature.
    #[must_use]
    pub fn color(mut self, red: i64, green: i64, blue: i64) -> Self {
        self.color = Some((red, green, blue));
        self
    }

    /// Overlays a color temperature in Kelvin.
    ///
    /// Applied after [`color`](Self::color) when both are set.
    #[must_use]
    pub fn color_temperature(mut self, kelvin: i64) -> Self {
        self.color_temperature = Some(kelvin);
        self
    }

    /// Returns the target device.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns `true` if the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.power.is_none()
            && self.brightness.is_none()
            && self.color.is_none()
            && self.color_temperature.is_none()
    }

    pub(crate) fn validate(&self) -> Result<ValidUpdate> {
        Ok(ValidUpdate {
            device_id: self.device_id.clone(),
            power: self.power,
            brightness: self.brightness.map(Brightness::new).transpose()?,
            color: self
                .color
                .map(|(r, g, b)| Color::from_channels(r, g, b))
                .transpose()?,
            color_temperature: self
                .color_temperature
                .map(ColorTemperature::new)
                .transpose()?,
        })
    }
}

/// An update whose values passed range validation.
#[derive(Debug, Clone)]
pub(crate) struct ValidUpdate {
    pub(crate) device_id: String,
    power: Option<bool>,
    brightness: Option<Brightness>,
    color: Option<Color>,
    color_temperature: Option<ColorTemperature>,
}

impl ValidUpdate {
    /// Checks the device declares every capability the update needs.
    pub(crate) fn check_capabilities(&self, device: &Device) -> Result<()> {
        if self.color.is_some() {
            require_capability(device, &Capability::Color)?;
        }
        if self.color_temperature.is_some() {
            require_capability(device, &Capability::ColorTemperature)?;
        }
        Ok(())
    }

    pub(crate) fn apply(&self, device: &mut Device) {
        if let Some(on) = self.power {
            device.power_state = on;
        }
        if let Some(brightness) = self.brightness {
            device.brightness = brightness;
        }
        if let Some(color) = self.color {
            device.color = color;
        }
        if let Some(kelvin) = self.color_temperature {
            device.color = device.color.with_temperature(kelvin);
        }
        device.touch();
    }
}

/// Fails with `InvalidInput` unless `device` declares `capability`.
pub(crate) fn require_capability(device: &Device, capability: &Capability) -> Result<()> {
    if device.supports(capability) {
        return Ok(());
    }
    let what = match capability {
        Capability::ColorTemperature => "color temperature",
        other => other.as_str(),
    };
    Err(Error::InvalidInput(format!("device does not support {what}")))
}
