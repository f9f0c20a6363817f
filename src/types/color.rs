// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types for light control.
//!
//! A [`Color`] always carries an RGB triple. A [`ColorTemperature`] in Kelvin
//! can be layered on top of it without discarding the RGB value, so devices
//! supporting both modes keep their last known color.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Color temperature in Kelvin (2000-9000).
///
/// # Examples
///
/// ```
/// use govee_sync::types::ColorTemperature;
///
/// let neutral = ColorTemperature::new(4000).unwrap();
/// assert_eq!(neutral.kelvin(), 4000);
///
/// assert!(ColorTemperature::new(1999).is_err());
/// assert!(ColorTemperature::new(9001).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u16")]
pub struct ColorTemperature(u16);

impl ColorTemperature {
    /// Minimum color temperature (warmest).
    pub const MIN: u16 = 2000;

    /// Maximum color temperature (coolest).
    pub const MAX: u16 = 9000;

    /// Warm white (2700K).
    pub const WARM: Self = Self(2700);

    /// Neutral white (4000K).
    pub const NEUTRAL: Self = Self(4000);

    /// Daylight (6500K).
    pub const DAYLIGHT: Self = Self(6500);

    /// Creates a new color temperature value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidKelvin` if value is outside [2000, 9000].
    pub fn new(kelvin: impl Into<i64>) -> Result<Self, ValueError> {
        let kelvin = kelvin.into();
        match u16::try_from(kelvin) {
            Ok(k) if (Self::MIN..=Self::MAX).contains(&k) => Ok(Self(k)),
            _ => Err(ValueError::InvalidKelvin(kelvin)),
        }
    }

    /// Returns the color temperature in Kelvin.
    #[must_use]
    pub const fn kelvin(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ColorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}

impl TryFrom<i64> for ColorTemperature {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColorTemperature> for u16 {
    fn from(value: ColorTemperature) -> Self {
        value.0
    }
}

/// Light color: an RGB triple with an optional color temperature overlay.
///
/// Serializes as `{"r":10,"g":20,"b":30}` with an additional `"kelvin"` key
/// when a temperature is present.
///
/// # Examples
///
/// ```
/// use govee_sync::types::{Color, ColorTemperature};
///
/// let color = Color::new(10, 20, 30);
/// let warm = color.with_temperature(ColorTemperature::WARM);
///
/// // RGB is preserved under the temperature overlay
/// assert_eq!((warm.red(), warm.green(), warm.blue()), (10, 20, 30));
/// assert_eq!(warm.temperature(), Some(ColorTemperature::WARM));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kelvin: Option<ColorTemperature>,
}

impl Color {
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Creates an RGB color without temperature.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self {
            r: red,
            g: green,
            b: blue,
            kelvin: None,
        }
    }

    /// Creates an RGB color from unchecked integer channels.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidChannel` naming the first channel outside
    /// [0, 255].
    pub fn from_channels(red: i64, green: i64, blue: i64) -> Result<Self, ValueError> {
        Ok(Self::new(
            channel("red", red)?,
            channel("green", green)?,
            channel("blue", blue)?,
        ))
    }

    /// Returns this color with `temperature` overlaid, keeping RGB.
    #[must_use]
    pub const fn with_temperature(self, temperature: ColorTemperature) -> Self {
        Self {
            kelvin: Some(temperature),
            ..self
        }
    }

    /// Returns the red channel.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.r
    }

    /// Returns the green channel.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.g
    }

    /// Returns the blue channel.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.b
    }

    /// Returns the overlaid color temperature, if any.
    #[must_use]
    pub const fn temperature(&self) -> Option<ColorTemperature> {
        self.kelvin
    }

    /// Returns the color as a hex string with the hash prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kelvin {
            Some(k) => write!(f, "{} @ {k}", self.to_hex()),
            None => f.write_str(&self.to_hex()),
        }
    }
}

fn channel(name: &'static str, value: i64) -> Result<u8, ValueError> {
    u8::try_from(value).map_err(|_| ValueError::InvalidChannel {
        channel: name,
        value,
    })
}
