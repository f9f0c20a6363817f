// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for light control.
//!
//! This module provides a type-safe representation of brightness values,
//! ensuring values are always within the valid range of 0-100%.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Brightness level as a percentage (0-100).
///
/// # Examples
///
/// ```
/// use govee_sync::types::Brightness;
///
/// let level = Brightness::new(75).unwrap();
/// assert_eq!(level.value(), 75);
///
/// assert_eq!(Brightness::MIN.value(), 0);
/// assert_eq!(Brightness::MAX.value(), 100);
///
/// // Invalid values return error
/// assert!(Brightness::new(101).is_err());
/// assert!(Brightness::new(-1).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Brightness(u8);

impl Brightness {
    /// Minimum brightness (0%).
    pub const MIN: Self = Self(0);

    /// Maximum brightness (100%).
    pub const MAX: Self = Self(100);

    /// Creates a new brightness value.
    ///
    /// Accepts any integer so that out-of-range user input is reported
    /// instead of silently truncated.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidBrightness` if value is outside [0, 100].
    pub fn new(value: impl Into<i64>) -> Result<Self, ValueError> {
        let value = value.into();
        match u8::try_from(value) {
            Ok(v) if v <= 100 => Ok(Self(v)),
            _ => Err(ValueError::InvalidBrightness(value)),
        }
    }

    /// Creates a brightness value, clamping to the valid range.
    ///
    /// # Examples
    ///
    /// ```
    /// use govee_sync::types::Brightness;
    ///
    /// assert_eq!(Brightness::clamped(150).value(), 100);
    /// ```
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Returns the brightness percentage value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<i64> for Brightness {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Brightness> for u8 {
    fn from(value: Brightness) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_valid_values() {
        for v in 0..=100_i64 {
            let level = Brightness::new(v).unwrap();
            assert_eq!(i64::from(level.value()), v);
        }
    }

    #[test]
    fn brightness_invalid_values() {
        assert_eq!(Brightness::new(101), Err(ValueError::InvalidBrightness(101)));
        assert_eq!(Brightness::new(-5), Err(ValueError::InvalidBrightness(-5)));
        assert!(Brightness::new(i64::MAX).is_err());
    }

    #[test]
    fn brightness_clamped() {
        assert_eq!(Brightness::clamped(50).value(), 50);
        assert_eq!(Brightness::clamped(255).value(), 100);
    }

    #[test]
    fn brightness_serializes_as_integer() {
        let json = serde_json::to_string(&Brightness::new(42).unwrap()).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn brightness_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<Brightness>("250").is_err());
        assert_eq!(
            serde_json::from_str::<Brightness>("7").unwrap(),
            Brightness::new(7).unwrap()
        );
    }

    #[test]
    fn brightness_display() {
        assert_eq!(Brightness::new(75).unwrap().to_string(), "75%");
    }
}
