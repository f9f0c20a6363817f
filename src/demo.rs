// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sample devices for first runs and offline previews.

use crate::model::Device;
use crate::types::{Brightness, Capability, CapabilitySet, Color, ColorTemperature};

/// Returns a small set of representative devices.
///
/// Identifiers are stable so seeding twice replaces rather than duplicates.
#[must_use]
pub fn sample_devices() -> Vec<Device> {
    let color_only: CapabilitySet = [Capability::Color, Capability::Brightness]
        .into_iter()
        .collect();

    vec![
        Device::new("demo-H6008-01", "Living Room Bulb", "H6008")
            .with_capabilities(CapabilitySet::full_color())
            .with_color(Color::WHITE.with_temperature(ColorTemperature::WARM))
            .with_brightness(Brightness::clamped(80))
            .with_online(true),
        Device::new("demo-H6159-01", "TV Backlight", "H6159")
            .with_capabilities(color_only)
            .with_color(Color::new(64, 0, 255))
            .with_brightness(Brightness::clamped(45))
            .with_online(true),
        Device::new("demo-H6076-01", "Floor Lamp", "H6076")
            .with_capabilities(CapabilitySet::full_color())
            .with_color(Color::WHITE.with_temperature(ColorTemperature::DAYLIGHT)),
        Device::new("demo-H5080-01", "Desk Plug", "H5080").with_online(true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_have_unique_ids() {
        let devices = sample_devices();
        let mut ids: Vec<_> = devices.iter().map(|d| d.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), devices.len());
    }

    #[test]
    fn samples_cover_online_and_offline() {
        let devices = sample_devices();
        assert!(devices.iter().any(|d| d.is_online));
        assert!(devices.iter().any(|d| !d.is_online));
        assert!(devices.iter().any(|d| d.capabilities.is_empty()));
    }
}
