// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for smart-light state.
//!
//! Each constrained type validates its range at construction time and again
//! when decoded, so an out-of-range value can never enter the store.
//!
//! # Types
//!
//! - [`Brightness`] - Brightness level (0-100%)
//! - [`Color`] - RGB triple with optional Kelvin overlay
//! - [`ColorTemperature`] - Color temperature in Kelvin (2000-9000)
//! - [`Capability`] / [`CapabilitySet`] - Control capability tags

mod brightness;
mod capability;
mod color;
pub mod timestamp;

pub use brightness::Brightness;
pub use capability::{Capability, CapabilitySet};
pub use color::{Color, ColorTemperature};
