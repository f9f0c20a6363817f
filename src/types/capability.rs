// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capability tags.
//!
//! Capabilities govern which light controls are valid for a device. They are
//! stored as plain string tags so that tags written by a newer host
//! application survive a round trip through this library unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A single capability tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Capability {
    /// RGB color control (`"color"`).
    Color,
    /// Brightness control (`"brightness"`).
    Brightness,
    /// Color temperature control (`"colorTemperature"`).
    ColorTemperature,
    /// A tag this library does not interpret.
    Other(String),
}

impl Capability {
    /// Returns the wire tag for this capability.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Color => "color",
            Self::Brightness => "brightness",
            Self::ColorTemperature => "colorTemperature",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for Capability {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "color" => Self::Color,
            "brightness" => Self::Brightness,
            "colorTemperature" => Self::ColorTemperature,
            _ => Self::Other(tag),
        }
    }
}

impl From<Capability> for String {
    fn from(capability: Capability) -> Self {
        match capability {
            Capability::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Capability {
    type Err = ValueError;

    /// Parses a known capability tag; unknown tags are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::from(s.to_string()) {
            Self::Other(tag) => Err(ValueError::UnknownCapability(tag)),
            known => Ok(known),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An insertion-ordered set of capability tags.
///
/// # Examples
///
/// ```
/// use govee_sync::types::{Capability, CapabilitySet};
///
/// let caps = CapabilitySet::from_iter([Capability::Color, Capability::Brightness]);
/// assert!(caps.contains(&Capability::Color));
/// assert!(!caps.contains(&Capability::ColorTemperature));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Capability>", into = "Vec<Capability>")]
pub struct CapabilitySet(Vec<Capability>);

impl CapabilitySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Color, brightness and color temperature.
    #[must_use]
    pub fn full_color() -> Self {
        Self(vec![
            Capability::Color,
            Capability::Brightness,
            Capability::ColorTemperature,
        ])
    }

    /// Inserts a tag, returning `false` if it was already present.
    pub fn insert(&mut self, capability: Capability) -> bool {
        if self.contains(&capability) {
            return false;
        }
        self.0.push(capability);
        true
    }

    /// Returns `true` if the tag is present.
    #[must_use]
    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    /// Returns `true` if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    /// Returns the wire tags in insertion order.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.0.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = Self::new();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl From<Vec<Capability>> for CapabilitySet {
    fn from(tags: Vec<Capability>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<CapabilitySet> for Vec<Capability> {
    fn from(set: CapabilitySet) -> Self {
        set.0
    }
}
