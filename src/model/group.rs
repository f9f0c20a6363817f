// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device group record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::types::timestamp;

/// A named set of devices.
///
/// A group references its members by identifier and does not own them.
/// Membership consistency with each device's `group_id` is maintained by the
/// [`LightController`](crate::control::LightController).
///
/// # Examples
///
/// ```
/// use govee_sync::model::Group;
///
/// let group = Group::new("Living Room", ["d1", "d2", "d1"]).unwrap();
/// assert_eq!(group.device_ids, vec!["d1", "d2"]);
///
/// assert!(Group::new("  ", ["d1"]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Identifier, generated locally when absent.
    #[serde(default = "new_group_id")]
    pub id: String,
    /// Display name, never empty.
    pub name: String,
    /// Ordered member identifiers without duplicates.
    #[serde(default)]
    pub device_ids: Vec<String>,
    /// Optional icon tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Creation time.
    #[serde(with = "timestamp::iso8601")]
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Creates a group with a fresh identifier.
    ///
    /// Duplicate member identifiers are dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyName` if `name` is blank.
    pub fn new<I, S>(name: impl Into<String>, device_ids: I) -> Result<Self, ValueError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValueError::EmptyName("group"));
        }

        let mut group = Self {
            id: new_group_id(),
            name,
            device_ids: Vec::new(),
            icon: None,
            created_at: timestamp::now(),
        };
        for id in device_ids {
            group.add_member(id);
        }
        Ok(group)
    }

    /// Sets the icon tag.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Returns `true` if the device is a member.
    #[must_use]
    pub fn contains(&self, device_id: &str) -> bool {
        self.device_ids.iter().any(|id| id == device_id)
    }

    /// Appends a member, returning `false` if it was already present.
    pub fn add_member(&mut self, device_id: impl Into<String>) -> bool {
        let device_id = device_id.into();
        if self.contains(&device_id) {
            return false;
        }
        self.device_ids.push(device_id);
        true
    }

    /// Removes a member, returning `true` if it was present.
    pub fn remove_member(&mut self, device_id: &str) -> bool {
        let before = self.device_ids.len();
        self.device_ids.retain(|id| id != device_id);
        self.device_ids.len() != before
    }
}

fn new_group_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
