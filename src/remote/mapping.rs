// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion between domain aggregates and flat records.

use crate::error::{Error, Result};
use crate::model::{Device, Group};
use crate::types::{Brightness, Capability, CapabilitySet, Color, ColorTemperature};

use super::Record;

/// Record type for devices.
pub const DEVICE_RECORD_TYPE: &str = "GoveeDevice";

/// Record type for groups.
pub const GROUP_RECORD_TYPE: &str = "DeviceGroup";

const LIST_SEPARATOR: char = ',';

/// Returns the record name for a device identifier.
#[must_use]
pub fn device_record_name(device_id: &str) -> String {
    format!("device-{device_id}")
}

/// Returns the record name for a group identifier.
#[must_use]
pub fn group_record_name(group_id: &str) -> String {
    format!("group-{group_id}")
}

/// Joins list items into a single delimited field.
///
/// # Examples
///
/// ```
/// use govee_sync::remote::{join_list, split_list};
///
/// assert_eq!(join_list(["a", "b"]), "a,b");
/// assert_eq!(split_list("a,b"), vec!["a", "b"]);
///
/// // The empty list survives the round trip
/// assert_eq!(join_list(Vec::<String>::new()), "");
/// assert!(split_list("").is_empty());
/// ```
pub fn join_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            joined.push(LIST_SEPARATOR);
        }
        joined.push_str(item.as_ref());
    }
    joined
}

/// Splits a delimited field back into list items.
///
/// An empty string is the empty list, not a list holding one empty item.
#[must_use]
pub fn split_list(joined: &str) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(LIST_SEPARATOR).map(str::to_string).collect()
}

/// Maps a device to its `GoveeDevice` record.
#[must_use]
pub fn device_to_record(device: &Device) -> Record {
    let mut record = Record::new(DEVICE_RECORD_TYPE, device_record_name(&device.id))
        .with_field("id", device.id.as_str())
        .with_field("name", device.name.as_str())
        .with_field("model", device.model.as_str())
        .with_field("isOnline", device.is_online)
        .with_field("powerState", device.power_state)
        .with_field("brightness", i64::from(device.brightness.value()))
        .with_field("colorRed", i64::from(device.color.red()))
        .with_field("colorGreen", i64::from(device.color.green()))
        .with_field("colorBlue", i64::from(device.color.blue()))
        .with_field("capabilities", join_list(device.capabilities.tags()))
        .with_field("lastSeen", device.last_seen);

    if let Some(kelvin) = device.color.temperature() {
        record.set("colorKelvin", i64::from(kelvin.kelvin()));
    }
    if let Some(group_id) = &device.group_id {
        record.set("groupId", group_id.as_str());
    }
    record
}

/// Maps a `GoveeDevice` record back to a device.
///
/// # Errors
///
/// Returns `Error::Decoding` if the record has the wrong type, a field is
/// missing or a value is out of range.
pub fn record_to_device(record: &Record) -> Result<Device> {
    expect_type(record, DEVICE_RECORD_TYPE)?;

    let invalid = |e: crate::error::ValueError| Error::decoding(record.record_name.clone(), e);

    let brightness = Brightness::new(record.int("brightness")?).map_err(invalid)?;
    let mut color = Color::from_channels(
        record.int("colorRed")?,
        record.int("colorGreen")?,
        record.int("colorBlue")?,
    )
    .map_err(invalid)?;
    if let Some(kelvin) = record.optional_int("colorKelvin")? {
        color = color.with_temperature(ColorTemperature::new(kelvin).map_err(invalid)?);
    }

    let capabilities: CapabilitySet = split_list(record.string("capabilities")?)
        .into_iter()
        .map(Capability::from)
        .collect();

    Ok(Device {
        id: record.string("id")?.to_string(),
        name: record.string("name")?.to_string(),
        model: record.string("model")?.to_string(),
        is_online: record.boolean("isOnline")?,
        power_state: record.boolean("powerState")?,
        brightness,
        color,
        capabilities,
        last_seen: record.timestamp("lastSeen")?,
        group_id: record.optional_string("groupId")?.map(str::to_string),
    })
}

/// Maps a group to its `DeviceGroup` record.
#[must_use]
pub fn group_to_record(group: &Group) -> Record {
    let mut record = Record::new(GROUP_RECORD_TYPE, group_record_name(&group.id))
        .with_field("id", group.id.as_str())
        .with_field("name", group.name.as_str())
        .with_field("deviceIds", join_list(&group.device_ids))
        .with_field("createdAt", group.created_at);

    if let Some(icon) = &group.icon {
        record.set("icon", icon.as_str());
    }
    record
}

/// Maps a `DeviceGroup` record back to a group.
///
/// # Errors
///
/// Returns `Error::Decoding` if the record has the wrong type, a field is
/// missing or the name is empty.
pub fn record_to_group(record: &Record) -> Result<Group> {
    expect_type(record, GROUP_RECORD_TYPE)?;

    let name = record.string("name")?;
    if name.trim().is_empty() {
        return Err(Error::decoding(record.record_name.clone(), "group name is empty"));
    }

    Ok(Group {
        id: record.string("id")?.to_string(),
        name: name.to_string(),
        device_ids: split_list(record.string("deviceIds")?),
        icon: record.optional_string("icon")?.map(str::to_string),
        created_at: record.timestamp("createdAt")?,
    })
}

fn expect_type(record: &Record, expected: &str) -> Result<()> {
    if record.record_type == expected {
        Ok(())
    } else {
        Err(Error::decoding(
            record.record_name.clone(),
            format!("expected {expected} record, got {}", record.record_type),
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::remote::FieldValue;

    fn device() -> Device {
        let mut device = Device::new("AA:BB", "Lamp", "H6008")
            .with_capabilities(CapabilitySet::full_color())
            .with_color(Color::new(10, 20, 30))
            .with_online(true);
        device.last_seen = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        device
    }

    #[test]
    fn record_names_are_prefixed() {
        assert_eq!(device_record_name("x"), "device-x");
        assert_eq!(group_record_name("y"), "group-y");
    }

    #[test]
    fn device_fields_are_flat() {
        let record = device_to_record(&device());
        assert_eq!(record.record_type, "GoveeDevice");
        assert_eq!(record.record_name, "device-AA:BB");
        assert_eq!(record.fields["isOnline"], FieldValue::Int64(1));
        assert_eq!(record.fields["powerState"], FieldValue::Int64(0));
        assert_eq!(
            record.fields["capabilities"],
            FieldValue::String("color,brightness,colorTemperature".to_string())
        );
        assert!(!record.fields.contains_key("colorKelvin"));
        assert!(!record.fields.contains_key("groupId"));
    }

    #[test]
    fn device_round_trip_with_kelvin_and_group() {
        let mut d = device();
        d.color = d.color.with_temperature(ColorTemperature::new(5000).unwrap());
        d.group_id = Some("g1".to_string());

        assert_eq!(record_to_device(&device_to_record(&d)).unwrap(), d);
    }

    #[test]
    fn empty_capabilities_round_trip_to_empty() {
        let mut d = device();
        d.capabilities = CapabilitySet::new();

        let record = device_to_record(&d);
        assert_eq!(record.fields["capabilities"], FieldValue::String(String::new()));

        let back = record_to_device(&record).unwrap();
        assert!(back.capabilities.is_empty());
        assert_eq!(back, d);
    }

    #[test]
    fn empty_group_membership_round_trips_to_empty() {
        let mut group = Group::new("Empty", Vec::<String>::new()).unwrap();
        group.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let back = record_to_group(&group_to_record(&group)).unwrap();
        assert!(back.device_ids.is_empty());
        assert_eq!(back, group);
    }

    #[test]
    fn group_round_trip() {
        let mut group = Group::new("Living", ["a", "b"]).unwrap().with_icon("sofa");
        group.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(record_to_group(&group_to_record(&group)).unwrap(), group);
    }

    #[test]
    fn out_of_range_brightness_is_rejected() {
        let mut record = device_to_record(&device());
        record.set("brightness", 300_i64);
        assert!(matches!(record_to_device(&record), Err(Error::Decoding { .. })));
    }

    #[test]
    fn wrong_record_type_is_rejected() {
        let record = group_to_record(&Group::new("G", ["a"]).unwrap());
        assert!(record_to_device(&record).is_err());
    }
}
