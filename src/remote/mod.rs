// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote record store.
//!
//! Devices and groups are flattened into records of type `GoveeDevice` and
//! `DeviceGroup` and pushed to a [`RecordStore`]. The HTTP implementation is
//! behind the `http` feature.

#[cfg(feature = "http")]
mod http;
mod mapping;
mod record;
mod record_store;
mod remote_store;

#[cfg(feature = "http")]
pub use http::{HttpRecordStore, RemoteConfig};
pub use mapping::{
    DEVICE_RECORD_TYPE, GROUP_RECORD_TYPE, device_record_name, device_to_record,
    group_record_name, group_to_record, join_list, record_to_device, record_to_group, split_list,
};
pub use record::{FieldValue, Record};
pub use record_store::{AccountStatus, OfflineRecordStore, RecordSaveResult, RecordStore};
pub use remote_store::{RemoteStore, SaveReport};
