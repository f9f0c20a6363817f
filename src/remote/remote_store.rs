// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Best-effort remote mirror of devices and groups.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{Device, Group};
use crate::persistence::DurableStore;

use super::mapping::{
    DEVICE_RECORD_TYPE, GROUP_RECORD_TYPE, device_to_record, group_to_record, record_to_device,
    record_to_group,
};
use super::{Record, RecordSaveResult, RecordStore};

/// Outcome of pushing a batch to the record store.
///
/// The durable write has already succeeded when a report exists; the
/// remaining fields only describe the remote side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Records sent.
    pub attempted: usize,
    /// Records the store accepted.
    pub saved: usize,
    /// Record names the store rejected.
    pub failed: Vec<String>,
    /// Batch-level failure, if the request as a whole did not go through.
    pub error: Option<String>,
}

impl SaveReport {
    /// Returns `true` if every record reached the remote store.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.failed.is_empty() && self.saved == self.attempted
    }

    fn from_results(attempted: usize, results: &[RecordSaveResult]) -> Self {
        let failed: Vec<String> = results
            .iter()
            .filter(|r| !r.is_saved())
            .map(|r| r.record_name.clone())
            .collect();
        Self {
            attempted,
            saved: results.iter().filter(|r| r.is_saved()).count(),
            failed,
            error: None,
        }
    }

    fn batch_failed(attempted: usize, error: String) -> Self {
        Self {
            attempted,
            saved: 0,
            failed: Vec::new(),
            error: Some(error),
        }
    }
}

/// Mirrors devices and groups to a [`RecordStore`].
///
/// Reads isolate failures per record and fall back to the durable copy when
/// the query itself fails. Writes always land in the durable store first;
/// the remote push afterwards is best-effort.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    records: Arc<dyn RecordStore>,
    durable: DurableStore,
}

impl RemoteStore {
    /// Creates a remote store over `records`, using `durable` as the
    /// fallback and write-through target.
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>, durable: DurableStore) -> Self {
        Self { records, durable }
    }

    /// Returns the durable store used for fallback reads.
    #[must_use]
    pub fn durable(&self) -> &DurableStore {
        &self.durable
    }

    /// Returns `true` when the account is usable.
    ///
    /// Any error collapses to `false`.
    pub async fn check_availability(&self) -> bool {
        match self.records.account_status().await {
            Ok(status) => {
                tracing::debug!(%status, "Remote account status");
                status.is_available()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not determine remote account status");
                false
            }
        }
    }

    /// Fetches all devices.
    ///
    /// Records that fail to decode are skipped. If the query fails the
    /// durable copy is returned instead.
    ///
    /// # Errors
    ///
    /// Returns an error only if the query fails and the durable fallback
    /// cannot be read either.
    pub async fn fetch_devices(&self) -> Result<Vec<Device>> {
        match self.records.query(DEVICE_RECORD_TYPE).await {
            Ok(records) => Ok(decode_each(&records, record_to_device)),
            Err(e) => {
                tracing::warn!(error = %e, "Device query failed, using durable copy");
                self.durable.load_devices().await
            }
        }
    }

    /// Fetches all groups. Same fallback rules as
    /// [`fetch_devices`](Self::fetch_devices).
    ///
    /// # Errors
    ///
    /// Returns an error only if the query fails and the durable fallback
    /// cannot be read either.
    pub async fn fetch_groups(&self) -> Result<Vec<Group>> {
        match self.records.query(GROUP_RECORD_TYPE).await {
            Ok(records) => Ok(decode_each(&records, record_to_group)),
            Err(e) => {
                tracing::warn!(error = %e, "Group query failed, using durable copy");
                self.durable.load_groups().await
            }
        }
    }

    /// Writes devices durably, then pushes them to the record store.
    ///
    /// # Errors
    ///
    /// Returns an error only if the durable write fails. Remote failures
    /// are reported in the [`SaveReport`].
    pub async fn save_devices(&self, devices: &[Device]) -> Result<SaveReport> {
        self.durable.save_devices(devices).await?;
        Ok(self.push_devices(devices).await)
    }

    /// Writes groups durably, then pushes them to the record store.
    ///
    /// # Errors
    ///
    /// Returns an error only if the durable write fails.
    pub async fn save_groups(&self, groups: &[Group]) -> Result<SaveReport> {
        self.durable.save_groups(groups).await?;
        Ok(self.push_groups(groups).await)
    }

    /// Pushes devices to the record store without touching the durable
    /// copy. Callers that already wrote durably use this.
    pub async fn push_devices(&self, devices: &[Device]) -> SaveReport {
        let records = devices.iter().map(device_to_record).collect();
        self.push(records, "devices").await
    }

    /// Pushes groups to the record store without touching the durable copy.
    pub async fn push_groups(&self, groups: &[Group]) -> SaveReport {
        let records = groups.iter().map(group_to_record).collect();
        self.push(records, "groups").await
    }

    async fn push(&self, records: Vec<Record>, what: &str) -> SaveReport {
        let attempted = records.len();
        if attempted == 0 {
            return SaveReport::default();
        }

        let report = match self.records.save_records(records).await {
            Ok(results) => SaveReport::from_results(attempted, &results),
            Err(e) => SaveReport::batch_failed(attempted, e.to_string()),
        };

        if let Some(error) = &report.error {
            tracing::warn!(what, attempted, error = %error, "Remote save failed");
        } else if !report.failed.is_empty() {
            tracing::warn!(
                what,
                attempted,
                failed = ?report.failed,
                "Some records were rejected by the remote store"
            );
        } else {
            tracing::debug!(what, saved = report.saved, "Remote save complete");
        }
        report
    }
}

fn decode_each<T>(records: &[Record], decode: impl Fn(&Record) -> Result<T>) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match decode(record) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(record = %record.record_name, error = %e, "Skipping undecodable record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::OfflineRecordStore;

    #[tokio::test]
    async fn offline_store_is_unavailable_and_falls_back() {
        let durable = DurableStore::local();
        durable
            .save_devices(&[Device::new("d1", "Desk", "H6008")])
            .await
            .unwrap();
        let remote = RemoteStore::new(Arc::new(OfflineRecordStore), durable);

        assert!(!remote.check_availability().await);
        let devices = remote.fetch_devices().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "d1");
    }

    #[tokio::test]
    async fn save_writes_durable_even_when_remote_fails() {
        let durable = DurableStore::local();
        let remote = RemoteStore::new(Arc::new(OfflineRecordStore), durable.clone());

        let report = remote
            .save_devices(&[Device::new("d1", "Desk", "H6008")])
            .await
            .unwrap();

        assert_eq!(report.attempted, 1);
        assert!(report.error.is_some());
        assert!(!report.is_complete());
        assert_eq!(durable.load_devices().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn push_leaves_durable_copy_alone() {
        let durable = DurableStore::local();
        let remote = RemoteStore::new(Arc::new(OfflineRecordStore), durable.clone());

        let report = remote.push_devices(&[Device::new("d1", "Desk", "H6008")]).await;

        assert!(report.error.is_some());
        assert!(durable.load_devices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_save_skips_the_remote() {
        let remote = RemoteStore::new(Arc::new(OfflineRecordStore), DurableStore::local());
        let report = remote.save_groups(&[]).await.unwrap();
        assert!(report.is_complete());
    }

    #[test]
    fn report_counts_partial_failures() {
        let results = [
            RecordSaveResult::saved("device-a"),
            RecordSaveResult::failed("device-b", "conflict"),
        ];
        let report = SaveReport::from_results(2, &results);
        assert_eq!(report.saved, 1);
        assert_eq!(report.failed, vec!["device-b".to_string()]);
        assert!(!report.is_complete());
    }
}
