// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record store abstraction.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::Record;

/// Account status reported by the remote record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountStatus {
    /// The account can read and write records.
    Available,
    /// No account is signed in.
    NoAccount,
    /// Access is restricted by policy.
    Restricted,
    /// The status could not be determined.
    CouldNotDetermine,
    /// The service is temporarily unavailable.
    TemporarilyUnavailable,
}

impl AccountStatus {
    /// Collapses the status to usable or not.
    #[must_use]
    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Available => "available",
            Self::NoAccount => "no account",
            Self::Restricted => "restricted",
            Self::CouldNotDetermine => "could not determine",
            Self::TemporarilyUnavailable => "temporarily unavailable",
        };
        f.write_str(text)
    }
}

/// Per-record outcome of a batch save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSaveResult {
    /// The record that was saved.
    pub record_name: String,
    /// Failure reason, `None` on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordSaveResult {
    /// A successful save.
    #[must_use]
    pub fn saved(record_name: impl Into<String>) -> Self {
        Self {
            record_name: record_name.into(),
            error: None,
        }
    }

    /// A failed save.
    #[must_use]
    pub fn failed(record_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            record_name: record_name.into(),
            error: Some(reason.into()),
        }
    }

    /// Returns `true` if the record was saved.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.error.is_none()
    }
}

/// A network-backed store of typed records.
///
/// Implementations only move records; they do not fall back or retry. The
/// best-effort policy lives in [`RemoteStore`](super::RemoteStore).
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug {
    /// Checks whether the account can be used.
    async fn account_status(&self) -> Result<AccountStatus>;

    /// Returns every record of `record_type`.
    async fn query(&self, record_type: &str) -> Result<Vec<Record>>;

    /// Inserts or replaces `records`, reporting each record's outcome.
    async fn save_records(&self, records: Vec<Record>) -> Result<Vec<RecordSaveResult>>;
}

/// Record store used when no remote is configured.
///
/// Always reports [`AccountStatus::NoAccount`].
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRecordStore;

#[async_trait]
impl RecordStore for OfflineRecordStore {
    async fn account_status(&self) -> Result<AccountStatus> {
        Ok(AccountStatus::NoAccount)
    }

    async fn query(&self, _record_type: &str) -> Result<Vec<Record>> {
        Err(crate::Error::RemoteUnavailable)
    }

    async fn save_records(&self, _records: Vec<Record>) -> Result<Vec<RecordSaveResult>> {
        Err(crate::Error::RemoteUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_available_is_available() {
        assert!(AccountStatus::Available.is_available());
        for status in [
            AccountStatus::NoAccount,
            AccountStatus::Restricted,
            AccountStatus::CouldNotDetermine,
            AccountStatus::TemporarilyUnavailable,
        ] {
            assert!(!status.is_available(), "{status} should be unavailable");
        }
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&AccountStatus::TemporarilyUnavailable).unwrap(),
            r#""temporarilyUnavailable""#
        );
    }

    #[tokio::test]
    async fn offline_store_has_no_account() {
        let store = OfflineRecordStore;
        assert_eq!(store.account_status().await.unwrap(), AccountStatus::NoAccount);
        assert!(store.query("GoveeDevice").await.is_err());
    }
}
