// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP record store.
//!
//! Speaks a small JSON API rooted at `<base_url>/<container>`:
//!
//! | Request | Body | Response |
//! |---|---|---|
//! | `GET /account` | | `{"status": "available"}` |
//! | `POST /records/query` | `{"recordType": "..."}` | `{"records": [...]}` |
//! | `POST /records/modify` | `{"operations": [...]}` | `{"records": [...]}` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::DEFAULT_REMOTE_CONTAINER_ID;

use super::{AccountStatus, Record, RecordSaveResult, RecordStore};

// ============================================================================
// RemoteConfig
// ============================================================================

/// Configuration for the HTTP record store.
///
/// # Examples
///
/// ```
/// use govee_sync::remote::RemoteConfig;
/// use std::time::Duration;
///
/// let config = RemoteConfig::new("https://records.example.com")
///     .with_container_id("iCloud.com.example.lights")
///     .with_api_token("secret")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(
///     config.container_url(),
///     "https://records.example.com/iCloud.com.example.lights"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    base_url: String,
    container_id: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl RemoteConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            container_id: DEFAULT_REMOTE_CONTAINER_ID.to_string(),
            api_token: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the container identifier.
    #[must_use]
    pub fn with_container_id(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = container_id.into();
        self
    }

    /// Sets the bearer token sent with every request.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the container identifier.
    #[must_use]
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the URL all requests are rooted at.
    #[must_use]
    pub fn container_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url,
            urlencoding::encode(&self.container_id)
        )
    }

    /// Creates an `HttpRecordStore` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Network` if the HTTP client cannot be created.
    pub fn into_store(self) -> Result<HttpRecordStore> {
        HttpRecordStore::new(self)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct AccountResponse {
    status: AccountStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    record_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse<T> {
    #[serde(default = "Vec::new")]
    records: Vec<T>,
}

#[derive(Debug, Serialize)]
struct ModifyRequest {
    operations: Vec<ModifyOperation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyOperation {
    operation_type: &'static str,
    record: Record,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModifyResult {
    record_name: String,
    #[serde(default)]
    server_error_code: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

// ============================================================================
// HttpRecordStore
// ============================================================================

/// Record store backed by an HTTP JSON service.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    container_url: String,
    client: Client,
    api_token: Option<String>,
}

impl HttpRecordStore {
    /// Creates a store from `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Network` if the HTTP client cannot be created.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(network)?;

        Ok(Self {
            container_url: config.container_url(),
            client,
            api_token: config.api_token,
        })
    }

    /// Returns the container URL.
    #[must_use]
    pub fn container_url(&self) -> &str {
        &self.container_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{path}", self.container_url);
        tracing::debug!(%method, url = %url, "Sending record store request");

        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = builder.send().await.map_err(network)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Unauthorized);
        }
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(Error::RemoteUnavailable);
        }
        if !status.is_success() {
            return Err(Error::Network(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response.json().await.map_err(network)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn account_status(&self) -> Result<AccountStatus> {
        let response: AccountResponse = self
            .send(self.request(reqwest::Method::GET, "account"))
            .await?;
        Ok(response.status)
    }

    async fn query(&self, record_type: &str) -> Result<Vec<Record>> {
        let builder = self
            .request(reqwest::Method::POST, "records/query")
            .json(&QueryRequest { record_type });
        let response: RecordsResponse<serde_json::Value> = self.send(builder).await?;

        // Decode per record so one malformed entry does not sink the batch
        let mut records = Vec::with_capacity(response.records.len());
        for raw in response.records {
            match serde_json::from_value::<Record>(raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(record_type, error = %e, "Skipping malformed record");
                }
            }
        }
        Ok(records)
    }

    async fn save_records(&self, records: Vec<Record>) -> Result<Vec<RecordSaveResult>> {
        let operations = records
            .into_iter()
            .map(|record| ModifyOperation {
                operation_type: "forceReplace",
                record,
            })
            .collect();
        let builder = self
            .request(reqwest::Method::POST, "records/modify")
            .json(&ModifyRequest { operations });
        let response: RecordsResponse<ModifyResult> = self.send(builder).await?;

        Ok(response
            .records
            .into_iter()
            .map(|r| match r.server_error_code {
                Some(code) => {
                    let reason = r.reason.map_or(code.clone(), |reason| format!("{code}: {reason}"));
                    RecordSaveResult::failed(r.record_name, reason)
                }
                None => RecordSaveResult::saved(r.record_name),
            })
            .collect())
    }
}

fn network(e: reqwest::Error) -> Error {
    Error::Network(e.to_string())
}
