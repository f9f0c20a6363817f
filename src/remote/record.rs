// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat records exchanged with the remote record store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::timestamp;

/// A typed scalar field value.
///
/// The record store only knows flat scalar fields: booleans travel as 0/1
/// integers and lists as comma-joined strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    /// 64-bit integer.
    #[serde(rename = "INT64")]
    Int64(i64),
    /// UTF-8 string.
    #[serde(rename = "STRING")]
    String(String),
    /// Point in time.
    #[serde(rename = "TIMESTAMP")]
    Timestamp(#[serde(with = "timestamp::iso8601")] DateTime<Utc>),
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Int64(i64::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// A record of a given type, addressed by a stable record name.
///
/// # Examples
///
/// ```
/// use govee_sync::remote::Record;
///
/// let record = Record::new("GoveeDevice", "device-d1")
///     .with_field("name", "Lamp")
///     .with_field("powerState", true);
///
/// assert_eq!(record.string("name").unwrap(), "Lamp");
/// assert!(record.boolean("powerState").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Record type, e.g. `GoveeDevice`.
    pub record_type: String,
    /// Stable record identifier, e.g. `device-<id>`.
    pub record_name: String,
    /// Field values keyed by field name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates a record without fields.
    #[must_use]
    pub fn new(record_type: impl Into<String>, record_name: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            record_name: record_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Reads a required string field.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decoding` if the field is missing or not a string.
    pub fn string(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            FieldValue::String(s) => Ok(s),
            other => Err(self.wrong_type(name, "string", other)),
        }
    }

    /// Reads an optional string field.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decoding` if the field is present but not a string.
    pub fn optional_string(&self, name: &str) -> Result<Option<&str>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(FieldValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.wrong_type(name, "string", other)),
        }
    }

    /// Reads a required integer field.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decoding` if the field is missing or not an integer.
    pub fn int(&self, name: &str) -> Result<i64> {
        self.optional_int(name)?
            .ok_or_else(|| self.missing(name))
    }

    /// Reads an optional integer field.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decoding` if the field is present but not an integer.
    pub fn optional_int(&self, name: &str) -> Result<Option<i64>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(FieldValue::Int64(v)) => Ok(Some(*v)),
            Some(other) => Err(self.wrong_type(name, "integer", other)),
        }
    }

    /// Reads a required 0/1 boolean field.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decoding` if the field is missing, not an integer, or
    /// neither 0 nor 1.
    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.int(name)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::decoding(
                self.describe_field(name),
                format!("expected 0 or 1, got {other}"),
            )),
        }
    }

    /// Reads a required timestamp field.
    ///
    /// # Errors
    ///
    /// Returns `Error::Decoding` if the field is missing or not a timestamp.
    pub fn timestamp(&self, name: &str) -> Result<DateTime<Utc>> {
        match self.require(name)? {
            FieldValue::Timestamp(t) => Ok(*t),
            other => Err(self.wrong_type(name, "timestamp", other)),
        }
    }

    fn require(&self, name: &str) -> Result<&FieldValue> {
        self.fields.get(name).ok_or_else(|| self.missing(name))
    }

    fn missing(&self, name: &str) -> Error {
        Error::decoding(self.describe_field(name), "field is missing")
    }

    fn wrong_type(&self, name: &str, expected: &str, actual: &FieldValue) -> Error {
        Error::decoding(
            self.describe_field(name),
            format!("expected {expected}, got {actual:?}"),
        )
    }

    fn describe_field(&self, name: &str) -> String {
        format!("{} field `{name}`", self.record_name)
    }
}
