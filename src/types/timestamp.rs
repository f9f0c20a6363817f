// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical timestamp encoding.
//!
//! The durable store is read by a separate host process that decodes dates
//! with a plain ISO-8601 strategy, which rejects fractional seconds. All
//! timestamps are therefore written as `YYYY-MM-DDTHH:MM:SSZ` and every
//! timestamp this library creates is truncated to whole seconds, so a value
//! survives an encode/decode round trip unchanged.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Returns the current time truncated to whole seconds.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Formats a timestamp in the canonical encoding.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use govee_sync::types::timestamp;
///
/// let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
/// assert_eq!(timestamp::format(&t), "2024-05-01T12:30:00Z");
/// ```
#[must_use]
pub fn format(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses an ISO-8601 / RFC 3339 timestamp with any offset into UTC.
///
/// # Errors
///
/// Returns the chrono parse error if the string is not a valid timestamp.
pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|t| t.with_timezone(&Utc))
}

/// Serde adapter for `DateTime<Utc>` fields.
pub mod iso8601 {
    use super::{DateTime, Deserialize, Deserializer, Serializer, Utc};

    /// Serializes a timestamp in the canonical encoding.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format(value))
    }

    /// Deserializes an ISO-8601 timestamp.
    ///
    /// # Errors
    ///
    /// Fails if the value is not a string holding a valid timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Serde adapter for `Option<DateTime<Utc>>` fields.
    pub mod option {
        use super::{DateTime, Deserialize, Deserializer, Serializer, Utc};

        /// Serializes an optional timestamp; `None` becomes `null`.
        ///
        /// # Errors
        ///
        /// Propagates serializer errors.
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(t) => s.serialize_str(&super::super::format(t)),
                None => s.serialize_none(),
            }
        }

        /// Deserializes an optional timestamp.
        ///
        /// # Errors
        ///
        /// Fails if a present value is not a valid timestamp.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| super::super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
