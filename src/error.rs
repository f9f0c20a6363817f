// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `govee_sync` library.
//!
//! Validation failures (`InvalidInput`, `DeviceNotFound`, `GroupNotFound`)
//! are raised by the control facade before any mutation happens. Durable
//! storage failures surface as `Encoding`, `Decoding` or `Storage`. Remote
//! transport failures (`RemoteUnavailable`, `Network`, `Unauthorized`) are
//! produced by the record-store adapters but never cross the
//! [`SyncCoordinator`](crate::sync::SyncCoordinator) boundary.

use thiserror::Error;

use crate::sync::Transport;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The shared cross-process storage namespace could not be used.
    #[error("shared storage is unavailable")]
    SharedStorageUnavailable,

    /// The remote record store account is not usable.
    #[error("remote record store is unavailable")]
    RemoteUnavailable,

    /// A request to the remote record store failed.
    #[error("network error: {0}")]
    Network(String),

    /// A value could not be serialized for storage.
    #[error("failed to encode {what}: {source}")]
    Encoding {
        /// What was being encoded.
        what: String,
        /// The underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// Stored or fetched bytes could not be turned back into a value.
    #[error("failed to decode {what}: {message}")]
    Decoding {
        /// What was being decoded.
        what: String,
        /// Description of the decoding failure.
        message: String,
    },

    /// No device with this identifier exists.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// No group with this identifier exists.
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// An input value was rejected before any mutation happened.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The remote record store rejected our credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// The transport has no working implementation.
    #[error("{0} transport is not implemented")]
    TransportNotImplemented(Transport),

    /// I/O failure in a durable backend.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl Error {
    /// Creates a decoding error from any displayable cause.
    pub(crate) fn decoding(what: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Decoding {
            what: what.into(),
            message: cause.to_string(),
        }
    }

    /// Creates an encoding error for a serializer failure.
    pub(crate) fn encoding(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Encoding {
            what: what.into(),
            source,
        }
    }

    /// Returns `true` for errors raised by input validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::DeviceNotFound(_) | Self::GroupNotFound(_)
        )
    }
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values. They convert into [`Error::InvalidInput`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A brightness value is outside the valid range (0-100).
    #[error("brightness {0} is out of range [0, 100]")]
    InvalidBrightness(i64),

    /// A color channel is outside the valid range (0-255).
    #[error("{channel} channel {value} is out of range [0, 255]")]
    InvalidChannel {
        /// The channel name.
        channel: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// A color temperature is outside the valid range (2000-9000 K).
    #[error("color temperature {0}K is out of range [2000, 9000]")]
    InvalidKelvin(i64),

    /// An unknown capability tag was provided.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// A required name was empty.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),
}

impl From<ValueError> for Error {
    fn from(err: ValueError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::InvalidBrightness(150);
        assert_eq!(err.to_string(), "brightness 150 is out of range [0, 100]");

        let err = ValueError::InvalidChannel {
            channel: "green",
            value: 300,
        };
        assert_eq!(err.to_string(), "green channel 300 is out of range [0, 255]");
    }

    #[test]
    fn value_error_becomes_invalid_input() {
        let err: Error = ValueError::InvalidKelvin(1000).into();
        assert!(
            matches!(err, Error::InvalidInput(ref msg) if msg.contains("1000K")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn not_found_display_names_the_id() {
        assert_eq!(
            Error::DeviceNotFound("dev1".to_string()).to_string(),
            "device not found: dev1"
        );
        assert_eq!(
            Error::GroupNotFound("g1".to_string()).to_string(),
            "group not found: g1"
        );
    }

    #[test]
    fn transport_not_implemented_display() {
        let err = Error::TransportNotImplemented(Transport::Bluetooth);
        assert_eq!(err.to_string(), "bluetooth transport is not implemented");
    }

    #[test]
    fn validation_classification() {
        assert!(Error::InvalidInput("x".into()).is_validation());
        assert!(Error::DeviceNotFound("x".into()).is_validation());
        assert!(!Error::Unauthorized.is_validation());
        assert!(!Error::RemoteUnavailable.is_validation());
    }
}
