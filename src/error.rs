// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the relay.
//!
//! The hierarchy mirrors how failures are handled at runtime:
//!
//! - [`RequestError`]: an inbound request was malformed or not applicable to
//!   the current device state. These are logged and dropped by the dispatcher.
//! - [`ProtocolError`]: the MQTT transport failed. These propagate out of the
//!   dispatcher and end the daemon.
//! - [`ConfigError`]: the configuration file could not be loaded.

use thiserror::Error;

use crate::types::Mode;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An inbound request was rejected.
    #[error("request rejected: {0}")]
    Request(#[from] RequestError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A discovery document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if the error only concerns a single request and the
    /// daemon can keep processing further requests.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: i64,
        /// Maximum allowed value.
        max: i64,
        /// The actual value that was provided.
        actual: i64,
    },

    /// An unknown mode name was provided.
    #[error("unknown mode: {0}")]
    UnknownMode(String),
}

/// Reasons an inbound request is dropped without any emission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The level payload is not a decimal integer.
    #[error("level payload {0:?} is not an integer")]
    MalformedLevel(String),

    /// The requested mode is not in the code table.
    #[error("unknown mode {0:?}")]
    UnknownMode(String),

    /// The requested level is outside the level table.
    #[error("level out of range: {0}")]
    LevelOutOfRange(ValueError),

    /// A level was requested before any mode was set.
    #[error("no current mode, level {0} cannot be applied")]
    NoCurrentMode(i64),

    /// The current mode does not accept any level.
    #[error("mode {mode} does not accept a level")]
    LevelNotAccepted {
        /// The mode that is currently active.
        mode: Mode,
    },
}

/// Errors related to MQTT communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT client request failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A publish or flush timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected layout.
    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A setting has an invalid value.
    #[error("invalid setting {field}: {message}")]
    Invalid {
        /// The offending setting.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            min: 1,
            max: 3,
            actual: 5,
        };
        assert_eq!(err.to_string(), "value 5 is out of range [1, 3]");
    }

    #[test]
    fn request_error_display() {
        let err = RequestError::LevelNotAccepted { mode: Mode::Night };
        assert_eq!(err.to_string(), "mode Night does not accept a level");

        let err = RequestError::MalformedLevel("high".to_string());
        assert_eq!(err.to_string(), "level payload \"high\" is not an integer");
    }

    #[test]
    fn request_errors_are_recoverable() {
        let err: Error = RequestError::UnknownMode("Turbo".to_string()).into();
        assert!(err.is_recoverable());

        let err: Error = ProtocolError::ChannelClosed("inbound".to_string()).into();
        assert!(!err.is_recoverable());

        let err: Error = ConfigError::Invalid {
            field: "mqtt.host",
            message: "must not be empty".to_string(),
        }
        .into();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid {
            field: "mqtt.topic",
            message: "must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid setting mqtt.topic: must not be empty"
        );
    }
}
