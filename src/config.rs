// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Daemon configuration file.
//!
//! The file is TOML and read once at startup. Every section except
//! `[general]` and `[mqtt]` may be omitted.
//!
//! ```toml
//! [general]
//! name = "Ambientika"
//! unique_id = "abc123"
//!
//! [mqtt]
//! host = "localhost"
//! port = 1883
//! username = "user"
//! password = "secret"
//! topic = "ambientika"
//! ir_topic = "ir/send"
//! keep_alive_secs = 30
//!
//! [relay]
//! settle_interval_ms = 1000
//! publish_timeout_ms = 5000
//! ir_repeat = 2
//!
//! [discovery]
//! enabled = true
//! prefix = "homeassistant"
//! ```
//!
//! # Examples
//!
//! ```
//! use ambientika_relay::config::Config;
//!
//! let config = Config::from_toml_str(r#"
//!     [general]
//!     name = "Ambientika"
//!     unique_id = "abc123"
//!
//!     [mqtt]
//!     host = "localhost"
//!     topic = "ambientika"
//!     ir_topic = "ir/send"
//! "#).unwrap();
//!
//! assert_eq!(config.mqtt.port, 1883);
//! assert_eq!(config.topics().command("mode"), "ambientika/mode/set");
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::command::IrCommand;
use crate::discovery::{self, DiscoveryConfig};
use crate::error::ConfigError;
use crate::protocol::Topics;
use crate::sequencer::SequencerConfig;

/// Default location of the configuration file.
pub const DEFAULT_PATH: &str = "/etc/ambientika-relay/ambientika-relay.toml";

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Identity of the unit.
    pub general: GeneralConfig,
    /// Broker connection and topics.
    pub mqtt: MqttConfig,
    /// Sequencing and IR encoding.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Home Assistant discovery.
    #[serde(default)]
    pub discovery: DiscoverySection,
}

/// `[general]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Human readable unit name, also the client id prefix.
    pub name: String,
    /// Identifier used in discovery.
    pub unique_id: String,
}

/// `[mqtt]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MqttConfig {
    /// Broker host.
    pub host: String,
    /// Broker port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username, set together with `password`.
    #[serde(default)]
    pub username: Option<String>,
    /// Password, set together with `username`.
    #[serde(default)]
    pub password: Option<String>,
    /// Base topic of the unit.
    pub topic: String,
    /// Topic of the IR sender.
    pub ir_topic: String,
    /// Keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

/// `[relay]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    /// Delay between two IR emissions, in milliseconds.
    pub settle_interval_ms: u64,
    /// Upper bound for a publish or flush, in milliseconds.
    pub publish_timeout_ms: Option<u64>,
    /// Repeat count sent with every IR code.
    pub ir_repeat: u8,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            settle_interval_ms: 1000,
            publish_timeout_ms: None,
            ir_repeat: IrCommand::DEFAULT_REPEAT,
        }
    }
}

/// `[discovery]`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverySection {
    /// Whether to publish discovery configs on startup.
    pub enabled: bool,
    /// Discovery topic prefix.
    pub prefix: String,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: discovery::DEFAULT_PREFIX.to_string(),
        }
    }
}

fn default_port() -> u16 {
    1883
}

fn default_keep_alive_secs() -> u64 {
    30
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed or
    /// validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text cannot be parsed or validated.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        non_empty("general.name", &self.general.name)?;
        non_empty("general.unique_id", &self.general.unique_id)?;
        non_empty("mqtt.host", &self.mqtt.host)?;
        non_empty("mqtt.topic", &self.mqtt.topic)?;
        non_empty("mqtt.ir_topic", &self.mqtt.ir_topic)?;

        if self.mqtt.username.is_some() != self.mqtt.password.is_some() {
            return Err(ConfigError::Invalid {
                field: "mqtt.username",
                message: "username and password must be set together".to_string(),
            });
        }
        if self.relay.ir_repeat == 0 {
            return Err(ConfigError::Invalid {
                field: "relay.ir_repeat",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the topic layout.
    #[must_use]
    pub fn topics(&self) -> Topics {
        Topics::new(self.mqtt.topic.as_str(), self.mqtt.ir_topic.as_str())
    }

    /// Returns the sequencer settings.
    #[must_use]
    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            settle_interval: Duration::from_millis(self.relay.settle_interval_ms),
            ir_repeat: self.relay.ir_repeat,
        }
    }

    /// Returns the discovery identity, or `None` if discovery is disabled.
    #[must_use]
    pub fn discovery_config(&self) -> Option<DiscoveryConfig> {
        self.discovery.enabled.then(|| {
            DiscoveryConfig::new(&self.general.name, &self.general.unique_id)
                .with_prefix(self.discovery.prefix.as_str())
        })
    }

    /// Returns the broker credentials, if configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.mqtt
            .username
            .as_deref()
            .zip(self.mqtt.password.as_deref())
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.mqtt.keep_alive_secs)
    }

    /// Returns the publish timeout, if configured.
    #[must_use]
    pub fn publish_timeout(&self) -> Option<Duration> {
        self.relay.publish_timeout_ms.map(Duration::from_millis)
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}
