// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Home Assistant MQTT discovery for the mode and level selectors.
//!
//! On startup the relay publishes one retained `select` config per
//! selector. Home Assistant then shows the unit with a mode dropdown and a
//! level dropdown wired to the command and state topics.
//!
//! # Examples
//!
//! ```
//! use ambientika_relay::discovery::{DiscoveryConfig, announcements};
//! use ambientika_relay::protocol::Topics;
//!
//! let config = DiscoveryConfig::new("Ambientika", "ABC123");
//! let messages = announcements(&config, &Topics::new("ambientika", "ir/send")).unwrap();
//!
//! assert_eq!(messages.len(), 2);
//! assert_eq!(
//!     messages[0].topic,
//!     "homeassistant/select/ambientika/mode_ambientika_abc123/config"
//! );
//! assert!(messages[0].retain);
//! ```

use serde::Serialize;

use crate::protocol::{OutboundMessage, Publisher, Topics};
use crate::types::{Level, Mode};

/// Default discovery topic prefix used by Home Assistant.
pub const DEFAULT_PREFIX: &str = "homeassistant";

/// Identity of the unit in the discovery namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    name: String,
    unique_id: String,
    prefix: String,
}

impl DiscoveryConfig {
    /// Creates a config with the default prefix.
    ///
    /// Name and unique id are lowercased.
    #[must_use]
    pub fn new(name: &str, unique_id: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            unique_id: unique_id.to_lowercase(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Sets the discovery topic prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns the lowercased device name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lowercased unique id.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }
}

/// A Home Assistant `select` entity config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectConfig {
    name: String,
    unique_id: String,
    state_topic: String,
    command_topic: String,
    optimistic: bool,
    retain: bool,
    options: Vec<String>,
    device: DeviceInfo,
}

/// The device block shared by all entities of the unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    name: String,
    identifiers: Vec<String>,
}

/// The selectors the relay exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Mode,
    Level,
}

impl Field {
    const ALL: [Self; 2] = [Self::Mode, Self::Level];

    fn as_str(self) -> &'static str {
        match self {
            Self::Mode => "mode",
            Self::Level => "level",
        }
    }

    fn options(self) -> Vec<String> {
        match self {
            Self::Mode => Mode::ALL.iter().map(ToString::to_string).collect(),
            Self::Level => Level::ALL.iter().map(ToString::to_string).collect(),
        }
    }

    fn state_topic(self, topics: &Topics) -> String {
        match self {
            Self::Mode => topics.mode_state(),
            Self::Level => topics.level_state(),
        }
    }
}

fn select_config(config: &DiscoveryConfig, topics: &Topics, field: Field) -> SelectConfig {
    let name = &config.name;
    let unique_id = &config.unique_id;
    let field_name = field.as_str();

    SelectConfig {
        name: format!("{field_name} ({name})"),
        unique_id: format!("{name}_{field_name}_{unique_id}"),
        state_topic: field.state_topic(topics),
        command_topic: topics.command(field_name),
        optimistic: false,
        retain: true,
        options: field.options(),
        device: DeviceInfo {
            name: name.clone(),
            identifiers: vec![unique_id.clone()],
        },
    }
}

/// Builds the retained discovery messages for both selectors.
///
/// # Errors
///
/// Returns error if a config cannot be serialized.
pub fn announcements(
    config: &DiscoveryConfig,
    topics: &Topics,
) -> Result<Vec<OutboundMessage>, serde_json::Error> {
    Field::ALL
        .into_iter()
        .map(|field| {
            let doc = serde_json::to_string(&select_config(config, topics, field))?;
            let topic = format!(
                "{}/select/ambientika/{}_{}_{}/config",
                config.prefix,
                field.as_str(),
                config.name,
                config.unique_id
            );
            Ok(OutboundMessage::new(topic, doc, true))
        })
        .collect()
}

/// Publishes the discovery messages and flushes them.
///
/// # Errors
///
/// Returns error if a config cannot be serialized or publishing fails.
pub async fn announce<P: Publisher>(
    publisher: &P,
    config: &DiscoveryConfig,
    topics: &Topics,
) -> crate::Result<()> {
    let messages = announcements(config, topics)?;

    for message in messages {
        tracing::debug!(topic = %message.topic, "Publishing discovery config");
        publisher.publish(message).await?;
    }
    publisher.flush().await?;

    tracing::info!(
        name = %config.name,
        unique_id = %config.unique_id,
        "Published discovery configs"
    );
    Ok(())
}
