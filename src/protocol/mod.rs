// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound transport seam and the MQTT transport adapter.
//!
//! The sequencer only talks to a [`Publisher`]. [`MqttBroker`] implements it
//! on top of `rumqttc` and also feeds inbound messages into the dispatcher
//! queue.
//!
//! # Topics
//!
//! | Topic | Direction | Payload |
//! |-------|-----------|---------|
//! | `{base}/mode/set` | in | mode name |
//! | `{base}/level/set` | in | decimal level |
//! | `{base}/mode` | out, retained | last accepted mode |
//! | `{base}/level` | out, retained | last accepted level |
//! | `{ir_topic}` | out | `0x9669 0xD52A 2` |

#[cfg(feature = "mqtt")]
mod mqtt_broker;
#[cfg(test)]
pub(crate) mod recorder;

#[cfg(feature = "mqtt")]
pub use mqtt_broker::{MqttBroker, MqttBrokerBuilder, MqttBrokerConfig, random_client_id};

use crate::command::IrCommand;
use crate::error::ProtocolError;
use crate::state::StateChange;

/// A message handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Destination topic.
    pub topic: String,
    /// UTF-8 payload.
    pub payload: String,
    /// Whether the broker keeps the message as last known value.
    pub retain: bool,
}

impl OutboundMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>, retain: bool) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            retain,
        }
    }

    /// Creates the IR sender message for `command`.
    #[must_use]
    pub fn ir(topics: &Topics, command: &IrCommand) -> Self {
        Self::new(topics.ir(), command.payload(), false)
    }

    /// Creates the retained state message for `change`.
    #[must_use]
    pub fn state(topics: &Topics, change: &StateChange) -> Self {
        Self::new(topics.state_topic(change), change.state_value(), true)
    }
}

/// Outbound side of the transport.
///
/// `flush` must not return before every message passed to `publish` so far
/// has been handed to the network, so IR bursts and state updates leave in
/// the order they were produced.
#[allow(async_fn_in_trait)]
pub trait Publisher {
    /// Queues a message for sending.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport refused the message.
    async fn publish(&self, message: OutboundMessage) -> Result<(), ProtocolError>;

    /// Waits until all queued messages have been sent.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport stopped or timed out.
    async fn flush(&self) -> Result<(), ProtocolError>;
}

impl<P: Publisher> Publisher for &P {
    async fn publish(&self, message: OutboundMessage) -> Result<(), ProtocolError> {
        (**self).publish(message).await
    }

    async fn flush(&self) -> Result<(), ProtocolError> {
        (**self).flush().await
    }
}

/// Topic layout of one ventilation unit.
///
/// # Examples
///
/// ```
/// use ambientika_relay::protocol::Topics;
///
/// let topics = Topics::new("home/ambientika", "ir/send");
/// assert_eq!(topics.mode_state(), "home/ambientika/mode");
/// assert_eq!(topics.command("level"), "home/ambientika/level/set");
/// assert_eq!(topics.subscription(), "home/ambientika/#");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    base: String,
    ir: String,
}

impl Topics {
    /// Creates the layout for a base topic and an IR sender topic.
    #[must_use]
    pub fn new(base: impl Into<String>, ir: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            ir: ir.into(),
        }
    }

    /// Returns the base topic.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the IR sender topic.
    #[must_use]
    pub fn ir(&self) -> &str {
        &self.ir
    }

    /// Returns the retained mode topic.
    #[must_use]
    pub fn mode_state(&self) -> String {
        format!("{}/mode", self.base)
    }

    /// Returns the retained level topic.
    #[must_use]
    pub fn level_state(&self) -> String {
        format!("{}/level", self.base)
    }

    /// Returns the command topic for a target (`mode` or `level`).
    #[must_use]
    pub fn command(&self, target: &str) -> String {
        format!("{}/{target}/set", self.base)
    }

    /// Returns the wildcard subscription covering all command topics.
    #[must_use]
    pub fn subscription(&self) -> String {
        format!("{}/#", self.base)
    }

    /// Returns the retained topic that records `change`.
    #[must_use]
    pub fn state_topic(&self, change: &StateChange) -> String {
        match change {
            StateChange::Mode(_) => self.mode_state(),
            StateChange::VentilationLevel(_) | StateChange::HumidityLevel(_) => self.level_state(),
        }
    }
}
