// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sequential processing of inbound MQTT requests.
//!
//! The transport enqueues every received message as an [`InboundRequest`].
//! The [`Dispatcher`] drains that queue one request at a time: a request is
//! parsed, validated and fully executed (settle delays included) before the
//! next one is taken. This is what keeps IR bursts from interleaving.
//!
//! ```text
//! MQTT message: ambientika/level/set → "2"
//!                     ↓
//!      InboundRequest queued (transport task)
//!                     ↓
//!      Dispatcher::handle() (dispatcher task)
//!                     ↓
//!      Target::Level → validate_level_request()
//!                     ↓
//!      Sequencer::execute(Plan { mode, level })
//! ```

use tokio::sync::mpsc;

use crate::command::{Plan, validate_level_request, validate_mode_request};
use crate::error::{ProtocolError, RequestError, Result};
use crate::protocol::Publisher;
use crate::sequencer::Sequencer;

/// A message received from the broker, not yet interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    /// Full topic the message arrived on.
    pub topic: String,
    /// UTF-8 payload.
    pub payload: String,
}

impl InboundRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Interprets the topic.
    ///
    /// A command topic ends in `set`, and the segment before it names the
    /// target. Anything else (including the relay's own retained state
    /// topics) yields `None`.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        let mut segments = self.topic.rsplit('/');
        if segments.next()? != "set" {
            return None;
        }
        match segments.next()? {
            "mode" => Some(Target::Mode),
            "level" => Some(Target::Level),
            _ => None,
        }
    }
}

/// What a command topic addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// `{base}/mode/set`
    Mode,
    /// `{base}/level/set`
    Level,
}

/// Parses the payload of a level command.
///
/// # Errors
///
/// Returns [`RequestError::MalformedLevel`] if the payload is not a decimal
/// integer.
pub fn parse_level(payload: &str) -> std::result::Result<i64, RequestError> {
    payload
        .trim()
        .parse()
        .map_err(|_| RequestError::MalformedLevel(payload.to_string()))
}

/// Single consumer of the inbound queue.
#[derive(Debug)]
pub struct Dispatcher<P> {
    sequencer: Sequencer<P>,
}

impl<P: Publisher> Dispatcher<P> {
    /// Creates a dispatcher around a sequencer.
    #[must_use]
    pub fn new(sequencer: Sequencer<P>) -> Self {
        Self { sequencer }
    }

    /// Returns the sequencer.
    #[must_use]
    pub fn sequencer(&self) -> &Sequencer<P> {
        &self.sequencer
    }

    /// Processes requests in arrival order until the queue closes.
    ///
    /// # Errors
    ///
    /// Returns the first transport error. The queue closing is also an
    /// error: it only happens when the transport task has stopped.
    pub async fn run(&mut self, mut inbound: mpsc::UnboundedReceiver<InboundRequest>) -> Result<()> {
        tracing::info!("Dispatcher started");

        while let Some(request) = inbound.recv().await {
            self.handle(request).await?;
        }

        Err(ProtocolError::ChannelClosed("inbound request queue".to_string()).into())
    }

    /// Processes a single request to completion.
    ///
    /// Malformed and invalid requests, including ones the sequencer rejects,
    /// are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the transport fails while executing.
    pub async fn handle(&mut self, request: InboundRequest) -> Result<()> {
        let Some(target) = request.target() else {
            tracing::debug!(topic = %request.topic, "Ignoring non-command topic");
            return Ok(());
        };

        tracing::debug!(
            topic = %request.topic,
            payload = %request.payload,
            "Processing request"
        );

        let outcome = match self.plan(target, &request.payload) {
            Ok(plan) => self.sequencer.execute(plan).await,
            Err(err) => Err(err.into()),
        };

        match outcome {
            Err(err) if err.is_recoverable() => {
                tracing::warn!(
                    topic = %request.topic,
                    payload = %request.payload,
                    mode = ?self.sequencer.state().mode(),
                    error = %err,
                    "Dropping request"
                );
                Ok(())
            }
            other => other,
        }
    }

    fn plan(&self, target: Target, payload: &str) -> std::result::Result<Plan, RequestError> {
        let state = self.sequencer.state();
        match target {
            Target::Mode => validate_mode_request(state, payload.trim()),
            Target::Level => validate_level_request(state, parse_level(payload)?),
        }
    }
}
