// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Execution of validated plans as timed IR emissions.
//!
//! The [`Sequencer`] owns the [`DeviceState`] and is the only place it is
//! mutated. Every emission follows the same steps:
//!
//! 1. publish the IR code on the IR sender topic
//! 2. flush the transport
//! 3. for persistent changes, publish the new value retained, then record it
//!
//! Between the mode and the level of a [`Plan`], and after the last emission
//! of a plan, the sequencer waits one settle interval. The receiver drops
//! bursts that arrive back to back.
//!
//! # Examples
//!
//! ```no_run
//! use ambientika_relay::command::Plan;
//! use ambientika_relay::protocol::{MqttBroker, Topics};
//! use ambientika_relay::sequencer::{Sequencer, SequencerConfig};
//! use ambientika_relay::types::{Level, Mode};
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> ambientika_relay::Result<()> {
//! let (tx, _rx) = mpsc::unbounded_channel();
//! let broker = MqttBroker::builder().host("192.168.1.50").build(tx).await?;
//!
//! let topics = Topics::new("ambientika", "ir/send");
//! let mut sequencer = Sequencer::new(broker, topics, SequencerConfig::default());
//!
//! sequencer.execute(Plan { mode: Mode::Manual, level: Some(Level::Two) }).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use crate::command::{IrCommand, Plan};
use crate::error::{ProtocolError, RequestError, Result};
use crate::protocol::{OutboundMessage, Publisher, Topics};
use crate::state::{DeviceState, StateChange};
use crate::types::{Level, Mode};

/// Timing and encoding settings of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Minimum delay between two IR emissions.
    pub settle_interval: Duration,
    /// Repeat count sent with every IR code.
    pub ir_repeat: u8,
}

impl SequencerConfig {
    /// Default settle interval.
    pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_secs(1);
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            settle_interval: Self::DEFAULT_SETTLE_INTERVAL,
            ir_repeat: IrCommand::DEFAULT_REPEAT,
        }
    }
}

/// Owns the device state and turns plans into IR emissions.
#[derive(Debug)]
pub struct Sequencer<P> {
    publisher: P,
    topics: Topics,
    state: DeviceState,
    config: SequencerConfig,
}

impl<P: Publisher> Sequencer<P> {
    /// Creates a sequencer with an unset device state.
    #[must_use]
    pub fn new(publisher: P, topics: Topics, config: SequencerConfig) -> Self {
        Self {
            publisher,
            topics,
            state: DeviceState::new(),
            config,
        }
    }

    /// Returns the current device state.
    #[must_use]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Executes a plan: the mode, then the level if any, each followed by a
    /// settle interval.
    ///
    /// # Errors
    ///
    /// Returns the first transport error. The remaining steps are skipped.
    pub async fn execute(&mut self, plan: Plan) -> Result<()> {
        self.apply_mode(plan.mode).await?;
        self.settle().await;

        if let Some(level) = plan.level {
            self.apply_level(level).await?;
            self.settle().await;
        }

        Ok(())
    }

    /// Emits the IR code for `mode`.
    ///
    /// Transient modes are only emitted. Persistent modes also become the
    /// current mode and are published retained.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if publishing or flushing fails.
    pub async fn apply_mode(&mut self, mode: Mode) -> Result<()> {
        self.emit(IrCommand::for_mode(mode, self.config.ir_repeat))
            .await?;

        if mode.is_persistent() {
            self.commit(StateChange::Mode(mode)).await?;
            tracing::info!(mode = %mode, "Set mode");
        } else {
            tracing::info!(mode = %mode, "Sent non-persistent mode");
        }
        Ok(())
    }

    /// Emits the IR code for `level` in the current mode's level table,
    /// records it and publishes it retained.
    ///
    /// # Errors
    ///
    /// Returns `RequestError` if the current mode takes no level, or
    /// `ProtocolError` if publishing or flushing fails.
    pub async fn apply_level(&mut self, level: Level) -> Result<()> {
        let Some(mode) = self.state.mode() else {
            return Err(RequestError::NoCurrentMode(i64::from(level.value())).into());
        };
        let Some(kind) = mode.class().level_kind() else {
            return Err(RequestError::LevelNotAccepted { mode }.into());
        };

        self.emit(IrCommand::for_level(kind, level, self.config.ir_repeat))
            .await?;
        self.commit(StateChange::level(kind, level)).await?;

        tracing::info!(mode = %mode, level = %level, kind = %kind, "Set level");
        Ok(())
    }

    async fn emit(&self, command: IrCommand) -> std::result::Result<(), ProtocolError> {
        tracing::debug!(
            topic = %self.topics.ir(),
            code = %command.code(),
            "Emitting IR code"
        );
        self.publisher
            .publish(OutboundMessage::ir(&self.topics, &command))
            .await?;
        self.publisher.flush().await
    }

    async fn commit(&mut self, change: StateChange) -> std::result::Result<(), ProtocolError> {
        self.publisher
            .publish(OutboundMessage::state(&self.topics, &change))
            .await?;
        self.publisher.flush().await?;
        self.state.apply(&change);
        Ok(())
    }

    async fn settle(&self) {
        tokio::time::sleep(self.config.settle_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;
    use crate::codes;
    use crate::error::Error;
    use crate::protocol::recorder::{Recorded, RecordingPublisher};
    use crate::types::LevelKind;

    const SETTLE: Duration = Duration::from_secs(1);

    fn sequencer() -> (Sequencer<RecordingPublisher>, RecordingPublisher) {
        let publisher = RecordingPublisher::new();
        let config = SequencerConfig {
            settle_interval: SETTLE,
            ir_repeat: 2,
        };
        let seq = Sequencer::new(publisher.clone(), Topics::new("vent", "ir"), config);
        (seq, publisher)
    }

    fn ir(code: crate::types::IrCode) -> OutboundMessage {
        OutboundMessage::ir(&Topics::new("vent", "ir"), &IrCommand::new(code, 2))
    }

    #[tokio::test(start_paused = true)]
    async fn apply_mode_emits_code_and_persists() {
        for mode in Mode::ALL {
            let (mut seq, publisher) = sequencer();
            seq.apply_mode(mode).await.unwrap();

            let messages = publisher.messages();
            assert_eq!(messages[0], ir(codes::mode_code(mode)));

            if mode.is_persistent() {
                assert_eq!(seq.state().mode(), Some(mode));
                assert_eq!(
                    messages[1],
                    OutboundMessage::new("vent/mode", mode.as_str(), true)
                );
                assert_eq!(messages.len(), 2);
            } else {
                assert_eq!(seq.state().mode(), None);
                assert_eq!(messages.len(), 1);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn each_emission_is_flushed_before_state_publish() {
        let (mut seq, publisher) = sequencer();
        seq.apply_mode(Mode::Auto).await.unwrap();

        let log = publisher.log();
        assert!(matches!(&log[0], Recorded::Publish(m) if m.topic == "ir"));
        assert_eq!(log[1], Recorded::Flush);
        assert!(matches!(&log[2], Recorded::Publish(m) if m.topic == "vent/mode"));
        assert_eq!(log[3], Recorded::Flush);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_mode_keeps_current_mode() {
        let (mut seq, publisher) = sequencer();
        seq.apply_mode(Mode::Watch).await.unwrap();
        seq.apply_mode(Mode::Reset).await.unwrap();

        assert_eq!(seq.state().mode(), Some(Mode::Watch));
        let retained: Vec<_> = publisher
            .messages()
            .into_iter()
            .filter(|m| m.retain)
            .collect();
        assert_eq!(retained.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn apply_level_uses_current_mode_table() {
        let (mut seq, publisher) = sequencer();
        seq.apply_mode(Mode::In).await.unwrap();
        seq.apply_level(Level::Three).await.unwrap();

        assert_eq!(seq.state().ventilation_level(), Some(Level::Three));
        assert_eq!(seq.state().humidity_level(), None);

        let messages = publisher.messages();
        assert_eq!(
            messages[2],
            ir(codes::level_code(LevelKind::Ventilation, Level::Three))
        );
        assert_eq!(messages[3], OutboundMessage::new("vent/level", "3", true));
    }

    #[tokio::test(start_paused = true)]
    async fn apply_level_without_mode_emits_nothing() {
        let (mut seq, publisher) = sequencer();
        let err = seq.apply_level(Level::One).await.unwrap_err();

        assert!(matches!(err, Error::Request(RequestError::NoCurrentMode(1))));
        assert!(publisher.log().is_empty());
        assert_eq!(*seq.state(), DeviceState::new());
    }

    #[tokio::test(start_paused = true)]
    async fn plan_with_level_is_separated_by_settle_interval() {
        let (mut seq, publisher) = sequencer();
        let start = Instant::now();

        seq.execute(Plan {
            mode: Mode::Manual,
            level: Some(Level::Two),
        })
        .await
        .unwrap();

        let timed = publisher.timed_messages();
        let ir_times: Vec<Instant> = timed
            .iter()
            .filter(|(_, m)| m.topic == "ir")
            .map(|(at, _)| *at)
            .collect();
        assert_eq!(ir_times.len(), 2);
        assert!(ir_times[1] - ir_times[0] >= SETTLE);
        assert_eq!(timed[0].1, ir(codes::mode_code(Mode::Manual)));
        assert_eq!(
            timed[2].1,
            ir(codes::level_code(LevelKind::Ventilation, Level::Two))
        );

        // settle after the level as well
        assert!(Instant::now() - start >= SETTLE * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn mode_only_plan_settles_once() {
        let (mut seq, _publisher) = sequencer();
        let start = Instant::now();

        seq.execute(Plan {
            mode: Mode::Night,
            level: None,
        })
        .await
        .unwrap();

        let elapsed = Instant::now() - start;
        assert!(elapsed >= SETTLE);
        assert!(elapsed < SETTLE * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_request_is_idempotent() {
        let (mut seq, publisher) = sequencer();
        let plan = Plan {
            mode: Mode::Auto,
            level: None,
        };
        seq.execute(plan).await.unwrap();
        let state = *seq.state();
        seq.execute(plan).await.unwrap();

        assert_eq!(*seq.state(), state);
        let messages = publisher.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0..2], messages[2..4]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_state_publish_leaves_state_untouched() {
        let (mut seq, publisher) = sequencer();
        publisher.fail_after(1);

        let err = seq.apply_mode(Mode::Auto).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert_eq!(publisher.messages(), vec![ir(codes::mode_code(Mode::Auto))]);
        assert_eq!(seq.state().mode(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_leaves_state_untouched() {
        let (mut seq, publisher) = sequencer();
        publisher.fail_after(0);

        let err = seq.apply_mode(Mode::Manual).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert_eq!(seq.state().mode(), None);
    }
}
