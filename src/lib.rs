// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ambientika_relay` - MQTT to IR relay for Ambientika ventilation units.
//!
//! Ambientika units are only controllable through a one-way infrared remote.
//! This crate accepts mode and level requests on MQTT topics, tracks the
//! unit's state locally and publishes the matching IR codes to an MQTT IR
//! sender (for example a Tasmota IR bridge).
//!
//! # Supported Features
//!
//! - **Modes**: Manual, In, Out, MaSl, SlMa, Auto, Watch, Night, Boost, Reset
//! - **Levels**: ventilation or humidity level 1-3, depending on the mode
//! - **State echo**: last accepted mode and level published retained
//! - **Discovery**: Home Assistant `select` entities for mode and level
//!
//! # Processing Model
//!
//! Requests are handled strictly one at a time in arrival order. Every IR
//! emission is flushed to the broker and followed by a settle interval
//! before the next one, because the unit ignores codes that arrive too
//! close together.
//!
//! # Quick Start
//!
//! ```no_run
//! use ambientika_relay::protocol::{MqttBroker, Topics};
//! use ambientika_relay::{Dispatcher, Sequencer, SequencerConfig};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> ambientika_relay::Result<()> {
//!     let topics = Topics::new("ambientika", "ir/send");
//!     let (tx, rx) = mpsc::unbounded_channel();
//!
//!     let broker = MqttBroker::builder()
//!         .host("192.168.1.50")
//!         .build(tx)
//!         .await?;
//!     broker.subscribe(&topics.subscription()).await?;
//!
//!     let sequencer = Sequencer::new(broker, topics, SequencerConfig::default());
//!     Dispatcher::new(sequencer).run(rx).await
//! }
//! ```
//!
//! ## Without a Broker
//!
//! The validation and state types do not need a connection:
//!
//! ```
//! use ambientika_relay::command::validate_mode_request;
//! use ambientika_relay::state::DeviceState;
//! use ambientika_relay::{Level, Mode};
//!
//! let state = DeviceState::new();
//! let plan = validate_mode_request(&state, "Auto").unwrap();
//! assert_eq!(plan.mode, Mode::Auto);
//! assert_eq!(plan.level, None::<Level>);
//! ```

pub mod codes;
pub mod command;
pub mod config;
pub mod discovery;
pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod sequencer;
pub mod state;
pub mod types;

pub use command::{IrCommand, Plan};
pub use config::Config;
pub use dispatcher::{Dispatcher, InboundRequest};
pub use error::{ConfigError, Error, ProtocolError, RequestError, Result, ValueError};
#[cfg(feature = "mqtt")]
pub use protocol::{MqttBroker, MqttBrokerBuilder, MqttBrokerConfig};
pub use protocol::{OutboundMessage, Publisher, Topics};
pub use sequencer::{Sequencer, SequencerConfig};
pub use state::{DeviceState, StateChange};
pub use types::{IrCode, Level, LevelKind, Mode, ModeClass};
