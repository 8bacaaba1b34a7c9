// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! [`DeviceState`] holds the last known mode and levels of the unit.
//! [`StateChange`] is a single confirmed change the sequencer applies to it.
//!
//! # Examples
//!
//! ```
//! use ambientika_relay::state::{DeviceState, StateChange};
//! use ambientika_relay::types::Mode;
//!
//! let mut state = DeviceState::new();
//! assert!(state.apply(&StateChange::Mode(Mode::Manual)));
//! assert_eq!(state.mode(), Some(Mode::Manual));
//! ```

mod device_state;
mod state_change;

pub use device_state::DeviceState;
pub use state_change::StateChange;
