// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command validation and IR payloads.
//!
//! Inbound requests are checked against the current [`DeviceState`] and
//! turned into a [`Plan`]: the mode to (re-)assert and an optional level to
//! send after it. The sequencer executes plans; it never sees a request
//! that failed validation.
//!
//! | Request | Accepted when | Plan |
//! |---------|---------------|------|
//! | mode `m` | `m` is a known mode | `m`, then the last level of `m`'s kind if known |
//! | level `l` | current mode takes a level and `l` is 1-3 | current mode, then `l` |
//!
//! [`DeviceState`]: crate::state::DeviceState
//!
//! # Examples
//!
//! ```
//! use ambientika_relay::command::{validate_level_request, validate_mode_request};
//! use ambientika_relay::state::{DeviceState, StateChange};
//! use ambientika_relay::types::{Level, Mode};
//!
//! let mut state = DeviceState::new();
//! assert!(validate_level_request(&state, 2).is_err());
//!
//! state.apply(&StateChange::Mode(Mode::Auto));
//! let plan = validate_level_request(&state, 2).unwrap();
//! assert_eq!(plan.mode, Mode::Auto);
//! assert_eq!(plan.level, Some(Level::Two));
//!
//! let plan = validate_mode_request(&state, "Boost").unwrap();
//! assert_eq!(plan.level, None);
//! ```

mod ir;
mod validate;

pub use ir::IrCommand;
pub use validate::{validate_level_request, validate_mode_request};

use crate::types::{Level, Mode};

/// A validated change: a mode emission optionally followed by a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    /// Mode to emit first.
    pub mode: Mode,
    /// Level to emit after the settle interval, if any.
    pub level: Option<Level>,
}
