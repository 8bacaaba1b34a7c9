// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are produced by the sequencer once the matching IR code
//! has been emitted, and applied to a [`DeviceState`](super::DeviceState).

use crate::types::{Level, LevelKind, Mode};

/// A confirmed change to the unit's state.
///
/// # Examples
///
/// ```
/// use ambientika_relay::state::StateChange;
/// use ambientika_relay::types::{Level, LevelKind, Mode};
///
/// let change = StateChange::level(LevelKind::Humidity, Level::Two);
/// assert_eq!(change, StateChange::HumidityLevel(Level::Two));
/// assert_eq!(StateChange::Mode(Mode::Auto).state_value(), "Auto");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// The current mode changed.
    Mode(Mode),

    /// The ventilation level changed.
    VentilationLevel(Level),

    /// The humidity level changed.
    HumidityLevel(Level),
}

impl StateChange {
    /// Creates a level change for the given level table.
    #[must_use]
    pub fn level(kind: LevelKind, level: Level) -> Self {
        match kind {
            LevelKind::Ventilation => Self::VentilationLevel(level),
            LevelKind::Humidity => Self::HumidityLevel(level),
        }
    }

    /// Returns the value published on the retained state topic.
    #[must_use]
    pub fn state_value(&self) -> String {
        match self {
            Self::Mode(mode) => mode.as_str().to_string(),
            Self::VentilationLevel(level) | Self::HumidityLevel(level) => level.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_constructor_picks_table() {
        assert_eq!(
            StateChange::level(LevelKind::Ventilation, Level::One),
            StateChange::VentilationLevel(Level::One)
        );
        assert_eq!(
            StateChange::level(LevelKind::Humidity, Level::Three),
            StateChange::HumidityLevel(Level::Three)
        );
    }

    #[test]
    fn state_values() {
        assert_eq!(StateChange::Mode(Mode::MaSl).state_value(), "MaSl");
        assert_eq!(StateChange::VentilationLevel(Level::Two).state_value(), "2");
    }
}
