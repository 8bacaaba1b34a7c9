// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use crate::types::{Level, LevelKind, Mode};

use super::StateChange;

/// Last known state of the ventilation unit.
///
/// All fields start unset because the unit cannot report its state; they are
/// only learned from commands this process emitted. Both levels are kept
/// across mode switches, but only the one matching the current mode's class
/// is active.
///
/// # Examples
///
/// ```
/// use ambientika_relay::state::{DeviceState, StateChange};
/// use ambientika_relay::types::{Level, Mode};
///
/// let mut state = DeviceState::new();
/// state.apply(&StateChange::Mode(Mode::Auto));
/// state.apply(&StateChange::HumidityLevel(Level::Two));
///
/// assert_eq!(state.mode(), Some(Mode::Auto));
/// assert_eq!(state.active_level(), Some(Level::Two));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceState {
    /// Current persistent mode.
    mode: Option<Mode>,
    /// Last ventilation level sent.
    ventilation_level: Option<Level>,
    /// Last humidity level sent.
    humidity_level: Option<Level>,
}

impl DeviceState {
    /// Creates a new state with everything unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current mode.
    #[must_use]
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Returns the last ventilation level.
    #[must_use]
    pub fn ventilation_level(&self) -> Option<Level> {
        self.ventilation_level
    }

    /// Returns the last humidity level.
    #[must_use]
    pub fn humidity_level(&self) -> Option<Level> {
        self.humidity_level
    }

    /// Returns the last level recorded in the given table.
    #[must_use]
    pub fn level(&self, kind: LevelKind) -> Option<Level> {
        match kind {
            LevelKind::Ventilation => self.ventilation_level,
            LevelKind::Humidity => self.humidity_level,
        }
    }

    /// Returns the level table used by the current mode.
    #[must_use]
    pub fn active_level_kind(&self) -> Option<LevelKind> {
        self.mode.and_then(|mode| mode.class().level_kind())
    }

    /// Returns the level that applies to the current mode.
    #[must_use]
    pub fn active_level(&self) -> Option<Level> {
        self.active_level_kind().and_then(|kind| self.level(kind))
    }

    /// Applies a state change.
    ///
    /// A mode change naming a transient mode is ignored, since transient
    /// modes never become the current mode.
    ///
    /// Returns `true` if the state actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        let (slot, value) = match *change {
            StateChange::Mode(mode) if !mode.is_persistent() => return false,
            StateChange::Mode(mode) => {
                let changed = self.mode != Some(mode);
                self.mode = Some(mode);
                return changed;
            }
            StateChange::VentilationLevel(level) => (&mut self.ventilation_level, level),
            StateChange::HumidityLevel(level) => (&mut self.humidity_level, level),
        };

        let changed = *slot != Some(value);
        *slot = Some(value);
        changed
    }
}
