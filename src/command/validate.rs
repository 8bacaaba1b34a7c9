// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request validation against the current device state.

use crate::error::RequestError;
use crate::state::DeviceState;
use crate::types::{Level, Mode};

use super::Plan;

/// Validates a mode request.
///
/// Any known mode is accepted. The plan carries a follow-up level when the
/// mode takes a level and a level of that kind was sent before, so the unit
/// ends up at the level it had the last time it was in a mode of that class.
///
/// # Errors
///
/// Returns [`RequestError::UnknownMode`] if `requested` is not a mode name.
pub fn validate_mode_request(state: &DeviceState, requested: &str) -> Result<Plan, RequestError> {
    let mode: Mode = requested
        .parse()
        .map_err(|_| RequestError::UnknownMode(requested.to_string()))?;

    let follow_up = mode
        .class()
        .level_kind()
        .and_then(|kind| state.level(kind));

    Ok(Plan {
        mode,
        level: follow_up,
    })
}

/// Validates a level request.
///
/// A level is accepted only while a mode is set whose class takes a level
/// and the value is in that level table. The plan re-asserts the current
/// mode before the level.
///
/// # Errors
///
/// - [`RequestError::NoCurrentMode`] if no mode has been set yet
/// - [`RequestError::LevelNotAccepted`] if the current mode takes no level
/// - [`RequestError::LevelOutOfRange`] if `requested` is not in the table
pub fn validate_level_request(state: &DeviceState, requested: i64) -> Result<Plan, RequestError> {
    let Some(mode) = state.mode() else {
        return Err(RequestError::NoCurrentMode(requested));
    };

    if mode.class().level_kind().is_none() {
        return Err(RequestError::LevelNotAccepted { mode });
    }

    let level = Level::try_from(requested).map_err(RequestError::LevelOutOfRange)?;

    Ok(Plan {
        mode,
        level: Some(level),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;
    use crate::state::StateChange;

    fn state_with(changes: &[StateChange]) -> DeviceState {
        let mut state = DeviceState::new();
        for change in changes {
            state.apply(change);
        }
        state
    }

    #[test]
    fn mode_request_from_unset_state_has_no_follow_up() {
        let plan = validate_mode_request(&DeviceState::new(), "Auto").unwrap();
        assert_eq!(plan.mode, Mode::Auto);
        assert_eq!(plan.level, None);
    }

    #[test]
    fn mode_request_restores_known_level_of_same_kind() {
        let state = state_with(&[
            StateChange::Mode(Mode::Manual),
            StateChange::VentilationLevel(Level::Three),
            StateChange::HumidityLevel(Level::One),
        ]);

        let plan = validate_mode_request(&state, "Out").unwrap();
        assert_eq!(plan.level, Some(Level::Three));

        let plan = validate_mode_request(&state, "Watch").unwrap();
        assert_eq!(plan.level, Some(Level::One));
    }

    #[test]
    fn mode_request_ignores_level_of_other_kind() {
        let state = state_with(&[
            StateChange::Mode(Mode::Auto),
            StateChange::HumidityLevel(Level::Two),
        ]);
        let plan = validate_mode_request(&state, "Manual").unwrap();
        assert_eq!(plan.mode, Mode::Manual);
        assert_eq!(plan.level, None);
    }

    #[test]
    fn transient_and_standalone_modes_never_follow_up() {
        let state = state_with(&[
            StateChange::VentilationLevel(Level::Two),
            StateChange::HumidityLevel(Level::Two),
        ]);
        for name in ["Boost", "Reset", "Night"] {
            let plan = validate_mode_request(&state, name).unwrap();
            assert_eq!(plan.level, None, "{name}");
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert_eq!(
            validate_mode_request(&DeviceState::new(), "Turbo"),
            Err(RequestError::UnknownMode("Turbo".to_string()))
        );
    }

    #[test]
    fn level_request_without_mode_is_rejected() {
        assert_eq!(
            validate_level_request(&DeviceState::new(), 2),
            Err(RequestError::NoCurrentMode(2))
        );
    }

    #[test]
    fn level_request_accepted_for_level_bearing_modes() {
        for mode in Mode::ALL {
            let state = state_with(&[StateChange::Mode(mode)]);
            if state.active_level_kind().is_none() {
                continue;
            }
            for level in Level::ALL {
                let plan = validate_level_request(&state, i64::from(level.value())).unwrap();
                assert_eq!(plan.mode, mode);
                assert_eq!(plan.level, Some(level));
            }
        }
    }

    #[test]
    fn level_request_in_standalone_mode_is_rejected() {
        let state = state_with(&[StateChange::Mode(Mode::Night)]);
        assert_eq!(
            validate_level_request(&state, 1),
            Err(RequestError::LevelNotAccepted { mode: Mode::Night })
        );
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        let state = state_with(&[StateChange::Mode(Mode::Auto)]);
        assert_eq!(
            validate_level_request(&state, 5),
            Err(RequestError::LevelOutOfRange(ValueError::OutOfRange {
                min: 1,
                max: 3,
                actual: 5,
            }))
        );
    }
}
