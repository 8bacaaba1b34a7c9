// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan and humidity levels.

use std::fmt;

use crate::error::ValueError;

/// Intensity setting of the unit (1-3).
///
/// A level has no meaning on its own: the active mode decides whether it
/// is looked up in the ventilation or the humidity table.
///
/// # Examples
///
/// ```
/// use ambientika_relay::types::Level;
///
/// let level = Level::try_from(2).unwrap();
/// assert_eq!(level, Level::Two);
/// assert_eq!(level.value(), 2);
/// assert!(Level::try_from(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Lowest level.
    One,
    /// Medium level.
    Two,
    /// Highest level.
    Three,
}

impl Level {
    /// Minimum level value.
    pub const MIN: u8 = 1;

    /// Maximum level value.
    pub const MAX: u8 = 3;

    /// All levels in ascending order.
    pub const ALL: [Self; 3] = [Self::One, Self::Two, Self::Three];

    /// Returns the numeric level value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl TryFrom<i64> for Level {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(ValueError::OutOfRange {
                min: i64::from(Self::MIN),
                max: i64::from(Self::MAX),
                actual: value,
            }),
        }
    }
}

/// Which level table a level is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    /// Fan speed levels.
    Ventilation,
    /// Target humidity levels.
    Humidity,
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ventilation => f.write_str("ventilation"),
            Self::Humidity => f.write_str("humidity"),
        }
    }
}
