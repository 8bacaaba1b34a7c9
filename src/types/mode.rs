// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operating modes of the ventilation unit.

use std::fmt;
use std::str::FromStr;

use crate::codes;
use crate::error::ValueError;
use crate::types::LevelKind;

/// A named operating mode of the ventilation unit.
///
/// Mode names are case-sensitive and match the labels used on the MQTT
/// command topic.
///
/// # Examples
///
/// ```
/// use ambientika_relay::types::{Mode, ModeClass};
///
/// let mode: Mode = "Auto".parse().unwrap();
/// assert_eq!(mode, Mode::Auto);
/// assert_eq!(mode.class(), ModeClass::Humidity);
/// assert!("auto".parse::<Mode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Heat recovery with a manual ventilation level.
    Manual,
    /// Air intake with a manual ventilation level.
    In,
    /// Air extraction with a manual ventilation level.
    Out,
    /// Master/slave heat recovery.
    MaSl,
    /// Slave/master heat recovery.
    SlMa,
    /// Automatic operation driven by a humidity level.
    Auto,
    /// Surveillance operation driven by a humidity level.
    Watch,
    /// Night ventilation.
    Night,
    /// Short boost, not persisted.
    Boost,
    /// Filter reset, not persisted.
    Reset,
}

impl Mode {
    /// All modes in table order.
    pub const ALL: [Self; 10] = [
        Self::Manual,
        Self::In,
        Self::Out,
        Self::MaSl,
        Self::SlMa,
        Self::Auto,
        Self::Watch,
        Self::Night,
        Self::Boost,
        Self::Reset,
    ];

    /// Returns the mode name as used on MQTT topics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::In => "In",
            Self::Out => "Out",
            Self::MaSl => "MaSl",
            Self::SlMa => "SlMa",
            Self::Auto => "Auto",
            Self::Watch => "Watch",
            Self::Night => "Night",
            Self::Boost => "Boost",
            Self::Reset => "Reset",
        }
    }

    /// Returns the class this mode belongs to.
    #[must_use]
    pub const fn class(&self) -> ModeClass {
        codes::class_of(*self)
    }

    /// Returns `true` if applying this mode changes the current mode.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.class().is_persistent()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ValueError::UnknownMode(s.to_string()))
    }
}

/// Classification of modes by the kind of level they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeClass {
    /// Persistent, accepts a ventilation level.
    Ventilation,
    /// Persistent, accepts a humidity level.
    Humidity,
    /// Persistent, accepts no level.
    Standalone,
    /// Applied once and never recorded as the current mode.
    Transient,
}

impl ModeClass {
    /// Returns the level table used by modes of this class, if any.
    #[must_use]
    pub const fn level_kind(&self) -> Option<LevelKind> {
        match self {
            Self::Ventilation => Some(LevelKind::Ventilation),
            Self::Humidity => Some(LevelKind::Humidity),
            Self::Standalone | Self::Transient => None,
        }
    }

    /// Returns `true` unless the class is [`ModeClass::Transient`].
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        !matches!(self, Self::Transient)
    }
}
