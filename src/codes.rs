// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Infrared code tables of the Ambientika remote.
//!
//! Lookups are exhaustive matches over [`Mode`] and [`Level`], so every
//! valid key has exactly one code and there is no "not found" case.

use crate::types::{IrCode, Level, LevelKind, Mode, ModeClass};

/// Returns the IR code that switches the unit into `mode`.
#[must_use]
pub const fn mode_code(mode: Mode) -> IrCode {
    IrCode::new(match mode {
        Mode::Manual => 0x9669_D52A,
        Mode::In => 0x9669_D22D,
        Mode::Out => 0x9669_D32C,
        Mode::MaSl => 0x9669_D12E,
        Mode::SlMa => 0x9669_D02F,
        Mode::Auto => 0x9669_D728,
        Mode::Watch => 0x9669_D629,
        Mode::Night => 0x9669_B04F,
        Mode::Boost => 0x9669_B748,
        Mode::Reset => 0x9669_BF40,
    })
}

/// Returns the IR code for `level` in the given level table.
#[must_use]
pub const fn level_code(kind: LevelKind, level: Level) -> IrCode {
    IrCode::new(match (kind, level) {
        (LevelKind::Ventilation, Level::One) => 0x9669_936C,
        (LevelKind::Ventilation, Level::Two) => 0x9669_926D,
        (LevelKind::Ventilation, Level::Three) => 0x9669_916E,
        (LevelKind::Humidity, Level::One) => 0x9669_B34C,
        (LevelKind::Humidity, Level::Two) => 0x9669_B44B,
        (LevelKind::Humidity, Level::Three) => 0x9669_B54A,
    })
}

/// Returns the class of `mode`.
#[must_use]
pub const fn class_of(mode: Mode) -> ModeClass {
    match mode {
        Mode::Manual | Mode::In | Mode::Out | Mode::MaSl | Mode::SlMa => ModeClass::Ventilation,
        Mode::Auto | Mode::Watch => ModeClass::Humidity,
        Mode::Night => ModeClass::Standalone,
        Mode::Boost | Mode::Reset => ModeClass::Transient,
    }
}
