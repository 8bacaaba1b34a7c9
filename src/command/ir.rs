// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IR sender command payloads.

use std::fmt;

use crate::codes;
use crate::types::{IrCode, Level, LevelKind, Mode};

/// A single burst for the IR sender.
///
/// Rendered as the two code halves followed by the repeat count, for example
/// `0x9669 0xD52A 2`.
///
/// # Examples
///
/// ```
/// use ambientika_relay::command::IrCommand;
/// use ambientika_relay::types::Mode;
///
/// let cmd = IrCommand::for_mode(Mode::Manual, IrCommand::DEFAULT_REPEAT);
/// assert_eq!(cmd.payload(), "0x9669 0xD52A 2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrCommand {
    code: IrCode,
    repeat: u8,
}

impl IrCommand {
    /// Repeat count understood by the unit's receiver.
    pub const DEFAULT_REPEAT: u8 = 2;

    /// Creates a command for an arbitrary code.
    #[must_use]
    pub const fn new(code: IrCode, repeat: u8) -> Self {
        Self { code, repeat }
    }

    /// Creates the command that switches to `mode`.
    #[must_use]
    pub const fn for_mode(mode: Mode, repeat: u8) -> Self {
        Self::new(codes::mode_code(mode), repeat)
    }

    /// Creates the command that sets `level` in the given table.
    #[must_use]
    pub const fn for_level(kind: LevelKind, level: Level, repeat: u8) -> Self {
        Self::new(codes::level_code(kind, level), repeat)
    }

    /// Returns the IR code.
    #[must_use]
    pub const fn code(&self) -> IrCode {
        self.code
    }

    /// Returns the MQTT payload for the IR sender.
    #[must_use]
    pub fn payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IrCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (high, low) = self.code.halves();
        write!(f, "0x{high:04X} 0x{low:04X} {}", self.repeat)
    }
}
