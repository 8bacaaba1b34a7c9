// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Infrared command codes.

use std::fmt;

/// A 32-bit infrared code, written as eight hex digits.
///
/// The IR sender expects the code split into two 16-bit halves, each
/// rendered as a `0x`-prefixed four digit hex number. Storing the code as a
/// `u32` keeps both halves exactly four digits wide.
///
/// # Examples
///
/// ```
/// use ambientika_relay::types::IrCode;
///
/// let code = IrCode::new(0x9669_D52A);
/// assert_eq!(code.to_string(), "9669D52A");
/// assert_eq!(code.halves(), (0x9669, 0xD52A));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IrCode(u32);

impl IrCode {
    /// Creates a code from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the high and low 16-bit halves.
    #[must_use]
    pub const fn halves(&self) -> (u16, u16) {
        // Both shifts leave exactly 16 significant bits.
        #[allow(clippy::cast_possible_truncation)]
        let high = (self.0 >> 16) as u16;
        #[allow(clippy::cast_possible_truncation)]
        let low = (self.0 & 0xFFFF) as u16;
        (high, low)
    }
}

impl fmt::Display for IrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}
