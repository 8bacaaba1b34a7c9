// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for ventilation unit control.
//!
//! Each type can only hold values the unit understands, so table lookups
//! downstream never fail at runtime.
//!
//! # Types
//!
//! - [`Mode`] - Named operating mode (Manual, Auto, Boost, ...)
//! - [`ModeClass`] - Which kind of level a mode accepts, if any
//! - [`Level`] - Fan or humidity level (1-3)
//! - [`LevelKind`] - Ventilation or humidity level table
//! - [`IrCode`] - 32-bit infrared code

mod ir_code;
mod level;
mod mode;

pub use ir_code::IrCode;
pub use level::{Level, LevelKind};
pub use mode::{Mode, ModeClass};
