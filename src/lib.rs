/*
 * This file is part of ecfan.
 *
 * Copyright (C) 2025 ecfan contributors
 *
 * ecfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * ecfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with ecfan. If not, see <https://www.gnu.org/licenses/>.
 */

//! ecfan - notebook fan control through the embedded controller
//!
//! This library provides the per-fan control core of a notebook fan daemon:
//! temperature to speed selection with critical-temperature hysteresis,
//! percentage to raw EC value calibration, and EC register or ACPI method I/O.

pub mod backend;
pub mod channel;
pub mod config;
pub mod constants;
pub mod convert;
pub mod error;
pub mod fan;
pub mod threshold;

#[cfg(test)]
pub mod test_utils;

pub use backend::{AcpiCall, Backend, EcSys, HostBackend};
pub use config::{FanConfig, ModelConfig, SpeedOverride, TargetOperation, TemperatureThreshold};
pub use convert::Calibration;
pub use error::{EcFanError, Result};
pub use fan::{Fan, FanMode};
pub use threshold::ThresholdManager;
