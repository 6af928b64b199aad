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

//! Percentage <-> raw EC value conversion
//!
//! Writes map a percentage onto `[min_write, max_write]`, reads map a raw value
//! back through `[min_read, max_read]`. Either range may be inverted (a fan
//! that spins faster for smaller values), and the two may differ when the EC
//! reports speed in other units than it accepts.
//!
//! Overrides take precedence over the linear formula:
//! - writes match on percentage, within [`speed::OVERRIDE_TOLERANCE`]
//! - reads match on the exact raw value

use crate::config::{FanConfig, SpeedOverride};
use crate::constants::speed;

/// Raw ranges of one fan, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub min_write: u16,
    pub max_write: u16,
    pub min_read: u16,
    pub max_read: u16,
    pub min_read_abs: u16,
    pub max_read_abs: u16,
    pub speed_steps: u16,
}

impl Calibration {
    pub fn from_config(cfg: &FanConfig) -> Self {
        let (min_write, max_write) = cfg.write_range();
        let (min_read, max_read) = cfg.read_range();
        let min_read_abs = min_read.min(max_read);
        let max_read_abs = min_read.max(max_read);

        Self {
            min_write,
            max_write,
            min_read,
            max_read,
            min_read_abs,
            max_read_abs,
            speed_steps: max_read_abs - min_read_abs,
        }
    }

    /// Whether a raw reading lies inside the (order independent) read range
    #[inline]
    pub fn in_read_range(&self, value: u16) -> bool {
        (self.min_read_abs..=self.max_read_abs).contains(&value)
    }

    /// Convert a target percentage into the raw value to write
    pub fn percentage_to_raw(&self, percentage: f32, overrides: &[SpeedOverride]) -> u16 {
        let percentage = speed::clamp_percent(percentage);

        if let Some(o) = override_by_percentage(overrides, percentage) {
            return o.fan_speed_value;
        }

        let min = self.min_write as f32;
        let max = self.max_write as f32;
        (min + (max - min) * percentage / 100.0).round() as u16
    }

    /// Convert a raw reading into a percentage
    ///
    /// Not clamped: a reading outside the read range yields a value outside
    /// [0, 100]. The read range is never empty for a validated config.
    pub fn raw_to_percentage(&self, value: u16, overrides: &[SpeedOverride]) -> f32 {
        if let Some(o) = override_by_value(overrides, value) {
            return o.fan_speed_percentage;
        }

        let min = self.min_read as f32;
        let max = self.max_read as f32;
        (value as f32 - min) / (max - min) * 100.0
    }
}

#[inline]
fn percent_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < speed::OVERRIDE_TOLERANCE
}

fn override_by_percentage(overrides: &[SpeedOverride], percentage: f32) -> Option<&SpeedOverride> {
    overrides.iter().find(|o| {
        o.target_operation.applies_to_write() && percent_eq(o.fan_speed_percentage, percentage)
    })
}

fn override_by_value(overrides: &[SpeedOverride], value: u16) -> Option<&SpeedOverride> {
    overrides
        .iter()
        .find(|o| o.target_operation.applies_to_read() && o.fan_speed_value == value)
}
