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

//! Temperature threshold selection
//!
//! Each threshold owns a band: the fan steps up to the next threshold once the
//! temperature reaches that threshold's `up_threshold`, and steps back down
//! once the temperature falls to the current threshold's `down_threshold`.
//! The gap between the two acts as hysteresis between neighbouring bands.

use tracing::debug;

use crate::config::TemperatureThreshold;
use crate::constants::speed;
use crate::error::{EcFanError, Result};

/// Check a threshold set before it is handed to a [`ThresholdManager`]
pub fn validate_thresholds(thresholds: &[TemperatureThreshold]) -> Result<()> {
    if thresholds.is_empty() {
        return Err(EcFanError::config("at least one temperature threshold required"));
    }
    for t in thresholds {
        if !t.up_threshold.is_finite() || !t.down_threshold.is_finite() {
            return Err(EcFanError::invalid_config(
                "TemperatureThresholds",
                "thresholds must be finite",
            ));
        }
        if t.down_threshold > t.up_threshold {
            return Err(EcFanError::invalid_config(
                "TemperatureThresholds",
                format!(
                    "DownThreshold {} is above UpThreshold {}",
                    t.down_threshold, t.up_threshold
                ),
            ));
        }
        if !t.fan_speed.is_finite()
            || !(speed::MIN_PERCENT..=speed::MAX_PERCENT).contains(&t.fan_speed)
        {
            return Err(EcFanError::invalid_config(
                "TemperatureThresholds",
                format!("FanSpeed {} out of range", t.fan_speed),
            ));
        }
    }
    Ok(())
}

/// Picks the threshold matching the latest temperature sample
#[derive(Debug, Clone)]
pub struct ThresholdManager {
    thresholds: Vec<TemperatureThreshold>,
    current: usize,
}

impl ThresholdManager {
    /// Build a manager; the lowest threshold starts out current
    pub fn new(thresholds: &[TemperatureThreshold]) -> Result<Self> {
        validate_thresholds(thresholds)?;

        let mut thresholds = thresholds.to_vec();
        thresholds.sort_by(|a, b| a.up_threshold.total_cmp(&b.up_threshold));

        Ok(Self { thresholds, current: 0 })
    }

    /// Select the threshold for `temperature` and remember it as current
    pub fn auto_select_threshold(&mut self, temperature: f32) -> &TemperatureThreshold {
        let before = self.current;

        while self.current + 1 < self.thresholds.len()
            && temperature >= self.thresholds[self.current + 1].up_threshold
        {
            self.current += 1;
        }

        if self.current == before {
            while self.current > 0 && temperature <= self.thresholds[self.current].down_threshold {
                self.current -= 1;
            }
        }

        if self.current != before {
            debug!(
                temperature,
                from = before,
                to = self.current,
                fan_speed = self.thresholds[self.current].fan_speed,
                "Threshold changed"
            );
        }

        &self.thresholds[self.current]
    }

    /// Last selected threshold, without re-evaluating
    pub fn current_threshold(&self) -> &TemperatureThreshold {
        &self.thresholds[self.current]
    }

    pub fn thresholds(&self) -> &[TemperatureThreshold] {
        &self.thresholds
    }
}
