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

//! Single fan controller
//!
//! A [`Fan`] turns temperature samples and speed requests into raw EC writes,
//! and EC reads back into a speed percentage.
//!
//! # State
//!
//! - **Mode**: `Auto` follows the threshold table, `Fixed` holds the last
//!   requested speed. Only explicit calls change the mode.
//! - **Critical**: entered above the model's critical temperature, left below
//!   `critical - offset`. While critical the fan is driven at 100% in either
//!   mode; the stored target is left alone so the previous speed comes back
//!   when the fan cools down.
//!
//! # Reads
//!
//! ECs occasionally return garbage. A reading outside the calibrated read range
//! is retried, up to three attempts in total, and the last value is used even
//! if it is still out of range.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::Backend;
use crate::channel::{Channel, RegisterWidth, ResetAction};
use crate::config::{FanConfig, ModelConfig};
use crate::constants::{read, speed};
use crate::convert::Calibration;
use crate::error::{EcFanError, Result};
use crate::threshold::ThresholdManager;

/// Fan control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanMode {
    #[default]
    Auto,
    Fixed,
}

pub struct Fan {
    config: Arc<FanConfig>,
    backend: Arc<dyn Backend>,
    calibration: Calibration,
    read: Channel,
    write: Channel,
    reset: ResetAction,
    thresholds: ThresholdManager,
    critical_temperature: f32,
    critical_temperature_offset: f32,
    mode: FanMode,
    is_critical: bool,
    target_speed: f32,
    requested_speed: f32,
    current_speed: f32,
}

impl Fan {
    /// Create a fan in auto mode
    ///
    /// Fails with a configuration error if the threshold table is invalid or
    /// a read/write path names neither a register nor an ACPI method.
    pub fn new(config: Arc<FanConfig>, model: &ModelConfig, backend: Arc<dyn Backend>) -> Result<Self> {
        let thresholds = ThresholdManager::new(&config.temperature_thresholds)?;
        let width = RegisterWidth::from_words_flag(model.read_write_words);
        let read = Channel::for_read(&config, width)?;
        let write = Channel::for_write(&config, width)?;

        Ok(Self {
            calibration: Calibration::from_config(&config),
            reset: ResetAction::from_config(&config),
            config,
            backend,
            read,
            write,
            thresholds,
            critical_temperature: model.critical_temperature,
            critical_temperature_offset: model.critical_temperature_offset,
            mode: FanMode::Auto,
            is_critical: false,
            target_speed: 0.0,
            requested_speed: 0.0,
            current_speed: 0.0,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.config.fan_display_name.as_deref()
    }

    pub fn config(&self) -> &FanConfig {
        &self.config
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn mode(&self) -> FanMode {
        self.mode
    }

    pub fn is_critical(&self) -> bool {
        self.is_critical
    }

    /// Feed a temperature sample
    pub fn set_temperature(&mut self, temperature: f32) {
        if temperature > self.critical_temperature {
            if !self.is_critical {
                debug!(fan = ?self.name(), temperature, "Entering critical mode");
            }
            self.is_critical = true;
        } else if temperature < self.critical_temperature - self.critical_temperature_offset {
            if self.is_critical {
                debug!(fan = ?self.name(), temperature, "Leaving critical mode");
            }
            self.is_critical = false;
        }

        let threshold_speed = self.thresholds.auto_select_threshold(temperature).fan_speed;
        if self.mode == FanMode::Auto {
            self.target_speed = threshold_speed;
        }
    }

    /// Switch to fixed mode at `percentage`
    ///
    /// Out-of-range input is clamped and applied, then reported as
    /// [`EcFanError::SpeedOutOfRange`].
    pub fn set_fixed_speed(&mut self, percentage: f32) -> Result<()> {
        self.mode = FanMode::Fixed;

        let clamped = speed::clamp_percent(percentage);
        self.requested_speed = clamped;
        self.target_speed = clamped;

        if clamped != percentage {
            return Err(EcFanError::SpeedOutOfRange { requested: percentage });
        }
        Ok(())
    }

    /// Switch to auto mode at the last selected threshold's speed
    pub fn set_auto_speed(&mut self) {
        self.mode = FanMode::Auto;
        self.target_speed = self.thresholds.current_threshold().fan_speed;
    }

    /// Speed the fan is driven at; 100 while critical
    pub fn target_speed(&self) -> f32 {
        if self.is_critical {
            speed::MAX_PERCENT
        } else {
            self.target_speed
        }
    }

    /// Last speed requested through [`Fan::set_fixed_speed`]
    pub fn requested_speed(&self) -> f32 {
        self.requested_speed
    }

    /// Speed from the last successful [`Fan::refresh_current_speed`]
    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn speed_steps(&self) -> u16 {
        self.calibration.speed_steps
    }

    /// Read the fan speed back from the EC
    pub fn refresh_current_speed(&mut self) -> Result<()> {
        let backend = self.backend.as_ref();

        let mut value = self.read.read(backend)?;
        let mut attempts = 1;
        while !self.calibration.in_read_range(value) && attempts < read::MAX_ATTEMPTS {
            value = self.read.read(backend)?;
            attempts += 1;
        }

        if !self.calibration.in_read_range(value) {
            warn!(
                fan = ?self.name(),
                value,
                min = self.calibration.min_read_abs,
                max = self.calibration.max_read_abs,
                attempts,
                "EC speed reading out of range, using it anyway"
            );
        }

        let percentage = self
            .calibration
            .raw_to_percentage(value, &self.config.fan_speed_percentage_overrides);
        self.current_speed = speed::clamp_percent(percentage);
        Ok(())
    }

    /// Write the target speed to the EC
    pub fn flush(&self) -> Result<()> {
        let value = self
            .calibration
            .percentage_to_raw(self.target_speed(), &self.config.fan_speed_percentage_overrides);
        self.write.write(self.backend.as_ref(), value)
    }

    /// Hand the fan back to the EC, if the model needs that
    pub fn reset(&self) -> Result<()> {
        self.reset.run(self.backend.as_ref(), &self.write)
    }
}

impl fmt::Debug for Fan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fan")
            .field("name", &self.name())
            .field("calibration", &self.calibration)
            .field("read", &self.read)
            .field("write", &self.write)
            .field("mode", &self.mode)
            .field("is_critical", &self.is_critical)
            .field("target_speed", &self.target_speed)
            .field("requested_speed", &self.requested_speed)
            .field("current_speed", &self.current_speed)
            .finish()
    }
}
