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

//! Model and fan configuration types
//!
//! Field names serialize in PascalCase to stay compatible with existing
//! notebook fan configuration files. Nothing here reads files; callers
//! deserialize however they like and then call [`ModelConfig::validate`].

use serde::{Deserialize, Serialize};

use crate::constants::{register, speed};
use crate::error::{EcFanError, Result};
use crate::threshold::validate_thresholds;

/// Which conversion direction an override applies to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetOperation {
    Read,
    Write,
    #[default]
    ReadWrite,
}

impl TargetOperation {
    pub fn applies_to_read(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn applies_to_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// A raw value that does not follow the linear percentage formula
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SpeedOverride {
    pub fan_speed_percentage: f32,
    pub fan_speed_value: u16,
    #[serde(default)]
    pub target_operation: TargetOperation,
}

/// One temperature band and the fan speed used inside it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemperatureThreshold {
    pub up_threshold: f32,
    pub down_threshold: f32,
    pub fan_speed: f32,
}

impl TemperatureThreshold {
    pub fn new(up_threshold: f32, down_threshold: f32, fan_speed: f32) -> Self {
        Self { up_threshold, down_threshold, fan_speed }
    }
}

/// Per-fan EC configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FanConfig {
    #[serde(default)]
    pub fan_display_name: Option<String>,
    #[serde(default)]
    pub read_register: Option<u8>,
    #[serde(default)]
    pub write_register: Option<u8>,
    pub min_speed_value: u16,
    pub max_speed_value: u16,
    #[serde(default)]
    pub independent_read_min_max_values: bool,
    #[serde(default)]
    pub min_speed_value_read: u16,
    #[serde(default)]
    pub max_speed_value_read: u16,
    #[serde(default)]
    pub reset_required: bool,
    #[serde(default)]
    pub fan_speed_reset_value: u16,
    #[serde(default)]
    pub temperature_thresholds: Vec<TemperatureThreshold>,
    #[serde(default)]
    pub fan_speed_percentage_overrides: Vec<SpeedOverride>,
    #[serde(default)]
    pub read_acpi_method: Option<String>,
    #[serde(default)]
    pub write_acpi_method: Option<String>,
    #[serde(default)]
    pub reset_acpi_method: Option<String>,
}

impl FanConfig {
    /// Read range as (min, max); the write range unless configured independently
    pub fn read_range(&self) -> (u16, u16) {
        if self.independent_read_min_max_values {
            (self.min_speed_value_read, self.max_speed_value_read)
        } else {
            (self.min_speed_value, self.max_speed_value)
        }
    }

    /// Write range as (min, max)
    pub fn write_range(&self) -> (u16, u16) {
        (self.min_speed_value, self.max_speed_value)
    }

    /// Validate this fan against the register width of its model
    pub fn validate(&self, read_write_words: bool) -> Result<()> {
        check_method("ReadAcpiMethod", self.read_acpi_method.as_deref())?;
        check_method("WriteAcpiMethod", self.write_acpi_method.as_deref())?;
        check_method("ResetAcpiMethod", self.reset_acpi_method.as_deref())?;

        if self.read_acpi_method.is_none() && self.read_register.is_none() {
            return Err(EcFanError::invalid_config(
                "ReadRegister",
                "either ReadRegister or ReadAcpiMethod is required",
            ));
        }
        if self.write_acpi_method.is_none() && self.write_register.is_none() {
            return Err(EcFanError::invalid_config(
                "WriteRegister",
                "either WriteRegister or WriteAcpiMethod is required",
            ));
        }

        let (min_read, max_read) = self.read_range();
        if min_read == max_read {
            let field = if self.independent_read_min_max_values {
                "MaxSpeedValueRead"
            } else {
                "MaxSpeedValue"
            };
            return Err(EcFanError::invalid_config(field, "read range must not be empty"));
        }

        if !read_write_words {
            if self.read_acpi_method.is_none() {
                check_byte("MinSpeedValueRead", min_read)?;
                check_byte("MaxSpeedValueRead", max_read)?;
            }
            if self.write_acpi_method.is_none() {
                check_byte("MinSpeedValue", self.min_speed_value)?;
                check_byte("MaxSpeedValue", self.max_speed_value)?;
                if self.reset_required && self.reset_acpi_method.is_none() {
                    check_byte("FanSpeedResetValue", self.fan_speed_reset_value)?;
                }
                for o in &self.fan_speed_percentage_overrides {
                    if o.target_operation.applies_to_write() {
                        check_byte("FanSpeedPercentageOverrides", o.fan_speed_value)?;
                    }
                }
            }
        }

        for o in &self.fan_speed_percentage_overrides {
            let p = o.fan_speed_percentage;
            if !p.is_finite() || !(speed::MIN_PERCENT..=speed::MAX_PERCENT).contains(&p) {
                return Err(EcFanError::invalid_config(
                    "FanSpeedPercentageOverrides",
                    format!("percentage {} out of range", p),
                ));
            }
        }

        validate_thresholds(&self.temperature_thresholds)
    }
}

fn check_method(field: &str, method: Option<&str>) -> Result<()> {
    match method {
        Some(m) if m.trim().is_empty() => {
            Err(EcFanError::invalid_config(field, "method name is empty"))
        }
        _ => Ok(()),
    }
}

fn check_byte(field: &str, value: u16) -> Result<()> {
    if value > register::BYTE_MAX {
        return Err(EcFanError::invalid_config(
            field,
            format!("{} does not fit a byte register", value),
        ));
    }
    Ok(())
}

/// Per-notebook configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelConfig {
    #[serde(default)]
    pub notebook_model: String,
    #[serde(default = "default_poll_interval")]
    pub ec_poll_interval: u64,
    #[serde(default)]
    pub read_write_words: bool,
    #[serde(default = "default_critical_temperature")]
    pub critical_temperature: f32,
    #[serde(default = "default_critical_offset")]
    pub critical_temperature_offset: f32,
    #[serde(default)]
    pub fan_configurations: Vec<FanConfig>,
}

fn default_poll_interval() -> u64 { 3000 }
fn default_critical_temperature() -> f32 { 75.0 }
fn default_critical_offset() -> f32 { 15.0 }

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.critical_temperature.is_finite() {
            return Err(EcFanError::invalid_config("CriticalTemperature", "must be finite"));
        }
        if !self.critical_temperature_offset.is_finite() || self.critical_temperature_offset < 0.0 {
            return Err(EcFanError::invalid_config(
                "CriticalTemperatureOffset",
                "must be a non-negative number",
            ));
        }
        if self.ec_poll_interval == 0 {
            return Err(EcFanError::invalid_config("EcPollInterval", "must be > 0"));
        }
        if self.fan_configurations.is_empty() {
            return Err(EcFanError::config("at least one fan configuration required"));
        }
        for (i, fan) in self.fan_configurations.iter().enumerate() {
            fan.validate(self.read_write_words).map_err(|e| match e {
                EcFanError::InvalidConfig { field, reason } => EcFanError::InvalidConfig {
                    field: format!("FanConfigurations[{}].{}", i, field),
                    reason,
                },
                other => other,
            })?;
        }
        Ok(())
    }
}
