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

//! Per-fan access paths
//!
//! A fan reads, writes and resets through paths picked once from its
//! configuration: an ACPI method when one is configured, otherwise an EC
//! register of the model's width. ACPI failures are tagged with the name of
//! the configuration key that selected the method.

use crate::backend::Backend;
use crate::config::FanConfig;
use crate::error::{EcFanError, Result};

/// Width of EC register access for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterWidth {
    Byte,
    Word,
}

impl RegisterWidth {
    pub fn from_words_flag(read_write_words: bool) -> Self {
        if read_write_words { Self::Word } else { Self::Byte }
    }
}

/// How one direction of fan I/O reaches the hardware
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Register { register: u8, width: RegisterWidth },
    Acpi { method: String, context: &'static str },
}

impl Channel {
    pub fn for_read(cfg: &FanConfig, width: RegisterWidth) -> Result<Self> {
        Self::select(
            cfg.read_acpi_method.as_deref(),
            cfg.read_register,
            width,
            "ReadAcpiMethod",
            "ReadRegister",
        )
    }

    pub fn for_write(cfg: &FanConfig, width: RegisterWidth) -> Result<Self> {
        Self::select(
            cfg.write_acpi_method.as_deref(),
            cfg.write_register,
            width,
            "WriteAcpiMethod",
            "WriteRegister",
        )
    }

    fn select(
        method: Option<&str>,
        register: Option<u8>,
        width: RegisterWidth,
        context: &'static str,
        register_field: &'static str,
    ) -> Result<Self> {
        match (method, register) {
            (Some(method), _) => Ok(Self::Acpi { method: method.to_string(), context }),
            (None, Some(register)) => Ok(Self::Register { register, width }),
            (None, None) => Err(EcFanError::invalid_config(
                register_field,
                format!("either {} or {} is required", register_field, context),
            )),
        }
    }

    /// Read one raw value
    ///
    /// ACPI results wider than 16 bits saturate, which puts them outside any
    /// read range.
    pub fn read(&self, backend: &dyn Backend) -> Result<u16> {
        match self {
            Self::Register { register, width: RegisterWidth::Word } => backend.read_word(*register),
            Self::Register { register, width: RegisterWidth::Byte } => {
                backend.read_byte(*register).map(u16::from)
            }
            Self::Acpi { method, context } => backend
                .call_acpi_method(method)
                .map(|v| u16::try_from(v).unwrap_or(u16::MAX))
                .map_err(|e| e.context(*context)),
        }
    }

    /// Write one raw value
    pub fn write(&self, backend: &dyn Backend, value: u16) -> Result<()> {
        match self {
            Self::Register { register, width: RegisterWidth::Word } => {
                backend.write_word(*register, value)
            }
            Self::Register { register, width: RegisterWidth::Byte } => {
                let byte = u8::try_from(value)
                    .map_err(|_| EcFanError::RawValueTooWide { register: *register, value })?;
                backend.write_byte(*register, byte)
            }
            Self::Acpi { method, context } => backend
                .call_acpi_method_with_arg(method, u64::from(value))
                .map(|_| ())
                .map_err(|e| e.context(*context)),
        }
    }
}

/// What resetting a fan does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetAction {
    /// The EC needs no reset
    None,
    Acpi { method: String },
    /// Write a raw value through the fan's write channel
    WriteValue(u16),
}

impl ResetAction {
    pub fn from_config(cfg: &FanConfig) -> Self {
        if !cfg.reset_required {
            return Self::None;
        }
        match &cfg.reset_acpi_method {
            Some(method) => Self::Acpi { method: method.clone() },
            None => Self::WriteValue(cfg.fan_speed_reset_value),
        }
    }

    pub fn run(&self, backend: &dyn Backend, write: &Channel) -> Result<()> {
        match self {
            Self::None => Ok(()),
            Self::Acpi { method } => backend
                .call_acpi_method(method)
                .map(|_| ())
                .map_err(|e| e.context("ResetAcpiMethod")),
            Self::WriteValue(value) => write.write(backend, *value),
        }
    }
}
