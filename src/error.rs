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

//! Unified error handling for ecfan
//!
//! A single error type is shared by the configuration, threshold, backend and
//! fan layers. Backend failures carry only enough context to tell which
//! register or ACPI method failed.

use std::io;
use std::path::PathBuf;

/// Result type alias using EcFanError
pub type Result<T> = std::result::Result<T, EcFanError>;

/// Unified error type for all ecfan operations
#[derive(thiserror::Error, Debug)]
pub enum EcFanError {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Input Errors
    // ============================================================================
    /// The requested speed was clamped into [0, 100] and applied anyway.
    #[error("Requested fan speed {requested}% is outside 0-100%")]
    SpeedOutOfRange {
        requested: f32,
    },

    // ============================================================================
    // Backend Errors
    // ============================================================================
    #[error("Failed to open {path}: {source}")]
    DeviceOpen {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Backend not available: {0}")]
    Unavailable(&'static str),

    #[error("EC register 0x{register:02x}: {source}")]
    Register {
        register: u8,
        source: io::Error,
    },

    #[error("ACPI call {method} failed: {reason}")]
    AcpiCall {
        method: String,
        reason: String,
    },

    #[error("Raw value {value} does not fit a byte register (0x{register:02x})")]
    RawValueTooWide {
        register: u8,
        value: u16,
    },

    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        source: Box<EcFanError>,
    },
}

impl EcFanError {
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an ACPI call error
    pub fn acpi(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AcpiCall {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Wrap this error with the name of the operation that failed
    pub fn context(self, context: &'static str) -> Self {
        Self::Context {
            context,
            source: Box::new(self),
        }
    }

    /// True for the configuration error kinds
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::InvalidConfig { .. })
    }
}
