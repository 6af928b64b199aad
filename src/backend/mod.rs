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

//! Hardware access backends
//!
//! A [`Backend`] is the single shared handle every fan talks to. It exposes raw
//! EC register access and ACPI method invocation; which of the two a fan uses
//! is decided by the fan's configuration (see [`crate::channel`]).
//!
//! Implementations serialize their own access to the hardware, so one backend
//! can be shared between all fans of a machine behind an `Arc`.

mod acpi_call;
mod ec_sys;

pub use acpi_call::{AcpiCall, ARG_PLACEHOLDER};
pub use ec_sys::EcSys;

use tracing::{info, warn};

use crate::error::{EcFanError, Result};

/// Register and ACPI access required by the fan core
#[cfg_attr(test, mockall::automock)]
pub trait Backend: Send + Sync {
    fn read_byte(&self, register: u8) -> Result<u8>;
    fn read_word(&self, register: u8) -> Result<u16>;
    fn write_byte(&self, register: u8, value: u8) -> Result<()>;
    fn write_word(&self, register: u8, value: u16) -> Result<()>;
    /// Call an ACPI method without arguments
    fn call_acpi_method(&self, method: &str) -> Result<u64>;
    /// Call an ACPI method with a single integer argument
    fn call_acpi_method_with_arg(&self, method: &str, arg: u64) -> Result<u64>;
}

/// Backend for the running machine: `ec_sys` registers plus `acpi_call`
///
/// Either half may be missing; calls to a missing half fail with
/// [`EcFanError::Unavailable`].
pub struct HostBackend {
    ec: Option<EcSys>,
    acpi: Option<AcpiCall>,
}

impl HostBackend {
    pub fn new(ec: Option<EcSys>, acpi: Option<AcpiCall>) -> Self {
        Self { ec, acpi }
    }

    /// Open whatever host interfaces are present at their default paths
    pub fn open() -> Result<Self> {
        let ec = match EcSys::open() {
            Ok(ec) => Some(ec),
            Err(e) => {
                warn!(error = %e, "EC register access unavailable");
                None
            }
        };
        let acpi = match AcpiCall::open() {
            Ok(acpi) => Some(acpi),
            Err(e) => {
                warn!(error = %e, "ACPI method calls unavailable");
                None
            }
        };

        if ec.is_none() && acpi.is_none() {
            return Err(EcFanError::Unavailable("neither ec_sys nor acpi_call is loaded"));
        }

        info!(ec = ec.is_some(), acpi = acpi.is_some(), "Host backend opened");
        Ok(Self::new(ec, acpi))
    }

    fn ec(&self) -> Result<&EcSys> {
        self.ec.as_ref().ok_or(EcFanError::Unavailable("ec_sys"))
    }

    fn acpi(&self) -> Result<&AcpiCall> {
        self.acpi.as_ref().ok_or(EcFanError::Unavailable("acpi_call"))
    }
}

impl Backend for HostBackend {
    fn read_byte(&self, register: u8) -> Result<u8> {
        self.ec()?.read_byte(register)
    }

    fn read_word(&self, register: u8) -> Result<u16> {
        self.ec()?.read_word(register)
    }

    fn write_byte(&self, register: u8, value: u8) -> Result<()> {
        self.ec()?.write_byte(register, value)
    }

    fn write_word(&self, register: u8, value: u16) -> Result<()> {
        self.ec()?.write_word(register, value)
    }

    fn call_acpi_method(&self, method: &str) -> Result<u64> {
        self.acpi()?.call(method, None)
    }

    fn call_acpi_method_with_arg(&self, method: &str, arg: u64) -> Result<u64> {
        self.acpi()?.call(method, Some(arg))
    }
}
