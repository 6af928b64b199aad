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

//! ACPI method invocation through the `acpi_call` kernel module
//!
//! A call is a write of `"<method> [args]"` to the proc file followed by a
//! read of the reply. A method taking an argument may be a template: the
//! argument replaces every [`ARG_PLACEHOLDER`] in it, and is appended only
//! when the template has none. The module keeps one reply buffer, so a call holds the
//! lock across both halves.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::constants::paths;
use crate::error::{EcFanError, Result};

pub struct AcpiCall {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AcpiCall {
    pub fn open() -> Result<Self> {
        Self::open_path(paths::ACPI_CALL)
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        fs::metadata(&path).map_err(|source| EcFanError::DeviceOpen { path: path.clone(), source })?;

        info!(path = %path.display(), "Using acpi_call interface");
        Ok(Self { path, lock: Mutex::new(()) })
    }

    /// Invoke `method`, optionally with one integer argument
    pub fn call(&self, method: &str, arg: Option<u64>) -> Result<u64> {
        let command = format_command(method, arg);

        let _guard = self.lock.lock();
        fs::write(&self.path, &command).map_err(|e| EcFanError::acpi(method, e.to_string()))?;
        let reply = fs::read(&self.path).map_err(|e| EcFanError::acpi(method, e.to_string()))?;

        let value = parse_reply(method, &String::from_utf8_lossy(&reply))?;
        debug!(command = %command, value, "ACPI call");
        Ok(value)
    }
}

/// Marks where a method template takes its argument
pub const ARG_PLACEHOLDER: &str = "{0}";

fn format_command(method: &str, arg: Option<u64>) -> String {
    match arg {
        Some(arg) if method.contains(ARG_PLACEHOLDER) => {
            method.replace(ARG_PLACEHOLDER, &format!("0x{:x}", arg))
        }
        Some(arg) => format!("{} 0x{:x}", method, arg),
        None => method.to_string(),
    }
}

fn parse_reply(method: &str, reply: &str) -> Result<u64> {
    let reply = reply.trim_end_matches(|c: char| c == '\0' || c.is_whitespace()).trim_start();

    if reply.is_empty() || reply == "not called" {
        return Err(EcFanError::acpi(method, "no reply"));
    }
    if reply.starts_with("Error:") {
        return Err(EcFanError::acpi(method, reply));
    }

    let parsed = match reply.strip_prefix("0x").or_else(|| reply.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => reply.parse::<u64>().ok(),
    };
    parsed.ok_or_else(|| EcFanError::acpi(method, format!("non-integer reply '{}'", reply)))
}
