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

//! Constants shared across ecfan modules

/// Fan speed percentages
pub mod speed {
    /// Lowest percentage a fan can be driven at
    pub const MIN_PERCENT: f32 = 0.0;

    /// Highest percentage; also the forced speed while critical
    pub const MAX_PERCENT: f32 = 100.0;

    /// Override percentages match when `|a - b| < OVERRIDE_TOLERANCE` (~0.05)
    pub const OVERRIDE_TOLERANCE: f32 = 0.06;

    /// Clamp a percentage into [MIN_PERCENT, MAX_PERCENT]; NaN maps to 0
    #[inline]
    pub fn clamp_percent(percent: f32) -> f32 {
        if percent.is_nan() {
            return MIN_PERCENT;
        }
        percent.clamp(MIN_PERCENT, MAX_PERCENT)
    }
}

/// Hardware read behaviour
pub mod read {
    /// Total read attempts while the EC returns a value outside the read range
    pub const MAX_ATTEMPTS: usize = 3;
}

/// Byte-register limits
pub mod register {
    /// Largest raw value a byte-wide register can hold
    pub const BYTE_MAX: u16 = u8::MAX as u16;
}

/// Host device paths
pub mod paths {
    /// ec_sys debugfs register file (needs `ec_sys write_support=1`)
    pub const EC_SYS_IO: &str = "/sys/kernel/debug/ec/ec0/io";

    /// acpi_call kernel module interface
    pub const ACPI_CALL: &str = "/proc/acpi/call";
}
