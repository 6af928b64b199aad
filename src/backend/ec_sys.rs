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

//! EC register access through the `ec_sys` debugfs file
//!
//! The file is a 256 byte window onto the EC register space: the byte at
//! offset N is register N. Words are two consecutive registers, low byte
//! first.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::constants::paths;
use crate::error::{EcFanError, Result};

pub struct EcSys {
    path: PathBuf,
    file: Mutex<File>,
}

impl EcSys {
    /// Open the default debugfs register file
    pub fn open() -> Result<Self> {
        Self::open_path(paths::EC_SYS_IO)
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| EcFanError::DeviceOpen { path: path.clone(), source })?;

        info!(path = %path.display(), "Opened EC register file");
        Ok(Self { path, file: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_at(&self, register: u8, buf: &mut [u8]) -> Result<()> {
        let file = self.file.lock();
        file.read_exact_at(buf, u64::from(register))
            .map_err(|source| EcFanError::Register { register, source })
    }

    fn write_at(&self, register: u8, buf: &[u8]) -> Result<()> {
        let file = self.file.lock();
        file.write_all_at(buf, u64::from(register))
            .map_err(|source| EcFanError::Register { register, source })
    }

    pub fn read_byte(&self, register: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_at(register, &mut buf)?;
        debug!(register, value = buf[0], "EC read byte");
        Ok(buf[0])
    }

    pub fn read_word(&self, register: u8) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_at(register, &mut buf)?;
        let value = u16::from_le_bytes(buf);
        debug!(register, value, "EC read word");
        Ok(value)
    }

    pub fn write_byte(&self, register: u8, value: u8) -> Result<()> {
        debug!(register, value, "EC write byte");
        self.write_at(register, &[value])
    }

    pub fn write_word(&self, register: u8, value: u16) -> Result<()> {
        debug!(register, value, "EC write word");
        self.write_at(register, &value.to_le_bytes())
    }
}
