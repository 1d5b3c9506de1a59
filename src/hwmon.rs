/*
 * This file is part of Hwfan.
 *
 * Copyright (C) 2025 Hwfan contributors
 *
 * Hwfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Hwfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Hwfan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Thin synchronous access to hwmon endpoints.
//!
//! Every read and write the controller performs goes through
//! [`HardwareAccessor`], so discovery and the control loop can run against a
//! temporary directory or a mock instead of `/sys/class/hwmon`.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Value written to `pwmN_enable` to take over the fan from the firmware.
pub const MANUAL_MODE: &str = "1";
/// Value written to `pwmN_enable` to hand the fan back to the firmware.
pub const AUTOMATIC_MODE: &str = "2";

/// Highest duty cycle a PWM controller accepts.
pub const DUTY_MAX: u8 = 255;

/// Number of `pwmN` slots probed per hwmon directory (1..=5).
pub const MAX_FAN_SLOTS: usize = 5;

#[cfg_attr(test, mockall::automock)]
pub trait HardwareAccessor {
    /// Read an endpoint and return its contents with surrounding whitespace removed.
    fn read(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, value: &str) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    /// Immediate entries of a directory, sorted by path.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// The real accessor, backed by the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysfsAccessor;

impl HardwareAccessor for SysfsAccessor {
    fn read(&self, path: &Path) -> io::Result<String> {
        read_trimmed(path)
    }

    fn write(&self, path: &Path, value: &str) -> io::Result<()> {
        fs::write(path, value)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut out: Vec<PathBuf> = fs::read_dir(path)?
            .flatten()
            .map(|ent| ent.path())
            .collect();
        // read_dir order is filesystem dependent
        out.sort();
        Ok(out)
    }
}

fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn name_path(dir: &Path) -> PathBuf {
    dir.join("name")
}

pub fn pwm_path(dir: &Path, idx: usize) -> PathBuf {
    dir.join(format!("pwm{}", idx))
}

/// Enable endpoint paired with a `pwmN` controller (`pwmN_enable`).
pub fn enable_path_for(controller: &Path) -> PathBuf {
    let mut s = controller.as_os_str().to_os_string();
    s.push("_enable");
    PathBuf::from(s)
}

pub fn temp_input_path(dir: &Path, idx: usize) -> PathBuf {
    dir.join(format!("temp{}_input", idx))
}

pub fn fan_label_path(dir: &Path, idx: usize) -> PathBuf {
    dir.join(format!("fan{}_label", idx))
}

fn parse_int(path: &Path, raw: &str) -> io::Result<i64> {
    raw.parse::<i64>().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{}: expected an integer, got '{}'", path.display(), raw),
        )
    })
}

/// Read a `tempN_input` endpoint (millidegrees) as whole degrees Celsius.
pub fn read_temperature<A: HardwareAccessor + ?Sized>(hw: &A, path: &Path) -> io::Result<i64> {
    let raw = hw.read(path)?;
    let millis = parse_int(path, &raw)?;
    Ok((millis as f64 / 1000.0).round() as i64)
}

/// Read the current duty cycle of a `pwmN` controller.
pub fn read_duty<A: HardwareAccessor + ?Sized>(hw: &A, path: &Path) -> io::Result<i64> {
    let raw = hw.read(path)?;
    parse_int(path, &raw)
}
