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

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FanError>;

/// Process exit codes. Each fatal error class gets its own code.
pub mod exit_code {
    pub const OK: i32 = 0;
    pub const ROOT_UNREADABLE: i32 = 1;
    pub const MANUAL_MODE: i32 = 2;
    pub const NO_HARDWARE: i32 = 3;
    pub const RESET: i32 = 4;
    pub const SAMPLE: i32 = 5;
    pub const CONFIG: i32 = 6;
    /// Terminal setup or drawing failed.
    pub const TERMINAL: i32 = 7;
}

#[derive(Error, Debug)]
pub enum FanError {
    #[error("unable to scan hardware monitors folder {path}: {source}")]
    RootUnreadable { path: PathBuf, source: io::Error },

    #[error("unable to enable manual fan mode on {path}: {source}")]
    ManualMode { path: PathBuf, source: io::Error },

    #[error("unable to find any fan device under {0}")]
    NoHardware(PathBuf),

    #[error("failed to sample fan {label} ({path}): {source}")]
    Sample { label: String, path: PathBuf, source: io::Error },

    #[error("failed to hand fan control back on {path}: {source}")]
    Reset { path: PathBuf, source: io::Error },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FanError {
    pub fn exit_code(&self) -> i32 {
        match self {
            FanError::RootUnreadable { .. } => exit_code::ROOT_UNREADABLE,
            FanError::ManualMode { .. } => exit_code::MANUAL_MODE,
            FanError::NoHardware(_) => exit_code::NO_HARDWARE,
            FanError::Reset { .. } => exit_code::RESET,
            FanError::Sample { .. } => exit_code::SAMPLE,
            FanError::Config(_) => exit_code::CONFIG,
        }
    }

    /// Operator hint printed under the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FanError::RootUnreadable { .. } => Some("This tool needs a Linux hwmon tree (lm-sensors)"),
            FanError::ManualMode { .. } | FanError::Reset { .. } => Some("Try to run with sudo"),
            FanError::NoHardware(_) => Some("Try to run sensors-detect"),
            FanError::Sample { .. } | FanError::Config(_) => None,
        }
    }
}
