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

//! Command line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::config::Options;

/// Adaptive fan controller for Linux hwmon.
///
/// Drives every PWM fan that has a matching temperature input, aiming for
/// silence in cool conditions and fast reaction when things heat up.
#[derive(Parser, Debug, Default)]
#[command(name = "hwfan")]
#[command(version)]
pub struct Args {
    /// Sets the maximal temperature
    #[arg(short = 'm', long)]
    pub max: Option<i64>,

    /// Sets the minimal temperature (defaults to 60% of max)
    #[arg(short = 'n', long)]
    pub min: Option<i64>,

    /// Sets the fan less noise level (0 to 255)
    #[arg(short = 'f', long)]
    pub fan: Option<i64>,

    /// Sets a threshold for more aggressive mode (0 to 0.5)
    #[arg(short = 't', long)]
    pub threshold: Option<f64>,

    /// Sets an efficiency coefficient (-1 to 1: decrease if the fan is too noisy)
    #[arg(short = 'e', long, allow_negative_numbers = true)]
    pub efficiency: Option<f64>,

    /// Sets the hwmon path
    #[arg(short = 'H', long)]
    pub hwmon: Option<PathBuf>,

    /// Sampling interval in seconds
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Enables the silent mode (no chart, log lines instead)
    #[arg(short = 's', long)]
    pub silent: bool,

    /// Outputs the hwmon inventory and the resolved fans, then exits
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Read only dry mode
    #[arg(short = 'r', long)]
    pub dry: bool,

    /// JSON profile with default options
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Append JSON event lines to this file
    #[arg(short = 'l', long)]
    pub log: Option<PathBuf>,
}

impl Args {
    pub fn options(&self) -> Options {
        Options {
            hwmon: self.hwmon.clone(),
            max: self.max,
            min: self.min,
            fan: self.fan,
            threshold: self.threshold,
            efficiency: self.efficiency,
            interval_secs: self.interval,
            silent: self.silent,
            dry: self.dry,
        }
    }
}
