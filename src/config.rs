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

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FanError, Result};

pub const DEFAULT_HWMON_ROOT: &str = "/sys/class/hwmon";
pub const DEFAULT_MAX_TEMP: i64 = 87;
pub const DEFAULT_MIN_RATIO: f64 = 0.6;
pub const DEFAULT_COMFORT_DUTY: i64 = 120;
pub const DEFAULT_THRESHOLD: f64 = 0.2;
pub const DEFAULT_LOUDNESS: f64 = 0.2;
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Unresolved options, as they come from the command line or a profile file.
///
/// Every field is optional; `None`, zero and out-of-range values fall back to
/// the defaults during [`Settings::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    #[serde(default)]
    pub hwmon: Option<PathBuf>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub fan: Option<i64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub efficiency: Option<f64>,
    #[serde(default)]
    pub interval_secs: Option<u64>,
    #[serde(default)]
    pub silent: bool,
    #[serde(default)]
    pub dry: bool,
}

impl Options {
    /// Layer `self` over `base`: values set here win, flags are OR-ed.
    pub fn over(self, base: Options) -> Options {
        Options {
            hwmon: self.hwmon.or(base.hwmon),
            max: self.max.or(base.max),
            min: self.min.or(base.min),
            fan: self.fan.or(base.fan),
            threshold: self.threshold.or(base.threshold),
            efficiency: self.efficiency.or(base.efficiency),
            interval_secs: self.interval_secs.or(base.interval_secs),
            silent: self.silent || base.silent,
            dry: self.dry || base.dry,
        }
    }
}

/// Resolved controller configuration. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root: PathBuf,
    pub max_temp: i64,
    pub min_temp: i64,
    pub comfort_duty: u8,
    pub threshold: f64,
    pub loudness: f64,
    pub dry_run: bool,
    pub silent: bool,
    pub interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::resolve(Options::default())
    }
}

impl Settings {
    pub fn resolve(opts: Options) -> Settings {
        let max_temp = opts.max.filter(|m| *m > 0).unwrap_or(DEFAULT_MAX_TEMP);
        let min_temp = opts
            .min
            .filter(|m| *m > 0)
            .unwrap_or_else(|| (max_temp as f64 * DEFAULT_MIN_RATIO).round() as i64);
        let comfort = opts.fan.filter(|f| *f > 0).unwrap_or(DEFAULT_COMFORT_DUTY);
        let threshold = opts
            .threshold
            .filter(|t| *t > 0.0 && *t < 0.5)
            .unwrap_or(DEFAULT_THRESHOLD);
        let loudness = opts
            .efficiency
            .filter(|e| *e != 0.0 && !e.is_nan())
            .unwrap_or(DEFAULT_LOUDNESS);
        let interval = Duration::from_secs(
            opts.interval_secs.filter(|s| *s > 0).unwrap_or(DEFAULT_INTERVAL_SECS),
        );

        Settings {
            root: opts.hwmon.unwrap_or_else(|| PathBuf::from(DEFAULT_HWMON_ROOT)),
            max_temp,
            min_temp,
            comfort_duty: comfort.clamp(0, 255) as u8,
            threshold,
            loudness,
            dry_run: opts.dry,
            silent: opts.silent,
            interval,
        }
    }

    /// Like [`Settings::resolve`], but rejects combinations the controller cannot work with.
    pub fn resolve_checked(opts: Options) -> Result<Settings> {
        if let Some(fan) = opts.fan {
            if fan > 255 {
                return Err(FanError::Config(format!("fan comfort level {} is above 255", fan)));
            }
        }
        let settings = Settings::resolve(opts);
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_temp >= self.max_temp {
            return Err(FanError::Config(format!(
                "minimal temperature {}° must be below maximal temperature {}°",
                self.min_temp, self.max_temp
            )));
        }
        Ok(())
    }

    /// Upper bound of the quiet zone: `min * (1 + threshold)`.
    pub fn low_temp(&self) -> f64 {
        self.min_temp as f64 * (1.0 + self.threshold)
    }

    /// Lower bound of the aggressive zone: `min + max * threshold`.
    pub fn high_temp(&self) -> f64 {
        self.min_temp as f64 + self.max_temp as f64 * self.threshold
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("hwfan").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("hwfan")
            .join("config.json");
    }
    PathBuf::from("/etc/hwfan/config.json")
}

pub fn load_options(path: &Path) -> Result<Options> {
    let data = fs::read_to_string(path)
        .map_err(|e| FanError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&data)
        .map_err(|e| FanError::Config(format!("cannot parse {}: {}", path.display(), e)))
}

/// Profile from the default location, if one exists and parses.
pub fn load_saved_options() -> Option<Options> {
    let path = config_path();
    let data = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}
