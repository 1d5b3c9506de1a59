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

//! Temperature to duty-cycle control.
//!
//! Each tick classifies the current temperature into a zone and nudges the
//! controller's live duty cycle:
//!
//! | zone       | range                               | rule                                   |
//! |------------|-------------------------------------|----------------------------------------|
//! | critical   | `t > max`                           | 255, then the ladder below still runs  |
//! | quiet      | `t < min * (1 + thr)`               | cap at comfort below min, -10 if not rising |
//! | comfort    | up to `min + max * thr`             | at least comfort, -5 falling / +2 rising |
//! | aggressive | above                               | at least comfort * (1 + loud), -2(1+loud) / +2(2+loud) |
//!
//! Rises are answered faster than falls in the hot zones, and the quiet zone
//! sheds speed quickly, which keeps the fan from hunting around a set point.

use serde_json::json;

use crate::config::Settings;
use crate::display::{DisplaySink, Sample};
use crate::error::{FanError, Result};
use crate::hwmon::{self, HardwareAccessor};
use crate::logger;
use crate::registry::FanUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Critical,
    Quiet,
    Comfort,
    Aggressive,
}

/// Zone used for the incremental nudge. Never `Critical`.
pub fn trend_zone(temp: i64, s: &Settings) -> Zone {
    let t = temp as f64;
    if t < s.low_temp() {
        Zone::Quiet
    } else if t < s.high_temp() {
        Zone::Comfort
    } else {
        Zone::Aggressive
    }
}

pub fn classify(temp: i64, s: &Settings) -> Zone {
    if temp > s.max_temp {
        Zone::Critical
    } else {
        trend_zone(temp, s)
    }
}

/// Unrounded target for one tick.
///
/// `level` is the duty cycle currently set on the controller and `last_temp`
/// the temperature seen on the previous tick.
pub fn compute_target(temp: i64, last_temp: i64, level: i64, s: &Settings) -> f64 {
    let comfort = s.comfort_duty as f64;
    let mut target = if temp > s.max_temp { hwmon::DUTY_MAX as f64 } else { level as f64 };

    // runs for critical temperatures too and may pull the 255 back down
    match trend_zone(temp, s) {
        Zone::Quiet => {
            if temp < s.min_temp && target > comfort {
                target = comfort;
            }
            if last_temp >= temp && target > 10.0 {
                target -= 10.0;
            }
        }
        Zone::Comfort => {
            if target < comfort {
                target = comfort;
            }
            if last_temp > temp {
                target -= 5.0;
            } else if last_temp < temp {
                target += 2.0;
            }
        }
        Zone::Aggressive | Zone::Critical => {
            if target < comfort * (1.0 + s.threshold) {
                target = comfort * (1.0 + s.loudness);
            }
            if last_temp > temp {
                target -= 2.0 * (1.0 + s.loudness);
            } else {
                target += 2.0 * (2.0 + s.loudness);
            }
        }
    }
    target
}

/// Round half up and clamp into the controller range.
pub fn finalize(target: f64) -> u8 {
    target.round().clamp(0.0, hwmon::DUTY_MAX as f64) as u8
}

/// Per-fan state plus the hardware it drives.
pub struct ControlLoop<A: HardwareAccessor> {
    hw: A,
    settings: Settings,
    units: Vec<FanUnit>,
}

impl<A: HardwareAccessor> ControlLoop<A> {
    pub fn new(hw: A, settings: Settings, units: Vec<FanUnit>) -> Self {
        ControlLoop { hw, settings, units }
    }

    pub fn units(&self) -> &[FanUnit] {
        &self.units
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn sample_err(unit: &FanUnit, path: &std::path::Path, source: std::io::Error) -> FanError {
        FanError::Sample { label: unit.label.clone(), path: path.to_path_buf(), source }
    }

    /// Sample, decide and actuate one unit. Returns what was observed and applied.
    /// `index` always comes from iterating `self.units`.
    fn tick_unit(&mut self, index: usize) -> Result<Sample> {
        let s = &self.settings;
        let hw = &self.hw;
        let unit = &mut self.units[index];

        let temp = hwmon::read_temperature(hw, &unit.temperature_source)
            .map_err(|e| Self::sample_err(unit, &unit.temperature_source, e))?;
        let level = hwmon::read_duty(hw, &unit.control_sink)
            .map_err(|e| Self::sample_err(unit, &unit.control_sink, e))?;

        if temp > s.max_temp {
            logger::log_event("temp_max", json!({ "label": unit.label, "temp": temp }));
            if s.silent {
                logger::console(&format!("Max {} temperature : {}°", unit.label, temp));
            }
        }

        let target = finalize(compute_target(temp, unit.last_temperature, level, s));

        if trend_zone(temp, s) == Zone::Aggressive && (unit.last_temperature as f64) < s.high_temp() {
            logger::log_event("temp_high", json!({ "label": unit.label, "temp": temp, "target": target }));
            if s.silent {
                logger::console(&format!("High {} temperature : {}° / {}", unit.label, temp, target));
            }
        }

        let applied = if target as i64 != level && !s.dry_run {
            hw.write(&unit.control_sink, &target.to_string())
                .map_err(|e| Self::sample_err(unit, &unit.control_sink, e))?;
            logger::log_event(
                "pwm_write",
                json!({ "controller": unit.id, "from": level, "to": target, "temp": temp }),
            );
            target
        } else {
            level.clamp(0, hwmon::DUTY_MAX as i64) as u8
        };

        unit.last_temperature = temp;
        unit.last_duty = applied;

        Ok(Sample {
            index,
            label: unit.label.clone(),
            temperature: temp,
            duty: applied,
        })
    }

    /// One pass over every unit, in discovery order.
    ///
    /// Stops at the first failing unit; units after it are not sampled this tick.
    pub fn tick(&mut self, sink: &mut dyn DisplaySink) -> Result<()> {
        for index in 0..self.units.len() {
            let sample = self.tick_unit(index)?;
            sink.offer(&sample);
        }
        Ok(())
    }

    /// Hand every fan back to the firmware.
    ///
    /// Units last seen below the maximal temperature are parked at the comfort
    /// duty first; hotter ones keep their current speed.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.settings.dry_run {
            return Ok(());
        }
        let comfort = self.settings.comfort_duty.to_string();
        for unit in &self.units {
            if unit.last_temperature < self.settings.max_temp {
                self.hw
                    .write(&unit.control_sink, &comfort)
                    .map_err(|source| FanError::Reset { path: unit.control_sink.clone(), source })?;
            }
            let enable = unit.enable_path();
            self.hw
                .write(&enable, hwmon::AUTOMATIC_MODE)
                .map_err(|source| FanError::Reset { path: enable.clone(), source })?;
            logger::log_event("reset", json!({ "controller": unit.id, "last_temp": unit.last_temperature }));
        }
        Ok(())
    }
}
