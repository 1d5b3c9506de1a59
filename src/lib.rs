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

//! Hwfan - adaptive fan controller for Linux hwmon
//!
//! Discovers PWM controllers paired with a temperature input, then nudges
//! their duty cycle every few seconds according to a zoned heuristic.

pub mod hwmon;
pub mod error;
pub mod config;
pub mod cli;
pub mod registry;
pub mod control;
pub mod display;
pub mod service;
pub mod events;
pub mod ui;
pub mod logger;

#[cfg(test)]
pub mod test_utils;
