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

use std::collections::VecDeque;

use serde_json::json;

use crate::config::Settings;
use crate::logger;

/// What the control loop observed and applied for one unit on one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub index: usize,
    pub label: String,
    pub temperature: i64,
    pub duty: u8,
}

/// Receives one [`Sample`] per unit per tick. Must not block.
pub trait DisplaySink {
    fn offer(&mut self, sample: &Sample);
}

pub struct NullSink;

impl DisplaySink for NullSink {
    fn offer(&mut self, _sample: &Sample) {}
}

/// Silent mode: samples go to the event log only.
pub struct LogSink;

impl DisplaySink for LogSink {
    fn offer(&mut self, sample: &Sample) {
        logger::log_event(
            "sample",
            json!({ "label": sample.label, "temp": sample.temperature, "duty": sample.duty }),
        );
    }
}

/// Points kept per series, one per tick.
pub const HISTORY_LEN: usize = 61;

#[derive(Debug, Clone)]
pub struct Series {
    pub title: String,
    pub values: VecDeque<f64>,
}

impl Series {
    fn new(title: String) -> Self {
        Series { title, values: std::iter::repeat(0.0).take(HISTORY_LEN).collect() }
    }

    fn push(&mut self, v: f64) {
        self.values.pop_front();
        self.values.push_back(v);
    }

    /// `(x, y)` pairs, oldest first, x from 0 to `HISTORY_LEN - 1`.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect()
    }
}

/// Rolling history for the interactive chart: a temperature series and a
/// duty series per unit, both scaled to 0..100.
#[derive(Debug, Clone)]
pub struct ChartState {
    min_temp: i64,
    max_temp: i64,
    comfort: u8,
    low: f64,
    high: f64,
    pub series: Vec<Series>,
}

impl ChartState {
    pub fn new(labels: &[String], s: &Settings) -> Self {
        let mut series = Vec::with_capacity(labels.len() * 2);
        for label in labels {
            series.push(Series::new(format!("{} °", label)));
            series.push(Series::new(label.clone()));
        }
        ChartState {
            min_temp: s.min_temp,
            max_temp: s.max_temp,
            comfort: s.comfort_duty,
            low: s.low_temp(),
            high: s.high_temp(),
            series,
        }
    }

    pub fn title(&self) -> String {
        format!(
            "Min : {}° - Low : {}° - High : {}° - Max : {}°",
            self.min_temp,
            self.low.round(),
            self.high.round(),
            self.max_temp
        )
    }

    /// Position of `temp` inside `[min, max]`, in percent. 0 below min.
    pub fn temp_percent(&self, temp: i64) -> f64 {
        if temp < self.min_temp {
            return 0.0;
        }
        ((temp - self.min_temp) as f64 / (self.max_temp - self.min_temp) as f64 * 100.0).round()
    }

    /// Position of `duty` inside `[comfort, 255]`, in percent. 0 below comfort.
    pub fn duty_percent(&self, duty: u8) -> f64 {
        if duty < self.comfort {
            return 0.0;
        }
        if self.comfort == u8::MAX {
            return 100.0;
        }
        ((duty - self.comfort) as f64 / (u8::MAX - self.comfort) as f64 * 100.0).round()
    }
}

impl DisplaySink for ChartState {
    fn offer(&mut self, sample: &Sample) {
        let t = self.temp_percent(sample.temperature);
        let d = self.duty_percent(sample.duty);
        let speed = (sample.duty as f64 / 255.0 * 100.0).round();
        if let Some(temp_series) = self.series.get_mut(sample.index * 2) {
            temp_series.title = format!("{} : {}°", sample.label, sample.temperature);
            temp_series.push(t);
        }
        if let Some(duty_series) = self.series.get_mut(sample.index * 2 + 1) {
            duty_series.title = format!("{} : {}%", sample.label, speed);
            duty_series.push(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> ChartState {
        ChartState::new(&["CPU".to_string(), "fan2".to_string()], &Settings::default())
    }

    #[test]
    fn test_title_shows_zone_bounds() {
        assert_eq!(chart().title(), "Min : 52° - Low : 62° - High : 69° - Max : 87°");
    }

    #[test]
    fn test_initial_series() {
        let c = chart();
        assert_eq!(c.series.len(), 4);
        assert_eq!(c.series[0].title, "CPU °");
        assert_eq!(c.series[1].title, "CPU");
        assert_eq!(c.series[3].values.len(), HISTORY_LEN);
        assert!(c.series[3].values.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_percent_scaling() {
        let c = chart();
        assert_eq!(c.temp_percent(40), 0.0);
        assert_eq!(c.temp_percent(52), 0.0);
        assert_eq!(c.temp_percent(87), 100.0);
        assert_eq!(c.temp_percent(70), 51.0);
        assert_eq!(c.duty_percent(100), 0.0);
        assert_eq!(c.duty_percent(120), 0.0);
        assert_eq!(c.duty_percent(255), 100.0);
    }

    #[test]
    fn test_offer_shifts_history_and_updates_titles() {
        let mut c = chart();
        c.offer(&Sample { index: 1, label: "fan2".into(), temperature: 70, duty: 148 });

        assert_eq!(c.series[2].title, "fan2 : 70°");
        assert_eq!(c.series[3].title, "fan2 : 58%");
        assert_eq!(c.series[2].values.len(), HISTORY_LEN);
        assert_eq!(*c.series[2].values.back().unwrap(), 51.0);
        assert_eq!(*c.series[3].values.back().unwrap(), 21.0);
        // other unit untouched
        assert_eq!(c.series[0].title, "CPU °");
        let pts = c.series[2].points();
        assert_eq!(pts.last(), Some(&(60.0, 51.0)));
    }

    #[test]
    fn test_sinks_accept_samples() {
        let s = Sample { index: 0, label: "fan1".into(), temperature: 40, duty: 0 };
        NullSink.offer(&s);
        LogSink.offer(&s);
    }
}
