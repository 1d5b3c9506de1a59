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

//! Tick scheduling and the headless (silent) loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use ratatui::backend::Backend;
use ratatui::Terminal;

use crate::control::ControlLoop;
use crate::display::{ChartState, DisplaySink};
use crate::error::Result;
use crate::events::handle_key_event;
use crate::hwmon::HardwareAccessor;
use crate::ui::ui;

const POLL_SLICE: Duration = Duration::from_millis(50);
/// Longest the interactive loop blocks on input before rechecking the stop flag.
const INPUT_SLICE: Duration = Duration::from_millis(250);

/// Fixed-delay scheduler: the next tick is due one interval after the
/// previous tick *finished*, so a slow tick never overlaps the next one.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    /// The first tick is due immediately.
    pub fn new(interval: Duration) -> Self {
        Ticker { interval, next: Instant::now() }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Call once the tick has completed.
    pub fn reschedule(&mut self, finished_at: Instant) {
        self.next = finished_at + self.interval;
    }
}

/// Tick until `stop` is raised. The flag is checked between ticks only.
pub fn run_silent<A: HardwareAccessor>(
    lp: &mut ControlLoop<A>,
    sink: &mut dyn DisplaySink,
    stop: &AtomicBool,
) -> Result<()> {
    let mut ticker = Ticker::new(lp.settings().interval);
    while !stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        if !ticker.is_due(now) {
            thread::sleep(ticker.remaining(now).min(POLL_SLICE));
            continue;
        }
        lp.tick(sink)?;
        ticker.reschedule(Instant::now());
    }
    Ok(())
}

fn status_line<A: HardwareAccessor>(lp: &ControlLoop<A>) -> String {
    let mode = if lp.settings().dry_run { "dry run" } else { "manual control" };
    format!("{} fan(s)  |  {}", lp.units().len(), mode)
}

/// Interactive loop: tick on schedule, redraw, and return on a quit key or
/// when `stop` is raised by a signal.
pub fn run_app<A: HardwareAccessor, B: Backend>(
    terminal: &mut Terminal<B>,
    lp: &mut ControlLoop<A>,
    stop: &AtomicBool,
) -> anyhow::Result<()> {
    let labels: Vec<String> = lp.units().iter().map(|u| u.label.clone()).collect();
    let mut chart = ChartState::new(&labels, lp.settings());
    let status = status_line(lp);
    let mut ticker = Ticker::new(lp.settings().interval);

    loop {
        if stop.load(Ordering::SeqCst) {
            return Ok(());
        }

        if ticker.is_due(Instant::now()) {
            lp.tick(&mut chart)?;
            ticker.reschedule(Instant::now());
        }

        terminal.draw(|f| ui(f, &chart, &status))?;

        let timeout = ticker.remaining(Instant::now()).min(INPUT_SLICE);
        if event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                if handle_key_event(key_event) {
                    return Ok(());
                }
            }
        }
    }
}
