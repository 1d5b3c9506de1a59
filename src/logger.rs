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

//! JSON-lines event log plus plain console lines for silent mode.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serde_json::{json, Value};

lazy_static! {
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Open `path` in append mode and route every later [`log_event`] to it.
pub fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let f = OpenOptions::new().create(true).append(true).open(path)?;
    match LOG_FILE.lock() {
        Ok(mut guard) => *guard = Some(f),
        Err(poisoned) => *poisoned.into_inner() = Some(f),
    }
    Ok(())
}

pub fn is_enabled() -> bool {
    LOG_FILE.lock().map(|g| g.is_some()).unwrap_or(false)
}

pub fn format_event(event: &str, data: Value) -> String {
    json!({
        "ts_ms": now_millis(),
        "event": event,
        "data": data,
    })
    .to_string()
}

/// Append one event line. A no-op until [`init_logging`] succeeded.
pub fn log_event(event: &str, data: Value) {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(f) = guard.as_mut() {
            let _ = writeln!(f, "{}", format_event(event, data));
        }
    }
}

/// Human readable line on stderr, prefixed with a unix timestamp.
pub fn console(msg: &str) {
    let secs = now_millis() / 1000;
    eprintln!("[{}]\t{}", secs, msg);
}
