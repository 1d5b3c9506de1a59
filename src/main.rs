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

use std::io::stdout;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde_json::json;

use hwfan::cli::Args;
use hwfan::config::{self, Settings};
use hwfan::control::ControlLoop;
use hwfan::display::LogSink;
use hwfan::error::{exit_code, FanError};
use hwfan::hwmon::SysfsAccessor;
use hwfan::registry;
use hwfan::service::{run_app, run_silent};
use hwfan::logger;

fn fail(err: &FanError) -> ! {
    eprintln!("error: {}", err);
    if let Some(hint) = err.hint() {
        eprintln!("{}", hint);
    }
    logger::log_event("fatal_error", json!({ "error": err.to_string(), "code": err.exit_code() }));
    std::process::exit(err.exit_code());
}

fn resolve_settings(args: &Args) -> Result<Settings, FanError> {
    let profile = match &args.config {
        Some(path) => config::load_options(path)?,
        None => config::load_saved_options().unwrap_or_default(),
    };
    Settings::resolve_checked(args.options().over(profile))
}

fn print_inventory(settings: &Settings) -> Result<(), FanError> {
    for dev in registry::inventory(&SysfsAccessor, &settings.root)? {
        println!("\n## {} :", dev.dir.display());
        for (name, value) in &dev.endpoints {
            println!("  - {} = {}", name, value.as_deref().unwrap_or("<unreadable>"));
        }
    }
    println!("\n---\n");
    let probe = Settings { dry_run: true, ..settings.clone() };
    for unit in registry::discover(&SysfsAccessor, &probe)? {
        println!("Device : {}", unit.name);
        println!("Fan : {}", unit.label);
        println!("Controller : {}", unit.control_sink.display());
        println!("Temperature : {}", unit.temperature_source.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log {
        if let Err(e) = logger::init_logging(path) {
            eprintln!("warning: cannot open log file {}: {}", path.display(), e);
        }
    }

    let settings = match resolve_settings(&args) {
        Ok(s) => s,
        Err(e) => fail(&e),
    };
    logger::log_event("startup", json!({
        "root": settings.root.display().to_string(),
        "max": settings.max_temp,
        "min": settings.min_temp,
        "comfort": settings.comfort_duty,
        "threshold": settings.threshold,
        "loudness": settings.loudness,
        "dry": settings.dry_run,
        "silent": settings.silent,
    }));

    if args.debug {
        if let Err(e) = print_inventory(&settings) {
            fail(&e);
        }
        return Ok(());
    }

    if !settings.dry_run && unsafe { libc::geteuid() } != 0 {
        eprintln!("warning: not running as root, switching fans to manual mode will likely fail");
    }

    println!("Looking for sensors");
    let units = match registry::discover(&SysfsAccessor, &settings) {
        Ok(u) => u,
        Err(e) => fail(&e),
    };
    for unit in &units {
        println!("Found fan {} -> {}", unit.name, unit.label);
    }

    let stop = install_stop_handler();
    let mut lp = ControlLoop::new(SysfsAccessor, settings.clone(), units);
    let run_result = if settings.silent {
        run_silent(&mut lp, &mut LogSink, &stop).map_err(anyhow::Error::from)
    } else {
        run_interactive(&mut lp, &stop)
    };

    // hand control back even when the loop died on a sampling error
    let reset_result = lp.shutdown();

    if let Err(err) = reset_result {
        if let Err(run_err) = &run_result {
            eprintln!("error: {:#}", run_err);
        }
        fail(&err);
    }
    if let Err(err) = run_result {
        match err.downcast_ref::<FanError>() {
            Some(fan_err) => fail(fan_err),
            None => {
                eprintln!("error: {:#}", err);
                logger::log_event("fatal_error", json!({ "error": err.to_string() }));
                std::process::exit(exit_code::TERMINAL);
            }
        }
    }
    Ok(())
}

/// SIGINT, SIGTERM and SIGHUP raise the returned flag; both loops return on it
/// so the reset still runs.
fn install_stop_handler() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    }) {
        eprintln!("warning: failed to set signal handler: {}", e);
    }
    stop
}

fn run_interactive(lp: &mut ControlLoop<SysfsAccessor>, stop: &AtomicBool) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, lp, stop);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}
