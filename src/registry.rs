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

//! Sensor discovery: pairs every `pwmN` controller with its `tempN_input`
//! and switches the controller to manual mode.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::config::Settings;
use crate::error::{FanError, Result};
use crate::hwmon::{self, HardwareAccessor};
use crate::logger;

/// One controllable fan: a PWM controller and the temperature input driving it.
#[derive(Debug, Clone, PartialEq)]
pub struct FanUnit {
    /// `<hwmon dir>/pwm<N>`, unique per unit.
    pub id: String,
    pub index: usize,
    pub name: String,
    pub label: String,
    pub temperature_source: PathBuf,
    pub control_sink: PathBuf,
    /// Whole degrees from the previous tick, 0 before the first one.
    pub last_temperature: i64,
    pub last_duty: u8,
}

impl FanUnit {
    pub fn enable_path(&self) -> PathBuf {
        hwmon::enable_path_for(&self.control_sink)
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// Device name from the `name` endpoint, or the directory name.
pub fn resolve_name<A: HardwareAccessor + ?Sized>(hw: &A, dir: &Path) -> String {
    hw.read(&hwmon::name_path(dir)).unwrap_or_else(|_| dir_name(dir))
}

/// Fan label from `fan<N>_label`, or `fan<N>`.
pub fn resolve_label<A: HardwareAccessor + ?Sized>(hw: &A, dir: &Path, idx: usize) -> String {
    hw.read(&hwmon::fan_label_path(dir, idx))
        .unwrap_or_else(|_| format!("fan{}", idx))
}

/// Candidate units of one hwmon directory, without touching the hardware.
fn probe_dir<A: HardwareAccessor + ?Sized>(hw: &A, dir: &Path) -> Vec<FanUnit> {
    let name = resolve_name(hw, dir);
    let mut units = Vec::new();

    for idx in 1..=hwmon::MAX_FAN_SLOTS {
        let control = hwmon::pwm_path(dir, idx);
        if !hw.exists(&control) {
            continue;
        }
        let input = hwmon::temp_input_path(dir, idx);
        if !hw.exists(&input) {
            continue;
        }
        let last_duty = hwmon::read_duty(hw, &control)
            .map(|v| v.clamp(0, hwmon::DUTY_MAX as i64) as u8)
            .unwrap_or(0);
        units.push(FanUnit {
            id: control.display().to_string(),
            index: idx,
            name: name.clone(),
            label: resolve_label(hw, dir, idx),
            temperature_source: input,
            control_sink: control,
            last_temperature: 0,
            last_duty,
        });
    }
    units
}

/// Walk `settings.root` and return every (temperature, controller) pair found.
///
/// Unless `settings.dry_run` is set, each controller is switched to manual
/// mode as it is found; the first failure aborts discovery and returns the
/// controllers switched so far to automatic mode.
pub fn discover<A: HardwareAccessor + ?Sized>(hw: &A, settings: &Settings) -> Result<Vec<FanUnit>> {
    let root = settings.root.as_path();
    let entries = hw.list_dir(root).map_err(|source| FanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut fans = Vec::new();
    for dir in entries {
        if !hw.is_dir(&dir) {
            continue;
        }
        for unit in probe_dir(hw, &dir) {
            logger::log_event(
                "fan_found",
                json!({ "name": unit.name, "label": unit.label, "controller": unit.id }),
            );
            if !settings.dry_run {
                if let Err(err) = enable_manual(hw, &unit) {
                    release_manual(hw, &fans);
                    return Err(err);
                }
            }
            fans.push(unit);
        }
    }

    if fans.is_empty() {
        return Err(FanError::NoHardware(root.to_path_buf()));
    }
    Ok(fans)
}

pub fn enable_manual<A: HardwareAccessor + ?Sized>(hw: &A, unit: &FanUnit) -> Result<()> {
    let path = unit.enable_path();
    hw.write(&path, hwmon::MANUAL_MODE)
        .map_err(|source| FanError::ManualMode { path: path.clone(), source })?;
    logger::log_event("manual_mode", json!({ "controller": unit.id }));
    Ok(())
}

/// Hand already switched controllers back to the firmware after a failed
/// discovery. Best effort: the original error is what gets reported.
fn release_manual<A: HardwareAccessor + ?Sized>(hw: &A, units: &[FanUnit]) {
    for unit in units {
        let path = unit.enable_path();
        match hw.write(&path, hwmon::AUTOMATIC_MODE) {
            Ok(()) => logger::log_event("reset", json!({ "controller": unit.id, "mode": "auto" })),
            Err(e) => logger::console(&format!("unable to restore automatic mode on {}: {}", path.display(), e)),
        }
    }
}

/// Every readable endpoint of one hwmon directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDump {
    pub dir: PathBuf,
    pub endpoints: Vec<(String, Option<String>)>,
}

/// Raw listing of the monitoring root for `--debug`. Read-only.
pub fn inventory<A: HardwareAccessor + ?Sized>(hw: &A, root: &Path) -> Result<Vec<DeviceDump>> {
    let entries = hw.list_dir(root).map_err(|source| FanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for dir in entries {
        if !hw.is_dir(&dir) {
            continue;
        }
        // a subdirectory that vanished or is unreadable still shows up, empty
        let files = hw.list_dir(&dir).unwrap_or_default();
        let endpoints = files
            .into_iter()
            .filter(|p| !hw.is_dir(p))
            .map(|p| (dir_name(&p), hw.read(&p).ok()))
            .collect();
        out.push(DeviceDump { dir, endpoints });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwmon::{MockHardwareAccessor, SysfsAccessor};
    use crate::test_utils::test_utils::{settings_for, FakeHwmon};
    use std::fs;
    use std::io;

    #[test]
    fn test_single_fan_with_name_and_fallback_label() {
        let hw = FakeHwmon::new();
        let dir = hw.chip("hwmon0", Some("nct6775"));
        hw.fan(&dir, 1, 42000, 90);

        let fans = discover(&SysfsAccessor, &settings_for(hw.root())).unwrap();
        assert_eq!(fans.len(), 1);
        assert_eq!(fans[0].name, "nct6775");
        assert_eq!(fans[0].label, "fan1");
        assert_eq!(fans[0].index, 1);
        assert_eq!(fans[0].last_temperature, 0);
        assert_eq!(fans[0].last_duty, 90);
        assert_eq!(fs::read_to_string(dir.join("pwm1_enable")).unwrap(), "1");
    }

    #[test]
    fn test_name_falls_back_to_directory() {
        let hw = FakeHwmon::new();
        let dir = hw.chip("hwmon3", None);
        hw.fan(&dir, 2, 30000, 0);

        let fans = discover(&SysfsAccessor, &settings_for(hw.root())).unwrap();
        assert_eq!(fans[0].name, "hwmon3");
        assert_eq!(fans[0].label, "fan2");
    }

    #[test]
    fn test_label_is_read_for_the_probed_index() {
        let hw = FakeHwmon::new();
        let dir = hw.chip("hwmon0", Some("it8728"));
        hw.fan(&dir, 1, 40000, 100);
        hw.fan(&dir, 2, 40000, 100);
        fs::write(dir.join("fan1_label"), "CPU Fan\n").unwrap();
        fs::write(dir.join("fan2_label"), "Case Fan\n").unwrap();

        let fans = discover(&SysfsAccessor, &settings_for(hw.root())).unwrap();
        let labels: Vec<&str> = fans.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["CPU Fan", "Case Fan"]);
        assert_eq!(fs::read_to_string(dir.join("pwm2_enable")).unwrap(), "1");
    }

    #[test]
    fn test_pwm_without_paired_temperature_is_skipped() {
        let hw = FakeHwmon::new();
        let dir = hw.chip("hwmon0", Some("nct6775"));
        hw.fan(&dir, 1, 40000, 100);
        fs::write(dir.join("pwm2"), "100").unwrap();

        let fans = discover(&SysfsAccessor, &settings_for(hw.root())).unwrap();
        assert_eq!(fans.len(), 1);
        assert!(!dir.join("pwm2_enable").exists());
    }

    #[test]
    fn test_only_first_five_slots_are_probed() {
        let hw = FakeHwmon::new();
        let dir = hw.chip("hwmon0", Some("big"));
        for idx in 1..=6 {
            hw.fan(&dir, idx, 40000, 100);
        }

        let fans = discover(&SysfsAccessor, &settings_for(hw.root())).unwrap();
        assert_eq!(fans.len(), 5);
        assert!(fans.iter().all(|f| f.index <= 5));
    }

    #[test]
    fn test_files_in_root_are_ignored() {
        let hw = FakeHwmon::new();
        fs::write(hw.root().join("uevent"), "x").unwrap();
        let dir = hw.chip("hwmon0", Some("k10temp"));
        hw.fan(&dir, 1, 40000, 100);

        assert_eq!(discover(&SysfsAccessor, &settings_for(hw.root())).unwrap().len(), 1);
    }

    #[test]
    fn test_dry_run_leaves_enable_untouched() {
        let hw = FakeHwmon::new();
        let dir = hw.chip("hwmon0", Some("nct6775"));
        hw.fan(&dir, 1, 40000, 100);
        let mut settings = settings_for(hw.root());
        settings.dry_run = true;

        assert_eq!(discover(&SysfsAccessor, &settings).unwrap().len(), 1);
        assert!(!dir.join("pwm1_enable").exists());
    }

    #[test]
    fn test_no_hardware() {
        let hw = FakeHwmon::new();
        hw.chip("hwmon0", Some("acpitz"));

        let err = discover(&SysfsAccessor, &settings_for(hw.root())).unwrap_err();
        assert!(matches!(err, FanError::NoHardware(_)));
    }

    #[test]
    fn test_missing_root() {
        let hw = FakeHwmon::new();
        let settings = settings_for(&hw.root().join("nope"));

        let err = discover(&SysfsAccessor, &settings).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_permission_denied_on_manual_mode_is_fatal() {
        let root = PathBuf::from("/hw");
        let chip = root.join("hwmon0");
        let mut mock = MockHardwareAccessor::new();
        let listed = chip.clone();
        let expected_root = root.clone();
        mock.expect_list_dir()
            .withf(move |p| p == expected_root.as_path())
            .returning(move |_| Ok(vec![listed.clone()]));
        mock.expect_is_dir().returning(|_| true);
        mock.expect_exists()
            .returning(|p| p.ends_with("pwm1") || p.ends_with("temp1_input"));
        mock.expect_read().returning(|p| {
            if p.ends_with("name") {
                Ok("nct6775".to_string())
            } else if p.ends_with("pwm1") {
                Ok("128".to_string())
            } else {
                Err(io::Error::from(io::ErrorKind::NotFound))
            }
        });
        let enable = chip.join("pwm1_enable");
        mock.expect_write()
            .withf(move |p, v| p == enable.as_path() && v == "1")
            .times(1)
            .returning(|_, _| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let err = discover(&mock, &settings_for(&root)).unwrap_err();
        match err {
            FanError::ManualMode { path, source } => {
                assert_eq!(path, chip.join("pwm1_enable"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected ManualMode, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_manual_mode_restores_earlier_fans() {
        let hw = FakeHwmon::new();
        let first = hw.chip("hwmon0", Some("nct6775"));
        let second = hw.chip("hwmon1", Some("amdgpu"));
        hw.fan(&first, 1, 40000, 80);
        hw.fan(&first, 2, 41000, 80);
        hw.fan(&second, 1, 55000, 120);
        // a directory cannot be written, like a read-only attribute
        fs::create_dir(second.join("pwm1_enable")).unwrap();

        let err = discover(&SysfsAccessor, &settings_for(hw.root())).unwrap_err();
        assert!(matches!(err, FanError::ManualMode { .. }));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(fs::read_to_string(first.join("pwm1_enable")).unwrap(), "2");
        assert_eq!(fs::read_to_string(first.join("pwm2_enable")).unwrap(), "2");
    }

    #[test]
    fn test_inventory_lists_endpoints() {
        let hw = FakeHwmon::new();
        let dir = hw.chip("hwmon0", Some("nct6775"));
        hw.fan(&dir, 1, 42000, 90);

        let dump = inventory(&SysfsAccessor, hw.root()).unwrap();
        assert_eq!(dump.len(), 1);
        let names: Vec<&str> = dump[0].endpoints.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"name"));
        assert!(names.contains(&"pwm1"));
        assert!(dump[0]
            .endpoints
            .contains(&("temp1_input".to_string(), Some("42000".to_string()))));
    }
}
