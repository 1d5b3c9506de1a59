/*
 * Test utilities and fixtures for Hwfan
 *
 * Builds throwaway hwmon trees on disk so discovery and the control loop can
 * run against real files without touching /sys.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::config::{Options, Settings};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A temporary monitoring root. Dropped together with its files.
    pub struct FakeHwmon {
        dir: TempDir,
    }

    impl FakeHwmon {
        pub fn new() -> Self {
            FakeHwmon { dir: TempDir::new().unwrap() }
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        /// Create `<root>/<tag>`, with a `name` endpoint when `name` is given.
        pub fn chip(&self, tag: &str, name: Option<&str>) -> PathBuf {
            let dir = self.root().join(tag);
            fs::create_dir_all(&dir).unwrap();
            if let Some(name) = name {
                fs::write(dir.join("name"), format!("{}\n", name)).unwrap();
            }
            dir
        }

        /// Create `pwm<idx>` and `temp<idx>_input` in `dir`.
        pub fn fan(&self, dir: &Path, idx: usize, millidegrees: i64, duty: u8) {
            fs::write(dir.join(format!("pwm{}", idx)), format!("{}\n", duty)).unwrap();
            self.set_temp(dir, idx, millidegrees);
        }

        pub fn set_temp(&self, dir: &Path, idx: usize, millidegrees: i64) {
            fs::write(dir.join(format!("temp{}_input", idx)), format!("{}\n", millidegrees)).unwrap();
        }

        pub fn set_duty(&self, dir: &Path, idx: usize, duty: u8) {
            fs::write(dir.join(format!("pwm{}", idx)), format!("{}\n", duty)).unwrap();
        }

        pub fn duty(&self, dir: &Path, idx: usize) -> String {
            fs::read_to_string(dir.join(format!("pwm{}", idx))).unwrap().trim().to_string()
        }
    }

    /// Reference defaults (max 87, min 52, comfort 120) rooted at `root`.
    pub fn settings_for(root: &Path) -> Settings {
        Settings::resolve(Options { hwmon: Some(root.to_path_buf()), ..Options::default() })
    }
}
