/*
 * Test utilities for powerhal
 *
 * Fake control-file trees and small helpers shared by the module tests.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::sysfs::ControlPaths;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Builds a fake sysfs tree with every control file present and empty,
    /// and the governor reporting "interactive". Keep the TempDir alive for
    /// the duration of the test.
    pub fn fake_control_tree() -> (TempDir, ControlPaths) {
        let dir = TempDir::new().unwrap();
        let paths = ControlPaths::with_root(dir.path());
        for p in paths.writable() {
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, "").unwrap();
        }
        fs::create_dir_all(paths.scaling_governor.parent().unwrap()).unwrap();
        fs::write(&paths.scaling_governor, "interactive\n").unwrap();
        (dir, paths)
    }

    /// Current contents of a control file; empty string when unreadable so
    /// assertions against "no write happened" stay simple.
    pub fn read_control(path: &Path) -> String {
        fs::read_to_string(path).unwrap_or_default()
    }

    /// Truncate all writable control files between test phases.
    pub fn clear_control_files(paths: &ControlPaths) {
        for p in paths.writable() {
            fs::write(p, "").unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::*;

    #[test]
    fn test_fake_tree_has_all_control_files() {
        let (_dir, paths) = fake_control_tree();
        for p in paths.writable() {
            assert!(p.exists(), "missing {}", p.display());
            assert_eq!(read_control(p), "");
        }
        assert_eq!(read_control(&paths.scaling_governor), "interactive\n");
    }

    #[test]
    fn test_clear_control_files() {
        let (_dir, paths) = fake_control_tree();
        std::fs::write(&paths.timer_rate, "20000").unwrap();
        clear_control_files(&paths);
        assert_eq!(read_control(&paths.timer_rate), "");
    }
}
