/*
 * This file is part of powerhal.
 *
 * Copyright (C) 2025 powerhal contributors
 *
 * powerhal is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * powerhal is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with powerhal. If not, see <https://www.gnu.org/licenses/>.
 */

//! Kernel control-file access.
//!
//! Every outbound write goes through `write_str`/`write_int`: open the path
//! write-only, write the full value in one call, close on scope exit
//! regardless of outcome. No retries; the caller decides whether a failure
//! matters.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{PowerError, Result};

/// Governor name the touch-boost path requires.
pub const INTERACTIVE_GOVERNOR: &str = "interactive";

const CPUFREQ_LIMIT_DIR: &str = "sys/kernel/cpufreq_limit";
const INTERACTIVE_DIR: &str = "sys/devices/system/cpu/cpufreq/interactive";
const SCALING_GOVERNOR: &str = "sys/devices/system/cpu/cpu0/cpufreq/scaling_governor";

/// Logical control name to concrete path mapping for every kernel file this
/// controller touches. Injectable so tests (and `--sysfs-root`) can substitute
/// a fake tree for the real sysfs.
#[derive(Debug, Clone)]
pub struct ControlPaths {
    pub min_freq_limit: PathBuf,
    pub max_freq_limit: PathBuf,
    pub hispeed_freq: PathBuf,
    pub go_hispeed_load: PathBuf,
    pub timer_rate: PathBuf,
    pub target_loads: PathBuf,
    pub io_is_busy: PathBuf,
    pub boostpulse: PathBuf,
    pub scaling_governor: PathBuf,
}

impl Default for ControlPaths {
    fn default() -> Self {
        Self::with_root(Path::new("/"))
    }
}

impl ControlPaths {
    /// Same layout re-rooted under `root` instead of `/`.
    pub fn with_root(root: &Path) -> Self {
        let limit = root.join(CPUFREQ_LIMIT_DIR);
        let interactive = root.join(INTERACTIVE_DIR);
        Self {
            min_freq_limit: limit.join("limited_min_freq"),
            max_freq_limit: limit.join("limited_max_freq"),
            hispeed_freq: interactive.join("hispeed_freq"),
            go_hispeed_load: interactive.join("go_hispeed_load"),
            timer_rate: interactive.join("timer_rate"),
            target_loads: interactive.join("target_loads"),
            io_is_busy: interactive.join("io_is_busy"),
            boostpulse: interactive.join("boostpulse"),
            scaling_governor: root.join(SCALING_GOVERNOR),
        }
    }

    /// All writable control files, in no particular order.
    pub fn writable(&self) -> [&PathBuf; 8] {
        [
            &self.min_freq_limit,
            &self.max_freq_limit,
            &self.hispeed_freq,
            &self.go_hispeed_load,
            &self.timer_rate,
            &self.target_loads,
            &self.io_is_busy,
            &self.boostpulse,
        ]
    }
}

/// Open `path` write-only for the process lifetime (boost-pulse handle).
pub fn open_wronly(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| PowerError::Open { path: path.to_path_buf(), source: e })
}

pub fn write_str(path: &Path, value: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| PowerError::Open { path: path.to_path_buf(), source: e })?;
    file.write_all(value.as_bytes())
        .map_err(|e| PowerError::Write { path: path.to_path_buf(), source: e })
}

/// Integer formatted as decimal text, no trailing newline.
pub fn write_int(path: &Path, value: i64) -> Result<()> {
    write_str(path, &value.to_string())
}

pub fn read_trimmed(path: &Path) -> io::Result<String> {
    let mut s = String::new();
    File::open(path)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}
