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

//! Optional per-device tuning overrides.
//!
//! Board bring-up sometimes needs different operating points than the
//! built-in table. A JSON file may replace the parameters of individual
//! profiles; anything invalid or absent falls back to the built-ins and is
//! never fatal.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::profiles::{Profile, ProfileParameters, ProfileTable};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/powerhald/tuning.json";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuningConfig {
    /// Per-profile replacements; profiles not named keep the built-ins.
    #[serde(default)]
    pub profiles: HashMap<Profile, ProfileParameters>,
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = env::var("POWERHALD_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Load and validate the override file. Missing file, parse failure, or a
/// validation error all yield None; the caller keeps the built-in table.
pub fn load_tuning_config() -> Option<TuningConfig> {
    let data = fs::read_to_string(config_path()).ok()?;
    let cfg: TuningConfig = serde_json::from_str(&data).ok()?;
    validate_tuning(&cfg).ok()?;
    Some(cfg)
}

/// Built-in table with any validated overrides applied on top.
pub fn table_with_overrides(cfg: &TuningConfig) -> ProfileTable {
    let mut table = ProfileTable::builtin();
    for (profile, params) in &cfg.profiles {
        table.set_parameters(*profile, params.clone());
    }
    table
}

fn is_safe_target_loads(s: &str) -> bool {
    if s.is_empty() || s.len() > 256 {
        return false;
    }
    s.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == ':')
}

pub fn validate_tuning(cfg: &TuningConfig) -> Result<(), String> {
    for (profile, p) in &cfg.profiles {
        validate_parameters(p).map_err(|e| format!("profile {}: {}", profile.name(), e))?;
    }
    Ok(())
}

fn validate_parameters(p: &ProfileParameters) -> Result<(), String> {
    if p.min_freq <= 0 || p.max_freq <= 0 {
        return Err("frequencies must be positive".into());
    }
    if p.min_freq > p.max_freq {
        return Err("min_freq > max_freq".into());
    }
    if !matches!(p.io_is_busy, 0 | 1) {
        return Err("io_is_busy must be 0 or 1".into());
    }
    for (state, t) in [("screen_on", &p.screen_on), ("screen_off", &p.screen_off)] {
        if t.hispeed_freq <= 0 {
            return Err(format!("{}: hispeed_freq must be positive", state));
        }
        if !(0..=100).contains(&t.go_hispeed_load) {
            return Err(format!("{}: go_hispeed_load out of range (0..=100)", state));
        }
        if !(1_000..=1_000_000).contains(&t.timer_rate) {
            return Err(format!("{}: timer_rate out of range (1000..=1000000 us)", state));
        }
        if !is_safe_target_loads(&t.target_loads) {
            return Err(format!("{}: invalid target_loads", state));
        }
    }
    Ok(())
}
