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

//! Power profiles and their per-profile governor tuning data.
//!
//! The table is external tuning data for the platform's known-safe operating
//! points, populated once at startup and read-only afterwards. Frequencies are
//! kHz steps of the msm8960 cpufreq table.

use serde::{Deserialize, Serialize};

pub const POWERSAVE_MIN_FREQ: i64 = 384_000;
pub const POWERSAVE_MAX_FREQ: i64 = 1_026_000;
pub const BIAS_PERF_MIN_FREQ: i64 = 1_134_000;
pub const NORMAL_MAX_FREQ: i64 = 1_512_000;

/// Closed set of operating intents selectable by the host runtime.
///
/// Ids match the host's profile numbering (0..=4); one profile is "current"
/// at any time once the host has selected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    PowerSave,
    Balanced,
    HighPerformance,
    BiasPower,
    BiasPerformance,
}

impl Profile {
    pub const COUNT: usize = 5;

    pub const ALL: [Profile; Profile::COUNT] = [
        Profile::PowerSave,
        Profile::Balanced,
        Profile::HighPerformance,
        Profile::BiasPower,
        Profile::BiasPerformance,
    ];

    /// Host-facing profile id.
    pub fn id(self) -> i32 {
        match self {
            Profile::PowerSave => 0,
            Profile::Balanced => 1,
            Profile::HighPerformance => 2,
            Profile::BiasPower => 3,
            Profile::BiasPerformance => 4,
        }
    }

    pub fn from_id(id: i32) -> Option<Profile> {
        match id {
            0 => Some(Profile::PowerSave),
            1 => Some(Profile::Balanced),
            2 => Some(Profile::HighPerformance),
            3 => Some(Profile::BiasPower),
            4 => Some(Profile::BiasPerformance),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Profile::PowerSave => "power_save",
            Profile::Balanced => "balanced",
            Profile::HighPerformance => "high_performance",
            Profile::BiasPower => "bias_power",
            Profile::BiasPerformance => "bias_performance",
        }
    }

    pub fn from_name(name: &str) -> Option<Profile> {
        Profile::ALL.iter().copied().find(|p| p.name() == name)
    }
}

/// Interactive-governor tuning for one screen state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveTuning {
    pub hispeed_freq: i64,
    pub go_hispeed_load: i64,
    pub timer_rate: i64,
    /// Governor-defined CSV, e.g. "85 1134000:90".
    pub target_loads: String,
}

/// Complete tuning record for one profile: cpufreq limit bounds plus the
/// interactive-governor values for both screen states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileParameters {
    pub min_freq: i64,
    pub max_freq: i64,
    pub screen_on: InteractiveTuning,
    pub screen_off: InteractiveTuning,
    pub io_is_busy: i64,
}

/// Read-only per-process table, one entry per profile.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    entries: [ProfileParameters; Profile::COUNT],
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileTable {
    /// Platform defaults. Screen-off variants relax the governor so an idle
    /// panel never holds the high clusters up.
    pub fn builtin() -> Self {
        let entries = [
            // power_save
            ProfileParameters {
                min_freq: POWERSAVE_MIN_FREQ,
                max_freq: POWERSAVE_MAX_FREQ,
                screen_on: InteractiveTuning {
                    hispeed_freq: 594_000,
                    go_hispeed_load: 90,
                    timer_rate: 40_000,
                    target_loads: "95".to_string(),
                },
                screen_off: InteractiveTuning {
                    hispeed_freq: 486_000,
                    go_hispeed_load: 95,
                    timer_rate: 60_000,
                    target_loads: "98".to_string(),
                },
                io_is_busy: 0,
            },
            // balanced
            ProfileParameters {
                min_freq: POWERSAVE_MIN_FREQ,
                max_freq: NORMAL_MAX_FREQ,
                screen_on: InteractiveTuning {
                    hispeed_freq: 918_000,
                    go_hispeed_load: 80,
                    timer_rate: 20_000,
                    target_loads: "85 1134000:90".to_string(),
                },
                screen_off: InteractiveTuning {
                    hispeed_freq: 702_000,
                    go_hispeed_load: 90,
                    timer_rate: 50_000,
                    target_loads: "90".to_string(),
                },
                io_is_busy: 1,
            },
            // high_performance
            ProfileParameters {
                min_freq: NORMAL_MAX_FREQ,
                max_freq: NORMAL_MAX_FREQ,
                screen_on: InteractiveTuning {
                    hispeed_freq: 1_512_000,
                    go_hispeed_load: 65,
                    timer_rate: 10_000,
                    target_loads: "70 1350000:80".to_string(),
                },
                screen_off: InteractiveTuning {
                    hispeed_freq: 1_134_000,
                    go_hispeed_load: 80,
                    timer_rate: 30_000,
                    target_loads: "85".to_string(),
                },
                io_is_busy: 1,
            },
            // bias_power
            ProfileParameters {
                min_freq: POWERSAVE_MIN_FREQ,
                max_freq: POWERSAVE_MAX_FREQ,
                screen_on: InteractiveTuning {
                    hispeed_freq: 702_000,
                    go_hispeed_load: 85,
                    timer_rate: 30_000,
                    target_loads: "90 1026000:95".to_string(),
                },
                screen_off: InteractiveTuning {
                    hispeed_freq: 594_000,
                    go_hispeed_load: 90,
                    timer_rate: 50_000,
                    target_loads: "95".to_string(),
                },
                io_is_busy: 0,
            },
            // bias_performance
            ProfileParameters {
                min_freq: BIAS_PERF_MIN_FREQ,
                max_freq: NORMAL_MAX_FREQ,
                screen_on: InteractiveTuning {
                    hispeed_freq: 1_134_000,
                    go_hispeed_load: 75,
                    timer_rate: 20_000,
                    target_loads: "80 1242000:85".to_string(),
                },
                screen_off: InteractiveTuning {
                    hispeed_freq: 918_000,
                    go_hispeed_load: 85,
                    timer_rate: 40_000,
                    target_loads: "90".to_string(),
                },
                io_is_busy: 1,
            },
        ];
        Self { entries }
    }

    /// Pure lookup; every member of the closed profile set has an entry by
    /// construction.
    pub fn parameters(&self, profile: Profile) -> &ProfileParameters {
        &self.entries[profile.id() as usize]
    }

    /// Replace the entry for one profile (config override path).
    pub fn set_parameters(&mut self, profile: Profile, params: ProfileParameters) {
        self.entries[profile.id() as usize] = params;
    }
}
