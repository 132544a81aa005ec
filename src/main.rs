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

//! Debug/bring-up CLI for the controller.
//!
//! The primary consumer embeds the library; this binary applies one
//! operation per invocation, which is enough to exercise tuning on a device
//! shell. Controller state is process-lifetime, so `interactive` and `hint`
//! are only meaningful after a `profile` call in the same process for
//! library consumers; here each run selects its profile first when needed.

use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, bail, Result};
use serde_json::json;

use powerhal::config;
use powerhal::controller::PowerController;
use powerhal::hints::{self, LoggingEncodeHook, PowerHint, FEATURE_SUPPORTED_PROFILES};
use powerhal::logger;
use powerhal::profiles::{Profile, ProfileTable};
use powerhal::sysfs::ControlPaths;

fn usage() -> ! {
    eprintln!("usage: powerhald [--logging] [--sysfs-root DIR] COMMAND");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  profile NAME|ID                     apply a power profile");
    eprintln!("  interactive on|off [PROFILE]        sync governor to screen state");
    eprintln!("  hint HINT [PAYLOAD] [PROFILE]       dispatch a power hint");
    eprintln!("  features                            print supported profile count");
    eprintln!();
    eprintln!("hints: launch, cpu-boost, interaction, video-encode (payload state=1|state=0)");
    process::exit(2);
}

fn parse_profile(value: &str) -> Result<Profile> {
    Profile::from_name(value)
        .or_else(|| value.parse::<i32>().ok().and_then(Profile::from_id))
        .ok_or_else(|| anyhow!("unknown profile: {}", value))
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let logging_enabled = args.iter().any(|a| a == "--logging");
    if logging_enabled {
        logger::init_logging();
        logger::log_event("startup", json!({ "args": args }));
    }

    let mut sysfs_root: Option<PathBuf> = None;
    let mut cmd: Vec<&str> = Vec::new();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--logging" => {}
            "--sysfs-root" => {
                i += 1;
                match args.get(i) {
                    Some(dir) => sysfs_root = Some(PathBuf::from(dir)),
                    None => usage(),
                }
            }
            other => cmd.push(other),
        }
        i += 1;
    }

    // Real sysfs needs root; a re-rooted fake tree does not.
    if sysfs_root.is_none() && unsafe { libc::geteuid() } != 0 {
        eprintln!("Error: powerhald requires root privileges to write cpufreq control files.");
        eprintln!(
            "Run with: sudo {}",
            args.first().map(String::as_str).unwrap_or("powerhald")
        );
        process::exit(1);
    }

    let paths = match &sysfs_root {
        Some(root) => ControlPaths::with_root(root),
        None => ControlPaths::default(),
    };
    let table = match config::load_tuning_config() {
        Some(cfg) => config::table_with_overrides(&cfg),
        None => ProfileTable::builtin(),
    };
    let controller = PowerController::new(paths, table, Box::new(LoggingEncodeHook));

    match cmd.as_slice() {
        ["profile", value] => {
            let profile = parse_profile(value)?;
            controller.set_profile(profile);
            println!("profile set: {}", profile.name());
        }
        ["interactive", state, rest @ ..] => {
            let on = match *state {
                "on" => true,
                "off" => false,
                _ => usage(),
            };
            let profile = parse_profile(rest.first().copied().unwrap_or("balanced"))?;
            controller.set_profile(profile);
            controller.set_interactive(on);
            println!("interactive: {}", state);
        }
        ["hint", hint, rest @ ..] => {
            let (payload, profile_arg) = match *hint {
                "video-encode" => (rest.first().copied(), rest.get(1).copied()),
                _ => (None, rest.first().copied()),
            };
            let profile = parse_profile(profile_arg.unwrap_or("balanced"))?;
            controller.set_profile(profile);
            match *hint {
                "launch" => controller.power_hint(PowerHint::Launch),
                "cpu-boost" => controller.power_hint(PowerHint::CpuBoost),
                "interaction" => controller.power_hint(PowerHint::Interaction),
                "video-encode" => controller.power_hint(PowerHint::VideoEncode(payload)),
                _ => bail!("unknown hint: {}", hint),
            }
            println!("hint dispatched: {}", hint);
        }
        ["features"] => {
            println!("{}", hints::get_feature(FEATURE_SUPPORTED_PROFILES));
        }
        _ => usage(),
    }

    Ok(())
}
