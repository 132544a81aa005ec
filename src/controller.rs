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

//! Profile controller and hint dispatcher.
//!
//! One `PowerController` exists per process, constructed at load and shared
//! by reference with every entry point. Entry points are called synchronously
//! from arbitrary host threads; three mutexes guard three disjoint state
//! cells. The profile lock and the boost-handle lock are never held at the
//! same time.
//!
//! Every kernel write is best-effort: failures are logged and absorbed, never
//! surfaced to the host (it has no way to react to a failed tuning write).

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde_json::json;

use crate::error::{PowerError, Result};
use crate::hints::{PowerHint, VideoEncodeHook, STATE_OFF, STATE_ON};
use crate::logger;
use crate::profiles::{Profile, ProfileTable};
use crate::sysfs::{self, ControlPaths};

pub struct PowerController {
    paths: ControlPaths,
    table: ProfileTable,
    encode_hook: Box<dyn VideoEncodeHook>,
    /// Currently selected profile; None until the host picks one.
    profile: Mutex<Option<Profile>>,
    /// Last screen state applied to the governor (write suppression).
    interactive: Mutex<Option<bool>>,
    /// Lazily opened pulse handle, kept for the process lifetime.
    boostpulse: Mutex<Option<File>>,
}

// Poisoning only happens if a writer panicked mid-update; the cells hold
// plain values, so the inner state is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_int_absorbed(path: &Path, value: i64) {
    if let Err(e) = sysfs::write_int(path, value) {
        logger::log_event(
            "sysfs_write_failed",
            json!({ "path": path.display().to_string(), "error": e.to_string() }),
        );
    }
}

fn write_str_absorbed(path: &Path, value: &str) {
    if let Err(e) = sysfs::write_str(path, value) {
        logger::log_event(
            "sysfs_write_failed",
            json!({ "path": path.display().to_string(), "error": e.to_string() }),
        );
    }
}

impl PowerController {
    pub fn new(
        paths: ControlPaths,
        table: ProfileTable,
        encode_hook: Box<dyn VideoEncodeHook>,
    ) -> Self {
        Self {
            paths,
            table,
            encode_hook,
            profile: Mutex::new(None),
            interactive: Mutex::new(None),
            boostpulse: Mutex::new(None),
        }
    }

    /// Real sysfs paths, built-in table, logging encode hook.
    pub fn with_defaults() -> Self {
        Self::new(
            ControlPaths::default(),
            ProfileTable::builtin(),
            Box::new(crate::hints::LoggingEncodeHook),
        )
    }

    pub fn current_profile(&self) -> Option<Profile> {
        *lock(&self.profile)
    }

    /// Select a profile by host id. Unknown ids are reported and leave the
    /// current profile unchanged.
    pub fn set_profile_id(&self, id: i32) {
        if let Err(e) = self.try_set_profile_id(id) {
            logger::log_event("invalid_profile", json!({ "id": id, "error": e.to_string() }));
        }
    }

    fn try_set_profile_id(&self, id: i32) -> Result<()> {
        let profile = Profile::from_id(id).ok_or(PowerError::InvalidProfile(id))?;
        self.set_profile(profile);
        Ok(())
    }

    /// Apply a profile's frequency bounds and record it as current.
    ///
    /// The lock is held for the whole switch so a concurrent caller never
    /// observes a half-applied transition. Re-selecting the current profile
    /// re-applies the writes; a failed write does not block the logical
    /// switch.
    pub fn set_profile(&self, requested: Profile) {
        let mut current = lock(&self.profile);
        let params = self.table.parameters(requested);

        write_int_absorbed(&self.paths.min_freq_limit, params.min_freq);
        write_int_absorbed(&self.paths.max_freq_limit, params.max_freq);

        *current = Some(requested);
        logger::log_event(
            "profile_switch",
            json!({
                "profile": requested.name(),
                "min_freq": params.min_freq,
                "max_freq": params.max_freq,
            }),
        );
    }

    /// Sync the interactive governor to a screen-state change.
    ///
    /// No-op until a profile is selected, and suppressed when the state
    /// matches the last applied one. Writes go out in a fixed order per
    /// state; the files are independent sysfs nodes, so ordering only
    /// matters for test determinism.
    pub fn set_interactive(&self, on: bool) {
        let Some(profile) = self.current_profile() else {
            logger::log_event("interactive_sync", json!({ "on": on, "skipped": "no profile" }));
            return;
        };

        let mut last = lock(&self.interactive);
        if *last == Some(on) {
            return;
        }

        let params = self.table.parameters(profile);
        if on {
            let t = &params.screen_on;
            write_int_absorbed(&self.paths.hispeed_freq, t.hispeed_freq);
            write_int_absorbed(&self.paths.go_hispeed_load, t.go_hispeed_load);
            write_int_absorbed(&self.paths.timer_rate, t.timer_rate);
            write_str_absorbed(&self.paths.target_loads, &t.target_loads);
        } else {
            let t = &params.screen_off;
            write_int_absorbed(&self.paths.hispeed_freq, t.hispeed_freq);
            write_int_absorbed(&self.paths.timer_rate, t.timer_rate);
            write_int_absorbed(&self.paths.go_hispeed_load, t.go_hispeed_load);
            write_str_absorbed(&self.paths.target_loads, &t.target_loads);
        }
        write_int_absorbed(&self.paths.io_is_busy, if on { params.io_is_busy } else { 0 });

        *last = Some(on);
        logger::log_event(
            "interactive_sync",
            json!({ "on": on, "profile": profile.name() }),
        );
    }

    /// Route one hint. SET_PROFILE always dispatches; every other hint is
    /// suppressed until a profile is selected, and while power-save is
    /// active (power-save disables all boosting).
    pub fn power_hint(&self, hint: PowerHint<'_>) {
        if let PowerHint::SetProfile(id) = hint {
            self.set_profile_id(id);
            return;
        }

        match self.current_profile() {
            None | Some(Profile::PowerSave) => return,
            Some(_) => {}
        }

        match hint {
            PowerHint::Launch | PowerHint::CpuBoost => self.touch_boost(),
            PowerHint::VideoEncode(state) => self.video_encode_hint(state),
            // Handled above / nothing to do on this platform.
            PowerHint::SetProfile(_)
            | PowerHint::Interaction
            | PowerHint::Vsync
            | PowerHint::LowPower => {}
        }
    }

    /// Capability query passthrough, see [`crate::hints::get_feature`].
    pub fn get_feature(&self, feature: u32) -> i32 {
        crate::hints::get_feature(feature)
    }

    fn governor_is_interactive(&self) -> Result<()> {
        let governor = sysfs::read_trimmed(&self.paths.scaling_governor).map_err(|e| {
            PowerError::Open {
                path: self.paths.scaling_governor.clone(),
                source: e,
            }
        })?;
        if governor == sysfs::INTERACTIVE_GOVERNOR {
            Ok(())
        } else {
            Err(PowerError::GovernorNotInteractive)
        }
    }

    /// Pulse the governor once to mask input latency. A non-interactive
    /// governor makes this a deliberate no-op, not an error.
    fn touch_boost(&self) {
        if let Err(e) = self.governor_is_interactive() {
            logger::log_event("touch_boost_skipped", json!({ "reason": e.to_string() }));
            return;
        }
        self.boostpulse();
    }

    /// Write the pulse marker through the cached handle, opening it on first
    /// use. Check-then-open happens under the boost lock so concurrent hint
    /// dispatches cannot open the file twice. The handle is never closed
    /// during normal operation, even after a failed write.
    fn boostpulse(&self) {
        let mut handle = lock(&self.boostpulse);
        if handle.is_none() {
            match sysfs::open_wronly(&self.paths.boostpulse) {
                Ok(file) => *handle = Some(file),
                Err(e) => {
                    logger::log_event(
                        "boostpulse_open_failed",
                        json!({ "error": e.to_string() }),
                    );
                    return;
                }
            }
        }
        if let Some(file) = handle.as_mut() {
            if let Err(e) = file.write_all(b"1") {
                logger::log_event(
                    "boostpulse_write_failed",
                    json!({ "error": e.to_string() }),
                );
            }
        }
    }

    fn video_encode_hint(&self, state: Option<&str>) {
        let Some(state) = state else { return };
        let on = match state {
            STATE_ON => true,
            STATE_OFF => false,
            _ => return,
        };
        self.encode_hook.sync_thread(on);
        self.encode_hook.enc_boost(on);
        logger::log_event("video_encode", json!({ "on": on }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::{LoggingEncodeHook, MockVideoEncodeHook, FEATURE_SUPPORTED_PROFILES};
    use crate::test_utils::test_utils::{clear_control_files, fake_control_tree, read_control};
    use crate::profiles::NORMAL_MAX_FREQ;
    use std::fs;

    fn test_controller(paths: ControlPaths) -> PowerController {
        PowerController::new(paths, ProfileTable::builtin(), Box::new(LoggingEncodeHook))
    }

    #[test]
    fn test_set_profile_applies_table_bounds_for_every_profile() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());
        let table = ProfileTable::builtin();

        for p in Profile::ALL {
            ctl.set_profile(p);
            assert_eq!(ctl.current_profile(), Some(p));
            let params = table.parameters(p);
            assert_eq!(read_control(&paths.min_freq_limit), params.min_freq.to_string());
            assert_eq!(read_control(&paths.max_freq_limit), params.max_freq.to_string());
        }
    }

    #[test]
    fn test_set_profile_id_invalid_is_noop() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());

        ctl.set_profile_id(9);
        assert_eq!(ctl.current_profile(), None);
        assert_eq!(read_control(&paths.min_freq_limit), "");

        ctl.set_profile_id(1);
        ctl.set_profile_id(-3);
        // unknown id leaves the previous selection in place
        assert_eq!(ctl.current_profile(), Some(Profile::Balanced));
    }

    #[test]
    fn test_set_profile_repeat_reapplies_writes() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());

        ctl.set_profile(Profile::Balanced);
        clear_control_files(&paths);
        ctl.set_profile(Profile::Balanced);
        // profile switches are not suppressed-by-skip
        assert_eq!(
            read_control(&paths.max_freq_limit),
            NORMAL_MAX_FREQ.to_string()
        );
    }

    #[test]
    fn test_set_profile_survives_missing_control_file() {
        let (_dir, paths) = fake_control_tree();
        fs::remove_file(&paths.min_freq_limit).unwrap();
        let ctl = test_controller(paths.clone());

        ctl.set_profile(Profile::HighPerformance);
        // failed write is absorbed; logical switch still happens
        assert_eq!(ctl.current_profile(), Some(Profile::HighPerformance));
        assert_eq!(
            read_control(&paths.max_freq_limit),
            NORMAL_MAX_FREQ.to_string()
        );
    }

    #[test]
    fn test_set_interactive_before_profile_is_noop() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());

        ctl.set_interactive(true);
        assert_eq!(read_control(&paths.hispeed_freq), "");
        assert_eq!(read_control(&paths.target_loads), "");
        assert_eq!(read_control(&paths.io_is_busy), "");
    }

    #[test]
    fn test_set_interactive_applies_screen_on_tuning() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());
        let table = ProfileTable::builtin();

        ctl.set_profile(Profile::Balanced);
        ctl.set_interactive(true);

        let t = &table.parameters(Profile::Balanced).screen_on;
        assert_eq!(read_control(&paths.hispeed_freq), t.hispeed_freq.to_string());
        assert_eq!(read_control(&paths.go_hispeed_load), t.go_hispeed_load.to_string());
        assert_eq!(read_control(&paths.timer_rate), t.timer_rate.to_string());
        assert_eq!(read_control(&paths.target_loads), t.target_loads);
        assert_eq!(read_control(&paths.io_is_busy), "1");
    }

    #[test]
    fn test_set_interactive_screen_off_uses_off_variant_and_clears_io_is_busy() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());
        let table = ProfileTable::builtin();

        ctl.set_profile(Profile::Balanced);
        ctl.set_interactive(true);
        ctl.set_interactive(false);

        let t = &table.parameters(Profile::Balanced).screen_off;
        assert_eq!(read_control(&paths.hispeed_freq), t.hispeed_freq.to_string());
        assert_eq!(read_control(&paths.timer_rate), t.timer_rate.to_string());
        assert_eq!(read_control(&paths.target_loads), t.target_loads);
        assert_eq!(read_control(&paths.io_is_busy), "0");
    }

    #[test]
    fn test_set_interactive_suppresses_repeated_state() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());

        ctl.set_profile(Profile::Balanced);
        ctl.set_interactive(true);
        clear_control_files(&paths);

        ctl.set_interactive(true);
        // second identical transition issues no writes
        assert_eq!(read_control(&paths.hispeed_freq), "");
        assert_eq!(read_control(&paths.target_loads), "");
    }

    #[test]
    fn test_launch_hint_pulses_and_reuses_handle() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());

        ctl.set_profile(Profile::Balanced);
        ctl.power_hint(PowerHint::Launch);
        assert_eq!(read_control(&paths.boostpulse), "1");

        // cached write-only handle appends at its own offset; a re-open
        // would restart at zero and leave "1"
        ctl.power_hint(PowerHint::CpuBoost);
        assert_eq!(read_control(&paths.boostpulse), "11");
    }

    #[test]
    fn test_launch_hint_suppressed_in_power_save() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());

        ctl.set_profile(Profile::PowerSave);
        ctl.power_hint(PowerHint::Launch);
        assert_eq!(read_control(&paths.boostpulse), "");
    }

    #[test]
    fn test_hints_suppressed_before_profile_selection() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());

        ctl.power_hint(PowerHint::Launch);
        ctl.power_hint(PowerHint::CpuBoost);
        assert_eq!(read_control(&paths.boostpulse), "");
    }

    #[test]
    fn test_launch_hint_skipped_when_governor_not_interactive() {
        let (_dir, paths) = fake_control_tree();
        fs::write(&paths.scaling_governor, "ondemand\n").unwrap();
        let ctl = test_controller(paths.clone());

        ctl.set_profile(Profile::Balanced);
        ctl.power_hint(PowerHint::Launch);
        assert_eq!(read_control(&paths.boostpulse), "");
    }

    #[test]
    fn test_launch_hint_survives_missing_boostpulse_file() {
        let (_dir, paths) = fake_control_tree();
        fs::remove_file(&paths.boostpulse).unwrap();
        let ctl = test_controller(paths.clone());

        ctl.set_profile(Profile::Balanced);
        // open failure is reported and the pulse skipped, not fatal
        ctl.power_hint(PowerHint::Launch);
    }

    #[test]
    fn test_set_profile_hint_routes_to_controller() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths);

        ctl.power_hint(PowerHint::SetProfile(Profile::BiasPower.id()));
        assert_eq!(ctl.current_profile(), Some(Profile::BiasPower));
    }

    #[test]
    fn test_set_profile_hint_works_even_in_power_save() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths);

        ctl.set_profile(Profile::PowerSave);
        // the one hint that must never be suppressed
        ctl.power_hint(PowerHint::SetProfile(Profile::Balanced.id()));
        assert_eq!(ctl.current_profile(), Some(Profile::Balanced));
    }

    #[test]
    fn test_noop_hints_touch_nothing() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths.clone());

        ctl.set_profile(Profile::Balanced);
        clear_control_files(&paths);
        ctl.power_hint(PowerHint::Interaction);
        ctl.power_hint(PowerHint::Vsync);
        ctl.power_hint(PowerHint::LowPower);

        for p in paths.writable() {
            assert_eq!(read_control(p), "", "unexpected write to {}", p.display());
        }
    }

    fn encode_controller(paths: ControlPaths, hook: MockVideoEncodeHook) -> PowerController {
        PowerController::new(paths, ProfileTable::builtin(), Box::new(hook))
    }

    #[test]
    fn test_video_encode_start_drives_hook() {
        let (_dir, paths) = fake_control_tree();
        let mut hook = MockVideoEncodeHook::new();
        hook.expect_sync_thread().withf(|on| *on).times(1).return_const(());
        hook.expect_enc_boost().withf(|on| *on).times(1).return_const(());
        let ctl = encode_controller(paths, hook);

        ctl.set_profile(Profile::Balanced);
        ctl.power_hint(PowerHint::VideoEncode(Some(STATE_ON)));
    }

    #[test]
    fn test_video_encode_stop_drives_hook() {
        let (_dir, paths) = fake_control_tree();
        let mut hook = MockVideoEncodeHook::new();
        hook.expect_sync_thread().withf(|on| !*on).times(1).return_const(());
        hook.expect_enc_boost().withf(|on| !*on).times(1).return_const(());
        let ctl = encode_controller(paths, hook);

        ctl.set_profile(Profile::Balanced);
        ctl.power_hint(PowerHint::VideoEncode(Some(STATE_OFF)));
    }

    #[test]
    fn test_video_encode_missing_or_unknown_payload_ignored() {
        let (_dir, paths) = fake_control_tree();
        let mut hook = MockVideoEncodeHook::new();
        hook.expect_sync_thread().times(0);
        hook.expect_enc_boost().times(0);
        let ctl = encode_controller(paths, hook);

        ctl.set_profile(Profile::Balanced);
        ctl.power_hint(PowerHint::VideoEncode(None));
        ctl.power_hint(PowerHint::VideoEncode(Some("state=2")));
    }

    #[test]
    fn test_video_encode_suppressed_in_power_save() {
        let (_dir, paths) = fake_control_tree();
        let mut hook = MockVideoEncodeHook::new();
        hook.expect_sync_thread().times(0);
        hook.expect_enc_boost().times(0);
        let ctl = encode_controller(paths, hook);

        ctl.set_profile(Profile::PowerSave);
        ctl.power_hint(PowerHint::VideoEncode(Some(STATE_ON)));
    }

    #[test]
    fn test_get_feature_passthrough() {
        let (_dir, paths) = fake_control_tree();
        let ctl = test_controller(paths);

        assert_eq!(ctl.get_feature(FEATURE_SUPPORTED_PROFILES), 5);
        assert_eq!(ctl.get_feature(0xdead), -1);
    }
}
