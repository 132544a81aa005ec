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

//! Hint codes delivered by the host runtime, and the seams to collaborators
//! that live outside this crate.

use serde_json::json;

use crate::logger;
use crate::profiles::Profile;

/// Video-encode state markers carried in the VIDEO_ENCODE hint payload.
pub const STATE_ON: &str = "state=1";
pub const STATE_OFF: &str = "state=0";

/// Capability-query id for the supported-profile count.
pub const FEATURE_SUPPORTED_PROFILES: u32 = 0x0000_1000;

/// Transient events signaling a short-lived need for different tuning,
/// distinct from a persistent profile change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerHint<'a> {
    /// Select a new persistent profile by host id.
    SetProfile(i32),
    /// Touch/gesture activity; routed nowhere on this platform.
    Interaction,
    Vsync,
    LowPower,
    /// App launch; masked input latency via a boost pulse.
    Launch,
    CpuBoost,
    /// Encode session start/stop with an opaque state marker payload.
    VideoEncode(Option<&'a str>),
}

impl PowerHint<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            PowerHint::SetProfile(_) => "set_profile",
            PowerHint::Interaction => "interaction",
            PowerHint::Vsync => "vsync",
            PowerHint::LowPower => "low_power",
            PowerHint::Launch => "launch",
            PowerHint::CpuBoost => "cpu_boost",
            PowerHint::VideoEncode(_) => "video_encode",
        }
    }
}

/// Capability query: the count of supported profiles, or -1 for any feature
/// this module does not implement.
pub fn get_feature(feature: u32) -> i32 {
    if feature == FEATURE_SUPPORTED_PROFILES {
        Profile::COUNT as i32
    } else {
        -1
    }
}

/// Encoder-side boost hooks invoked on video-encode start/stop. Implemented
/// by the platform's media stack; this crate only routes the transitions.
#[cfg_attr(test, mockall::automock)]
pub trait VideoEncodeHook: Send + Sync {
    /// Pin or release the governor sync thread for the encode session.
    fn sync_thread(&self, on: bool);
    /// Raise or drop the encoder frequency floor.
    fn enc_boost(&self, on: bool);
}

/// Hook used when no encoder integration is wired in: records the transition
/// so the encode path stays observable on devices without the media hooks.
pub struct LoggingEncodeHook;

impl VideoEncodeHook for LoggingEncodeHook {
    fn sync_thread(&self, on: bool) {
        logger::log_event("enc_sync_thread", json!({ "on": on }));
    }

    fn enc_boost(&self, on: bool) {
        logger::log_event("enc_boost", json!({ "on": on }));
    }
}
