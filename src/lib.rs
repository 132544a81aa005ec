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

//! powerhal - CPU power-profile and boost-hint controller
//!
//! Maps the host runtime's power profiles and transient hints (touch, app
//! launch, video encode) onto cpufreq-limit and interactive-governor control
//! files. State is process-lifetime only: the profile defaults to unset until
//! the host selects one.

pub mod config;
pub mod controller;
pub mod error;
pub mod hints;
pub mod logger;
pub mod profiles;
pub mod sysfs;

#[cfg(test)]
pub mod test_utils;

pub use controller::PowerController;
pub use error::{PowerError, Result};
pub use hints::PowerHint;
pub use profiles::Profile;
