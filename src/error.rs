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

//! Unified error type for powerhal operations.
//!
//! Control-file writes are best-effort tuning writes: every variant here is
//! logged and absorbed inside the controller rather than propagated to the
//! host runtime.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using PowerError
pub type Result<T> = std::result::Result<T, PowerError>;

#[derive(Error, Debug)]
pub enum PowerError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown power profile: {0}")]
    InvalidProfile(i32),

    #[error("cpufreq governor is not interactive")]
    GovernorNotInteractive,
}

impl PowerError {
    /// Control-file path involved in the failure, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            PowerError::Open { path, .. } | PowerError::Write { path, .. } => Some(path),
            _ => None,
        }
    }
}
