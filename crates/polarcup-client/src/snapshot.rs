// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Telemetry snapshot model and fetch errors.
//!
//! A [`Snapshot`] is the JSON document served by the cup's `/data` endpoint.
//! It is transient: one is produced per poll cycle and dropped once rendered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One telemetry reading from the cup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Liquid temperature in degrees Celsius.
    pub temperature: f64,

    /// Liquid volume in milliliters.
    pub quantity: f64,

    /// Whether the liquid is above its optimal temperature.
    pub needs_cooling: bool,

    /// Minutes of cooling left. Only meaningful when `needs_cooling` is set;
    /// devices omit it when idle.
    #[serde(default)]
    pub cooling_time_remaining: f64,
}

impl Snapshot {
    /// Decode a snapshot from a JSON response body.
    pub fn from_json(body: &[u8]) -> Result<Self, FetchError> {
        serde_json::from_slice(body).map_err(FetchError::Parse)
    }
}

/// Coarse classification of a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Status,
    Parse,
}

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed snapshot: {0}")]
    Parse(#[source] serde_json::Error),
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::Status(_) => FailureKind::Status,
            Self::Parse(_) => FailureKind::Parse,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}
