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

//! Cooling-status derivation.
//!
//! The status is recomputed from scratch on every render; nothing is carried
//! over between calls.

use crate::display::{CoolingStatusTarget, StatusClass};
use crate::format::format_time_remaining;

/// The three presentations of the cooling-status block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoolingStatus {
    /// Liquid is at or below its optimal temperature.
    Optimal,
    /// Cooling is running with a known amount of time left.
    CoolingActive { minutes_remaining: f64 },
    /// Liquid is too warm but no remaining time is known.
    NeedsCooling,
}

impl CoolingStatus {
    /// Derive the status from a snapshot's two cooling fields.
    ///
    /// Only a strictly positive `time_remaining` counts as active cooling;
    /// zero, negative and NaN all collapse into [`CoolingStatus::NeedsCooling`].
    #[must_use]
    pub fn derive(needs_cooling: bool, time_remaining: f64) -> Self {
        if !needs_cooling {
            CoolingStatus::Optimal
        } else if time_remaining > 0.0 {
            CoolingStatus::CoolingActive {
                minutes_remaining: time_remaining,
            }
        } else {
            CoolingStatus::NeedsCooling
        }
    }

    #[must_use]
    pub fn class(&self) -> StatusClass {
        match self {
            CoolingStatus::Optimal => StatusClass::OptimalTemp,
            CoolingStatus::CoolingActive { .. } => StatusClass::CoolingActive,
            CoolingStatus::NeedsCooling => StatusClass::NeedsCooling,
        }
    }

    #[must_use]
    pub fn status_text(&self) -> &'static str {
        match self {
            CoolingStatus::Optimal => "Temperatura óptima",
            CoolingStatus::CoolingActive { .. } => "Enfriando",
            CoolingStatus::NeedsCooling => "Requiere enfriamiento",
        }
    }

    /// Time-remaining line; empty unless cooling is active.
    #[must_use]
    pub fn time_text(&self) -> String {
        match self {
            CoolingStatus::CoolingActive { minutes_remaining } => {
                format_time_remaining(*minutes_remaining)
            }
            CoolingStatus::Optimal | CoolingStatus::NeedsCooling => String::new(),
        }
    }
}

/// Render the cooling status into `target`.
///
/// All three markers are cleared before the derived one is applied, so the
/// container never keeps a marker from a previous render.
pub fn update_cooling_status<T>(
    target: &mut T,
    needs_cooling: bool,
    time_remaining: f64,
) -> CoolingStatus
where
    T: CoolingStatusTarget + ?Sized,
{
    for class in StatusClass::ALL {
        target.remove_class(class);
    }

    let status = CoolingStatus::derive(needs_cooling, time_remaining);
    target.add_class(status.class());
    target.set_status_text(status.status_text());
    target.set_time_text(&status.time_text());

    status
}
