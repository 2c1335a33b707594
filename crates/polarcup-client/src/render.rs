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

//! Applies snapshots to the shared display.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cooling::update_cooling_status;
use crate::display::{lock_display, SharedDisplay};
use crate::format::{format_quantity, format_temperature};
use crate::snapshot::Snapshot;

/// What to do when poll cycles overlap and complete out of order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Render a response only if no later-issued cycle has rendered yet.
    #[default]
    LatestIssued,
    /// Render every response as it completes; the last to finish wins.
    LastCompleted,
}

impl OverlapPolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlapPolicy::LatestIssued => "latest-issued",
            OverlapPolicy::LastCompleted => "last-completed",
        }
    }
}

impl std::fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes snapshots into a display acquired at construction.
#[derive(Debug, Clone)]
pub struct Renderer {
    display: SharedDisplay,
    policy: OverlapPolicy,
}

impl Renderer {
    #[must_use]
    pub fn new(display: SharedDisplay, policy: OverlapPolicy) -> Self {
        Self { display, policy }
    }

    #[must_use]
    pub fn display(&self) -> &SharedDisplay {
        &self.display
    }

    #[must_use]
    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Render `snapshot`, produced by the cycle holding `ticket`.
    ///
    /// Temperature, quantity and cooling status are written in that order
    /// under a single lock. Returns `false` without touching the display when
    /// the policy rejects a stale ticket.
    pub fn render(&self, ticket: u64, snapshot: &Snapshot) -> bool {
        let mut model = lock_display(&self.display);

        if self.policy == OverlapPolicy::LatestIssued && ticket < model.rendered_ticket {
            return false;
        }

        model.temperature.set_text(format_temperature(snapshot.temperature));
        model.quantity.set_text(format_quantity(snapshot.quantity));
        update_cooling_status(
            &mut model.cooling_status,
            snapshot.needs_cooling,
            snapshot.cooling_time_remaining,
        );

        model.rendered_ticket = ticket;
        model.last_updated = Some(Utc::now());
        true
    }
}
