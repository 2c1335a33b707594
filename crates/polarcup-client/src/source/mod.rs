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

//! Snapshot sources.
//!
//! The poller is generic over where snapshots come from. [`HttpSource`] talks
//! to a real cup; [`SimulatedSource`] stands in for one when no hardware is
//! around.

mod http;
mod simulated;

pub use http::{HttpSource, DEFAULT_ENDPOINT};
pub use simulated::{CupModel, SimulatedSource, SimulationConfig};

use std::future::Future;

use crate::snapshot::{FetchError, Snapshot};

/// Something that can produce one snapshot per call.
pub trait SnapshotSource: Send + Sync + 'static {
    /// Fetch and decode a single snapshot.
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send;
}
