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

//! Client library for Polar Cup cooling telemetry.
//!
//! A Polar Cup serves a small JSON snapshot (temperature, quantity, cooling
//! state) over HTTP. This library polls it and renders each snapshot into a
//! fixed set of display targets:
//!
//! - **Source layer**: [`SnapshotSource`] implementations that fetch snapshots
//!   ([`HttpSource`], or [`SimulatedSource`] when no cup is available)
//! - **Render layer**: value formatting, cooling-status derivation and the
//!   [`DisplayModel`] the view reads from
//! - **Poller layer**: the timed fetch-format-render loop with an owned
//!   [`PollerHandle`]
//!
//! # Quick Start
//!
//! ```no_run
//! use polarcup_client::{
//!     lock_display, new_shared_diagnostics, new_shared_display, HttpSource, Poller,
//!     PollerConfig,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let display = new_shared_display();
//!     let source = HttpSource::new("http://polarcup.local/data").unwrap();
//!     let poller = Poller::new(
//!         source,
//!         display.clone(),
//!         new_shared_diagnostics(),
//!         PollerConfig::default(),
//!     );
//!
//!     let _handle = poller.start();
//!     loop {
//!         tokio::time::sleep(Duration::from_secs(5)).await;
//!         let model = lock_display(&display);
//!         println!("{} / {}", model.temperature.text(), model.quantity.text());
//!     }
//! }
//! ```
//!
//! # Rendering Without a Poller
//!
//! ```
//! use polarcup_client::{update_cooling_status, StatusClass, StatusContainer};
//!
//! let mut status = StatusContainer::default();
//! update_cooling_status(&mut status, true, 15.0);
//!
//! assert_eq!(status.active_class(), Some(StatusClass::CoolingActive));
//! assert_eq!(status.time_text.text(), "Tiempo restante: 15 minutos");
//! ```

pub mod cooling;
pub mod diagnostics;
pub mod display;
pub mod format;
pub mod poller;
pub mod render;
pub mod snapshot;
pub mod source;

pub use cooling::{update_cooling_status, CoolingStatus};
pub use diagnostics::{
    lock_diagnostics, new_shared_diagnostics, DiagnosticLevel, DiagnosticLog, DiagnosticMessage,
    SharedDiagnostics,
};
pub use display::{
    lock_display, new_shared_display, CoolingStatusTarget, DisplayModel, SharedDisplay,
    StatusClass, StatusContainer, TextNode,
};
pub use format::{format_quantity, format_temperature, format_time_remaining};
pub use poller::{CycleOutcome, Poller, PollerConfig, PollerHandle, DEFAULT_POLL_INTERVAL};
pub use render::{OverlapPolicy, Renderer};
pub use snapshot::{FailureKind, FetchError, Snapshot};
pub use source::{
    CupModel, HttpSource, SimulatedSource, SimulationConfig, SnapshotSource, DEFAULT_ENDPOINT,
};
