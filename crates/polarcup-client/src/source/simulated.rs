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

//! Simulated cup.
//!
//! Produces snapshots the way the cup firmware derives them from its sensors,
//! so the dashboard can be exercised without hardware. Every fetch advances
//! the model by one simulated minute.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::SnapshotSource;
use crate::snapshot::{FetchError, Snapshot};

/// Milliliters of water per gram, as used by the load cell conversion.
const WATER_ML_PER_GRAM: f64 = 0.9982;

/// Reported volume when the load cell reads negative (empty or untared cup).
const EMPTY_CUP_VOLUME_ML: f64 = 10.0;

/// Largest volume the cup can hold.
const MAX_VOLUME_ML: f64 = 1000.0;

/// Parameters of the simulated cup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Temperature at or below which no cooling is needed (°C).
    pub optimal_temperature: f64,
    /// Cooling rate while the plate is on (°C per minute).
    pub efficiency: f64,
    /// Temperature the liquid drifts back to when idle (°C).
    pub ambient_temperature: f64,
    /// Warming rate while idle (°C per minute).
    pub warming_rate: f64,
    /// Liquid temperature when the simulation starts (°C).
    pub initial_temperature: f64,
    /// Load cell reading (grams).
    pub weight_grams: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            optimal_temperature: 4.0,
            efficiency: 0.5,
            ambient_temperature: 22.0,
            warming_rate: 0.2,
            initial_temperature: 9.0,
            weight_grams: 250.0,
        }
    }
}

/// Thermal model of the cup.
#[derive(Debug, Clone)]
pub struct CupModel {
    config: SimulationConfig,
    temperature: f64,
}

impl CupModel {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            temperature: config.initial_temperature,
            config,
        }
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Convert a load cell reading to a clamped liquid volume.
    #[must_use]
    pub fn volume_ml(weight_grams: f64) -> f64 {
        let volume = weight_grams * WATER_ML_PER_GRAM;
        if volume < 0.0 {
            EMPTY_CUP_VOLUME_ML
        } else {
            volume.min(MAX_VOLUME_ML)
        }
    }

    #[must_use]
    pub fn needs_cooling(&self) -> bool {
        self.temperature > self.config.optimal_temperature
    }

    /// Whole minutes until the optimal temperature is reached.
    #[must_use]
    pub fn cooling_time_remaining(&self) -> f64 {
        if !self.needs_cooling() || self.config.efficiency <= 0.0 {
            return 0.0;
        }
        ((self.temperature - self.config.optimal_temperature) / self.config.efficiency).ceil()
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            temperature: self.temperature,
            quantity: Self::volume_ml(self.config.weight_grams),
            needs_cooling: self.needs_cooling(),
            cooling_time_remaining: self.cooling_time_remaining(),
        }
    }

    /// Advance one minute: cool toward the optimum, or drift toward ambient.
    pub fn step(&mut self) {
        let optimal = self.config.optimal_temperature;
        if self.needs_cooling() {
            self.temperature = (self.temperature - self.config.efficiency.max(0.0)).max(optimal);
        } else if self.temperature < self.config.ambient_temperature {
            self.temperature =
                (self.temperature + self.config.warming_rate).min(self.config.ambient_temperature);
        }
    }
}

/// Snapshot source backed by a [`CupModel`].
#[derive(Debug)]
pub struct SimulatedSource {
    model: Mutex<CupModel>,
}

impl SimulatedSource {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            model: Mutex::new(CupModel::new(config)),
        }
    }

    /// Report the current state, then advance the model.
    pub fn next_snapshot(&self) -> Snapshot {
        let mut model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = model.snapshot();
        model.step();
        snapshot
    }
}

impl SnapshotSource for SimulatedSource {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        Ok(self.next_snapshot())
    }
}
