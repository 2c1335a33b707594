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

//! Application configuration management.
//!
//! This module handles persistent configuration storage using TOML format.
//! It covers the snapshot endpoint, poll timing, the overlap policy and the
//! parameters of the simulated cup.

use std::time::Duration;

use log::warn;
use polarcup_client::{OverlapPolicy, PollerConfig, SimulationConfig, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "polarcup-desktop";
const CONFIG_NAME: &str = "config";

/// Schema version written by this build
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Schema version the file was written with
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Snapshot endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Time between poll cycles in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-request timeout in milliseconds (none waits indefinitely)
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// How overlapping responses are reconciled
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,

    /// Poll the built-in simulated cup instead of the endpoint
    #[serde(default)]
    pub simulate: bool,

    /// Simulated cup parameters
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Show the diagnostics window on startup
    #[serde(default = "default_true")]
    pub show_diagnostics: bool,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            endpoint: default_endpoint(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: None,
            overlap_policy: OverlapPolicy::default(),
            simulate: false,
            simulation: SimulationConfig::default(),
            show_diagnostics: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if absent.
    ///
    /// A file stamped with another schema version is rewritten at the current
    /// version; fields it lacks take their defaults.
    pub fn load() -> Result<Self, confy::ConfyError> {
        let config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        let (config, upgraded) = config.upgrade();
        if upgraded {
            config.save()?;
        }
        Ok(config)
    }

    /// Stamp the current schema version, reporting whether it changed
    fn upgrade(mut self) -> (Self, bool) {
        if self.config_version == CURRENT_CONFIG_VERSION {
            return (self, false);
        }

        warn!(
            "Configuration version {} differs from {}, rewriting",
            self.config_version, CURRENT_CONFIG_VERSION
        );
        self.config_version = CURRENT_CONFIG_VERSION;
        (self, true)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Poller settings derived from this configuration
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: self.poll_interval(),
            overlap_policy: self.overlap_policy,
            ..Default::default()
        }
    }

    /// Short description of where snapshots come from
    pub fn source_label(&self) -> String {
        if self.simulate {
            "simulated cup".to_string()
        } else {
            self.endpoint.clone()
        }
    }
}
