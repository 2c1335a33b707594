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

mod config;
mod dashboard;

use std::error::Error;

use clap::{Parser, ValueEnum};
use config::AppConfig;
use dashboard::DashboardApp;
use log::{debug, info, warn};
use polarcup_client::{
    lock_diagnostics, lock_display, new_shared_diagnostics, new_shared_display, CycleOutcome,
    HttpSource, OverlapPolicy, Poller, PollerHandle, SharedDiagnostics, SharedDisplay,
    SimulatedSource,
};
use tokio::sync::broadcast::{self, error::RecvError};

/// Live display for Polar Cup cooling telemetry.
#[derive(Parser, Debug)]
#[command(name = "polarcup-desktop", version, about)]
struct Cli {
    /// Snapshot endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Time between poll cycles in milliseconds
    #[arg(short, long)]
    interval_ms: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// How overlapping responses are reconciled
    #[arg(long)]
    overlap: Option<OverlapArg>,

    /// Poll the built-in simulated cup instead of the endpoint
    #[arg(long)]
    simulate: bool,

    /// Run without a window and log each update
    #[arg(long)]
    headless: bool,

    /// Persist the effective configuration before starting
    #[arg(long)]
    save_config: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OverlapArg {
    /// Show the newest issued cycle, drop older responses that finish late
    LatestIssued,
    /// Show whichever response finishes last
    LastCompleted,
}

impl From<OverlapArg> for OverlapPolicy {
    fn from(arg: OverlapArg) -> Self {
        match arg {
            OverlapArg::LatestIssued => OverlapPolicy::LatestIssued,
            OverlapArg::LastCompleted => OverlapPolicy::LastCompleted,
        }
    }
}

/// Apply command line overrides on top of the stored configuration
fn apply_cli(config: &mut AppConfig, cli: &Cli) {
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.poll_interval_ms = interval_ms;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout_ms = Some(timeout_ms);
    }
    if let Some(overlap) = cli.overlap {
        config.overlap_policy = overlap.into();
    }
    if cli.simulate {
        config.simulate = true;
    }
}

/// Build the configured source and start polling it.
///
/// The outcome receiver is subscribed before the first cycle fires.
fn start_poller(
    config: &AppConfig,
    display: SharedDisplay,
    diagnostics: SharedDiagnostics,
) -> Result<(PollerHandle, broadcast::Receiver<CycleOutcome>), Box<dyn Error>> {
    let poller_config = config.poller_config();

    if config.simulate {
        info!("Using simulated cup");
        let source = SimulatedSource::new(config.simulation);
        let poller = Poller::new(source, display, diagnostics, poller_config);
        let outcomes = poller.subscribe();
        Ok((poller.start(), outcomes))
    } else {
        let source =
            HttpSource::new(config.endpoint.clone())?.with_timeout(config.request_timeout());
        info!("Polling {} ({} overlap)", source.endpoint(), config.overlap_policy);
        let poller = Poller::new(source, display, diagnostics, poller_config);
        let outcomes = poller.subscribe();
        Ok((poller.start(), outcomes))
    }
}

async fn run_headless(
    poller: PollerHandle,
    mut outcomes: broadcast::Receiver<CycleOutcome>,
    display: SharedDisplay,
    diagnostics: SharedDiagnostics,
) -> Result<(), Box<dyn Error>> {
    info!("Running headless, press Ctrl-C to stop");

    loop {
        tokio::select! {
            outcome = outcomes.recv() => match outcome {
                Ok(CycleOutcome::Rendered { ticket, snapshot }) => {
                    let line = {
                        let model = lock_display(&display);
                        format!(
                            "{} | {} | {} {}",
                            model.temperature.text(),
                            model.quantity.text(),
                            model.cooling_status.status_text.text(),
                            model.cooling_status.time_text.text(),
                        )
                    };
                    info!("#{ticket} {}", line.trim_end());
                    debug!("#{ticket} snapshot {}", serde_json::to_string(&snapshot)?);
                }
                // Failures and superseded responses are already logged by the poller
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => warn!("Missed {missed} cycle outcomes"),
                Err(RecvError::Closed) => break,
            },

            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Interrupted");
                break;
            }
        }
    }

    poller.stop();

    let session: Vec<_> = lock_diagnostics(&diagnostics).iter().cloned().collect();
    debug!("Session diagnostics {}", serde_json::to_string(&session)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {e}");
        AppConfig::default()
    });
    apply_cli(&mut config, &cli);

    if cli.save_config {
        config.save()?;
        match AppConfig::get_config_path() {
            Ok(path) => info!("Saved configuration to {}", path.display()),
            Err(_) => info!("Saved configuration"),
        }
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let display = new_shared_display();
    let diagnostics = new_shared_diagnostics();

    let (poller, outcomes) = {
        let _guard = runtime.enter();
        start_poller(&config, display.clone(), diagnostics.clone())?
    };

    if cli.headless {
        return runtime.block_on(run_headless(poller, outcomes, display, diagnostics));
    }
    drop(outcomes);

    let app = DashboardApp::new(
        display,
        diagnostics,
        poller,
        config.source_label(),
        config.poll_interval(),
        config.show_diagnostics,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([460.0, 340.0])
            .with_title("Polar Cup"),
        ..Default::default()
    };

    eframe::run_native(
        "Polar Cup",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )?;

    Ok(())
}
