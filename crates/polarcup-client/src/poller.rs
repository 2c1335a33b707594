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

//! Fetch-format-render loop.
//!
//! A [`Poller`] runs one cycle per call to [`Poller::update_data`]. Calling
//! [`Poller::start`] moves it into a background task that fires a cycle
//! immediately and then once per interval, returning a [`PollerHandle`] that
//! owns the loop's lifetime.
//!
//! Cycles are never serialized: each firing spawns its own task, so a slow
//! request can still be in flight when the next one is issued. Which of two
//! overlapping responses ends up on screen is decided by the
//! [`OverlapPolicy`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::diagnostics::{record, DiagnosticLevel, SharedDiagnostics};
use crate::display::SharedDisplay;
use crate::render::{OverlapPolicy, Renderer};
use crate::snapshot::{FailureKind, Snapshot};
use crate::source::SnapshotSource;

/// Default time between cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Configuration for a [`Poller`].
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Time between cycle starts. Zero is treated as one millisecond.
    pub interval: Duration,
    /// How overlapping responses are reconciled.
    pub overlap_policy: OverlapPolicy,
    /// Buffer size of the outcome broadcast channel.
    pub event_capacity: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            overlap_policy: OverlapPolicy::default(),
            event_capacity: 64,
        }
    }
}

/// Result of a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The snapshot was rendered.
    Rendered { ticket: u64, snapshot: Snapshot },
    /// The snapshot arrived after a newer cycle had already rendered and was
    /// dropped.
    Superseded { ticket: u64 },
    /// Fetching or decoding failed; the display was left untouched.
    Failed {
        ticket: u64,
        kind: FailureKind,
        message: String,
    },
}

impl CycleOutcome {
    #[must_use]
    pub fn ticket(&self) -> u64 {
        match self {
            Self::Rendered { ticket, .. }
            | Self::Superseded { ticket }
            | Self::Failed { ticket, .. } => *ticket,
        }
    }

    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// Drives snapshots from a source into a display.
pub struct Poller<S> {
    source: S,
    renderer: Renderer,
    diagnostics: SharedDiagnostics,
    interval: Duration,
    next_ticket: AtomicU64,
    events: broadcast::Sender<CycleOutcome>,
}

impl<S> std::fmt::Debug for Poller<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("renderer", &self.renderer)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl<S: SnapshotSource> Poller<S> {
    /// Create a poller that renders into `display`.
    ///
    /// The display handle is captured here; cycles never look targets up
    /// again.
    #[must_use]
    pub fn new(
        source: S,
        display: SharedDisplay,
        diagnostics: SharedDiagnostics,
        config: PollerConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            source,
            renderer: Renderer::new(display, config.overlap_policy),
            diagnostics,
            interval: config.interval.max(Duration::from_millis(1)),
            next_ticket: AtomicU64::new(0),
            events,
        }
    }

    /// Subscribe to the outcome of every subsequent cycle.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CycleOutcome> {
        self.events.subscribe()
    }

    /// Run one fetch-format-render cycle.
    ///
    /// Failures are logged and recorded, never returned as errors; the
    /// display keeps whatever the last accepted snapshot put there.
    pub async fn update_data(&self) -> CycleOutcome {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let outcome = match self.source.fetch().await {
            Ok(snapshot) => {
                if self.renderer.render(ticket, &snapshot) {
                    CycleOutcome::Rendered { ticket, snapshot }
                } else {
                    debug!("Dropping response for cycle {ticket}; a newer cycle already rendered");
                    record(
                        &self.diagnostics,
                        DiagnosticLevel::Warning,
                        format!("Cycle {ticket} superseded by a newer response"),
                    );
                    CycleOutcome::Superseded { ticket }
                }
            }
            Err(e) => {
                error!("Error fetching data: {e}");
                record(
                    &self.diagnostics,
                    DiagnosticLevel::Error,
                    format!("Cycle {ticket} failed: {e}"),
                );
                CycleOutcome::Failed {
                    ticket,
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        };

        // No subscribers is fine
        let _ = self.events.send(outcome.clone());
        outcome
    }

    /// Start polling in a background task.
    ///
    /// The first cycle is issued immediately. Must be called from within a
    /// Tokio runtime.
    #[must_use]
    pub fn start(self) -> PollerHandle {
        let interval = self.interval;
        let events = self.events.clone();
        let diagnostics = Arc::clone(&self.diagnostics);
        let cancel_token = CancellationToken::new();

        info!("Starting poller (every {} ms)", interval.as_millis());
        record(
            &diagnostics,
            DiagnosticLevel::Info,
            format!("Polling every {} ms", interval.as_millis()),
        );

        let task = tokio::spawn(poll_loop(Arc::new(self), interval, cancel_token.clone()));

        PollerHandle {
            cancel_token,
            events,
            diagnostics,
            task,
        }
    }
}

async fn poll_loop<S: SnapshotSource>(
    poller: Arc<Poller<S>>,
    period: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let poller = Arc::clone(&poller);
                let cycle_cancel = cancel_token.clone();

                tokio::spawn(async move {
                    tokio::select! {
                        _ = poller.update_data() => {}
                        () = cycle_cancel.cancelled() => {}
                    }
                });
            }

            () = cancel_token.cancelled() => {
                info!("Poller stopped");
                return;
            }
        }
    }
}

/// Owned handle to a running poll loop.
///
/// Dropping the handle stops the loop.
pub struct PollerHandle {
    cancel_token: CancellationToken,
    events: broadcast::Sender<CycleOutcome>,
    diagnostics: SharedDiagnostics,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for PollerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollerHandle")
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl PollerHandle {
    /// Stop the loop and abandon any cycles still in flight.
    pub fn stop(&self) {
        if self.cancel_token.is_cancelled() {
            return;
        }

        info!("Stopping poller");
        record(&self.diagnostics, DiagnosticLevel::Info, "Polling stopped".to_string());
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.cancel_token.is_cancelled() && !self.task.is_finished()
    }

    /// Subscribe to the outcome of every subsequent cycle.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CycleOutcome> {
        self.events.subscribe()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::new_shared_diagnostics;
    use crate::display::{lock_display, new_shared_display, StatusClass};
    use crate::snapshot::FetchError;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    enum Reply {
        Snapshot(Snapshot),
        Unreachable,
        Malformed(&'static [u8]),
        Status(u16),
    }

    struct Step {
        delay: Duration,
        reply: Reply,
    }

    /// Source that replays a fixed list of replies, each after a delay.
    struct ScriptedSource {
        script: Mutex<VecDeque<Step>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                script: Mutex::new(steps.into()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl SnapshotSource for ScriptedSource {
        async fn fetch(&self) -> Result<Snapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.script.lock().unwrap().pop_front();
            let Some(step) = step else {
                return Err(FetchError::Transport("script exhausted".into()));
            };

            tokio::time::sleep(step.delay).await;
            match step.reply {
                Reply::Snapshot(snapshot) => Ok(snapshot),
                Reply::Unreachable => Err(FetchError::Transport("connection refused".into())),
                Reply::Malformed(body) => Snapshot::from_json(body),
                Reply::Status(code) => Err(FetchError::Status(code)),
            }
        }
    }

    fn reading(temperature: f64) -> Snapshot {
        Snapshot {
            temperature,
            quantity: 500.0,
            needs_cooling: false,
            cooling_time_remaining: 0.0,
        }
    }

    fn ok(delay_ms: u64, snapshot: Snapshot) -> Step {
        Step {
            delay: Duration::from_millis(delay_ms),
            reply: Reply::Snapshot(snapshot),
        }
    }

    fn scripted_poller(
        steps: Vec<Step>,
        policy: OverlapPolicy,
    ) -> (Poller<ScriptedSource>, SharedDisplay, SharedDiagnostics, Arc<AtomicUsize>) {
        let source = ScriptedSource::new(steps);
        let calls = Arc::clone(&source.calls);
        let display = new_shared_display();
        let diagnostics = new_shared_diagnostics();
        let poller = Poller::new(
            source,
            display.clone(),
            diagnostics.clone(),
            PollerConfig {
                overlap_policy: policy,
                ..Default::default()
            },
        );
        (poller, display, diagnostics, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_data_renders_snapshot() {
        let cooling = Snapshot {
            temperature: 9.2,
            quantity: 120.0,
            needs_cooling: true,
            cooling_time_remaining: 15.0,
        };
        let (poller, display, _, _) =
            scripted_poller(vec![ok(0, cooling)], OverlapPolicy::default());

        let outcome = poller.update_data().await;
        assert_eq!(outcome, CycleOutcome::Rendered { ticket: 1, snapshot: cooling });

        let model = lock_display(&display);
        assert_eq!(model.temperature.text(), "9.2°C");
        assert_eq!(model.quantity.text(), "120 ml");
        assert_eq!(model.cooling_status.active_class(), Some(StatusClass::CoolingActive));
        assert_eq!(model.cooling_status.time_text.text(), "Tiempo restante: 15 minutos");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycle_keeps_previous_display() {
        let steps = vec![
            ok(0, reading(4.0)),
            Step {
                delay: Duration::ZERO,
                reply: Reply::Unreachable,
            },
        ];
        let (poller, display, diagnostics, _) = scripted_poller(steps, OverlapPolicy::default());

        assert!(poller.update_data().await.is_rendered());
        let before = lock_display(&display).clone();

        let outcome = poller.update_data().await;
        assert!(matches!(
            outcome,
            CycleOutcome::Failed { ticket: 2, kind: FailureKind::Transport, .. }
        ));

        let after = lock_display(&display).clone();
        assert_eq!(after.temperature, before.temperature);
        assert_eq!(after.quantity, before.quantity);
        assert_eq!(after.cooling_status, before.cooling_status);
        assert_eq!(after.rendered_ticket(), 1);

        let log = diagnostics.lock().unwrap();
        assert_eq!(log.count(DiagnosticLevel::Error), 1);
        assert!(log.latest().unwrap().message.contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_response_keeps_previous_display() {
        let steps = vec![
            ok(0, reading(4.0)),
            Step {
                delay: Duration::ZERO,
                reply: Reply::Malformed(br#"{"temperature": "x"}"#),
            },
            Step {
                delay: Duration::ZERO,
                reply: Reply::Status(503),
            },
        ];
        let (poller, display, diagnostics, _) = scripted_poller(steps, OverlapPolicy::default());

        assert!(poller.update_data().await.is_rendered());
        let before = lock_display(&display).clone();

        let outcome = poller.update_data().await;
        assert!(matches!(
            outcome,
            CycleOutcome::Failed { ticket: 2, kind: FailureKind::Parse, .. }
        ));

        let outcome = poller.update_data().await;
        assert!(matches!(
            outcome,
            CycleOutcome::Failed { ticket: 3, kind: FailureKind::Status, .. }
        ));

        let after = lock_display(&display).clone();
        assert_eq!(after.temperature.text(), "4.0°C");
        assert_eq!(after.quantity, before.quantity);
        assert_eq!(after.cooling_status, before.cooling_status);
        assert_eq!(after.last_updated, before.last_updated);
        assert_eq!(after.rendered_ticket(), 1);

        assert_eq!(diagnostics.lock().unwrap().count(DiagnosticLevel::Error), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_fires_immediately() {
        let (poller, display, _, calls) =
            scripted_poller(vec![ok(0, reading(4.0))], OverlapPolicy::default());

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(lock_display(&display).temperature.text(), "4.0°C");
        assert!(handle.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_every_interval() {
        let steps = vec![ok(0, reading(1.0)), ok(0, reading(2.0)), ok(0, reading(3.0))];
        let (poller, display, _, calls) = scripted_poller(steps, OverlapPolicy::default());

        let _handle = poller.start();
        tokio::time::sleep(Duration::from_millis(10_001)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let model = lock_display(&display);
        assert_eq!(model.temperature.text(), "3.0°C");
        assert_eq!(model.rendered_ticket(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_issued_ignores_slow_older_response() {
        // Cycle 1 takes 7s, cycle 2 (issued at 5s) takes 1s
        let steps = vec![ok(7_000, reading(10.0)), ok(1_000, reading(20.0))];
        let (poller, display, diagnostics, _) = scripted_poller(steps, OverlapPolicy::LatestIssued);
        let mut outcomes = poller.subscribe();

        let _handle = poller.start();
        tokio::time::sleep(Duration::from_millis(8_000)).await;

        assert_eq!(lock_display(&display).temperature.text(), "20.0°C");
        assert_eq!(outcomes.recv().await.unwrap().ticket(), 2);
        assert_eq!(outcomes.recv().await.unwrap(), CycleOutcome::Superseded { ticket: 1 });
        assert_eq!(diagnostics.lock().unwrap().count(DiagnosticLevel::Warning), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_completed_lets_slow_response_win() {
        let steps = vec![ok(7_000, reading(10.0)), ok(1_000, reading(20.0))];
        let (poller, display, _, _) = scripted_poller(steps, OverlapPolicy::LastCompleted);

        let _handle = poller.start();
        tokio::time::sleep(Duration::from_millis(8_000)).await;

        assert_eq!(lock_display(&display).temperature.text(), "10.0°C");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_the_loop() {
        let steps = vec![
            Step {
                delay: Duration::ZERO,
                reply: Reply::Unreachable,
            },
            ok(0, reading(5.5)),
        ];
        let (poller, display, _, calls) = scripted_poller(steps, OverlapPolicy::default());

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(5_001)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(lock_display(&display).temperature.text(), "5.5°C");
        assert!(handle.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_polling() {
        let (poller, _, diagnostics, calls) =
            scripted_poller(vec![ok(0, reading(4.0))], OverlapPolicy::default());

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.stop();
        tokio::time::sleep(Duration::from_millis(20_000)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!handle.is_running());

        let log = diagnostics.lock().unwrap();
        assert_eq!(log.latest().unwrap().message, "Polling stopped");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_abandons_in_flight_cycle() {
        let (poller, display, _, _) =
            scripted_poller(vec![ok(3_000, reading(4.0))], OverlapPolicy::default());

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        handle.stop();
        tokio::time::sleep(Duration::from_millis(5_000)).await;

        assert_eq!(lock_display(&display).rendered_ticket(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_polling() {
        let (poller, _, _, calls) =
            scripted_poller(vec![ok(0, reading(4.0))], OverlapPolicy::default());

        let handle = poller.start();
        tokio::time::sleep(Duration::from_millis(1)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_millis(20_000)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
