//! Periodic liveness polling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use railqa_core::RailqaConfig;
use railqa_gateway::{call_with_timeout, Gateway, Probe};

use crate::status::{HealthState, ServiceStatus};

/// Probes the backend dependencies and publishes their status.
///
/// Cloning is cheap; clones share the same published state.
#[derive(Clone)]
pub struct HealthMonitor {
    gateway: Arc<dyn Gateway>,
    poll_interval: Duration,
    probe_timeout: Duration,
    state: Arc<watch::Sender<HealthState>>,
    /// Number of the last round started.
    rounds: Arc<AtomicU64>,
    /// Round of the result currently shown for each probe, by `slot`.
    recorded: Arc<Mutex<[u64; 3]>>,
}

fn slot(probe: Probe) -> usize {
    match probe {
        Probe::Backend => 0,
        Probe::InferenceRuntime => 1,
        Probe::VectorStore => 2,
    }
}

impl HealthMonitor {
    pub fn new(gateway: Arc<dyn Gateway>, config: &RailqaConfig) -> Self {
        let (state, _) = watch::channel(HealthState::default());
        Self {
            gateway,
            poll_interval: config.health.poll_interval(),
            probe_timeout: config.gateway.probe_timeout(),
            state: Arc::new(state),
            rounds: Arc::new(AtomicU64::new(0)),
            recorded: Arc::new(Mutex::new([0; 3])),
        }
    }

    pub fn snapshot(&self) -> HealthState {
        *self.state.borrow()
    }

    /// Receiver that is notified on every status transition.
    pub fn subscribe(&self) -> watch::Receiver<HealthState> {
        self.state.subscribe()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run one round of all three probes concurrently and return the result.
    pub async fn poll_once(&self) -> HealthState {
        let round = self.next_round();
        let [backend, runtime, store] = Probe::ALL.map(|probe| async move {
            let status = self.check(probe).await;
            self.record(probe, round, status);
        });
        tokio::join!(backend, runtime, store);
        self.snapshot()
    }

    /// Start background polling: one round now, then one per interval.
    ///
    /// Polling stops when the returned handle is deactivated or dropped.
    pub fn activate(&self) -> PollHandle {
        let token = CancellationToken::new();
        let monitor = self.clone();
        let task = tokio::spawn(monitor.run(token.clone()));
        tracing::info!(
            interval_secs = self.poll_interval.as_secs(),
            "Health polling activated"
        );
        PollHandle { token, task }
    }

    async fn run(self, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                return;
            }
            let round = self.next_round();
            for probe in Probe::ALL {
                self.spawn_probe(probe, round, token.clone());
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = token.cancelled() => {
                    tracing::debug!("Health polling loop stopped");
                    return;
                }
            }
        }
    }

    fn next_round(&self) -> u64 {
        self.rounds.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn spawn_probe(&self, probe: Probe, round: u64, token: CancellationToken) {
        let monitor = self.clone();
        tokio::spawn(async move {
            let status = monitor.check(probe).await;
            if token.is_cancelled() {
                tracing::debug!(service = %probe, "Discarding probe result after deactivation");
                return;
            }
            monitor.record(probe, round, status);
        });
    }

    async fn check(&self, probe: Probe) -> ServiceStatus {
        match call_with_timeout(self.probe_timeout, self.gateway.probe(probe)).await {
            Ok(()) => ServiceStatus::Online,
            Err(e) => {
                tracing::debug!(service = %probe, error = %e, "Probe failed");
                ServiceStatus::Offline
            }
        }
    }

    /// Apply a probe result unless a later round already reported for it.
    fn record(&self, probe: Probe, round: u64, status: ServiceStatus) {
        let mut recorded = self.recorded.lock().expect("round mutex poisoned");
        if round < recorded[slot(probe)] {
            tracing::debug!(service = %probe, round, "Discarding result from an older round");
            return;
        }
        recorded[slot(probe)] = round;

        let changed = self.state.send_if_modified(|state| {
            if state.get(probe) == status {
                return false;
            }
            state.set(probe, status);
            true
        });
        if changed {
            tracing::info!(service = %probe, status = %status, "Service status changed");
        }
    }
}

/// Owns a running poll task. Dropping it stops polling.
pub struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the poll timer. Probes already in flight finish, but their
    /// results are not recorded.
    pub fn deactivate(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("Health polling deactivated");
        }
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Whether the poll loop itself has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
