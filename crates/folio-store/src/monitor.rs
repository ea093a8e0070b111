//! Background store health monitoring.
//!
//! The monitor pings the store on a fixed interval while it answers. After
//! `max_failures` consecutive failures it slows down, using the same
//! exponential schedule as `RetryPolicy`, until the store recovers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::retry::RetryPolicy;
use crate::state::ConnectionState;
use crate::store::RemoteStore;

/// Configuration for the health monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between checks while the store is healthy.
    pub interval: Duration,
    /// Consecutive failures tolerated before backing off.
    pub max_failures: u32,
    /// Growth factor of the interval once backing off.
    pub backoff_multiplier: f64,
    /// Ceiling for the backed-off interval.
    pub max_backoff: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_failures: 3,
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(300),
        }
    }
}

impl MonitorConfig {
    /// Backoff schedule starting at `interval` and capped at `max_backoff`.
    pub fn backoff(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: 0,
            base_delay: self.interval,
            backoff_multiplier: self.backoff_multiplier,
            max_delay: self.max_backoff.max(self.interval),
        }
    }

    /// Wait before the next check given the consecutive failures so far.
    pub fn delay_after(&self, failures: u32) -> Duration {
        if failures < self.max_failures {
            return self.interval;
        }
        self.backoff().delay_for(failures - self.max_failures + 1)
    }
}

/// Handle for controlling a running health monitor.
#[derive(Debug)]
pub struct MonitorHandle {
    shutdown_tx: watch::Sender<bool>,
}

impl MonitorHandle {
    /// Signals the monitor to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// True once `stop` was called.
    pub fn is_stopped(&self) -> bool {
        *self.shutdown_tx.borrow()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Periodically checks a store and records the outcome in a shared
/// `ConnectionState`.
pub struct HealthMonitor {
    store: Arc<dyn RemoteStore>,
    state: Arc<ConnectionState>,
    config: MonitorConfig,
}

impl HealthMonitor {
    pub fn new(store: Arc<dyn RemoteStore>, state: Arc<ConnectionState>, config: MonitorConfig) -> Self {
        Self { store, state, config }
    }

    /// Starts the background task. The first check runs immediately.
    ///
    /// Returns a handle that stops the monitor when dropped.
    pub fn start(self) -> MonitorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(self.run(shutdown_rx));
        MonitorHandle { shutdown_tx }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            store = self.store.name(),
            interval_secs = self.config.interval.as_secs(),
            "Starting store health monitor"
        );

        loop {
            self.check().await;
            let delay = self.next_delay();

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                // Err means the handle is gone, which also stops us
                _ = shutdown_rx.wait_for(|stopped| *stopped) => break,
            }
        }

        info!(store = self.store.name(), "Store health monitor stopped");
    }

    /// Performs one health check.
    pub async fn check(&self) {
        match self.store.health_check().await {
            Ok(()) => {
                self.state.record_success();
                debug!(store = self.store.name(), "Store healthy");
            },
            Err(e) => {
                self.state.record_failure(e.to_string());
                warn!(
                    store = self.store.name(),
                    failures = self.state.failure_count(),
                    error = %e,
                    "Store health check failed"
                );
            },
        }
        metrics::gauge!("folio_store_consecutive_failures").set(f64::from(self.state.failure_count()));
    }

    /// Wait before the next check, derived from the recorded failures.
    pub fn next_delay(&self) -> Duration {
        self.config.delay_after(self.state.failure_count())
    }
}
