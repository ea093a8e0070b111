//! Store connection state tracking.

use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

/// Tracks how the last operations against a store went.
#[derive(Debug)]
pub struct ConnectionState {
    /// The last successful operation time.
    last_success: RwLock<Option<Instant>>,
    /// The last error message, if any.
    last_error: RwLock<Option<String>>,
    /// Number of consecutive failures.
    failure_count: RwLock<u32>,
}

/// Serializable view of a `ConnectionState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    pub healthy: bool,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_since_success: Option<u64>,
}

impl ConnectionState {
    /// Creates a new ConnectionState.
    pub fn new() -> Self {
        Self {
            last_success: RwLock::new(None),
            last_error: RwLock::new(None),
            failure_count: RwLock::new(0),
        }
    }

    /// Returns the time of the last successful operation.
    pub fn last_success(&self) -> Option<Instant> {
        *self.last_success.read()
    }

    /// Returns the duration since the last success.
    pub fn time_since_success(&self) -> Option<Duration> {
        self.last_success.read().map(|t| t.elapsed())
    }

    /// Records a successful operation.
    pub fn record_success(&self) {
        let mut last_success = self.last_success.write();
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *last_success = Some(Instant::now());
        *last_error = None;
        *failure_count = 0;
    }

    /// Records a failed operation.
    pub fn record_failure(&self, error: impl Into<String>) {
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *last_error = Some(error.into());
        *failure_count += 1;
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Returns the number of consecutive failures.
    pub fn failure_count(&self) -> u32 {
        *self.failure_count.read()
    }

    /// Returns true unless the most recent operation failed.
    pub fn is_healthy(&self) -> bool {
        self.last_error.read().is_none()
    }

    /// Snapshot for health endpoints.
    pub fn report(&self) -> ConnectionReport {
        ConnectionReport {
            healthy: self.is_healthy(),
            consecutive_failures: self.failure_count(),
            last_error: self.last_error(),
            seconds_since_success: self.time_since_success().map(|d| d.as_secs()),
        }
    }

    /// Resets all state.
    pub fn reset(&self) {
        let mut last_success = self.last_success.write();
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();

        *last_success = None;
        *last_error = None;
        *failure_count = 0;
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}
