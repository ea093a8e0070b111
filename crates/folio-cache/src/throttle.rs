//! Leading-edge throttle for live subscriptions.

use std::time::Duration;

use folio_core::StorePath;
use tokio::time::Instant;

use crate::keys::subscription_key;

/// Default minimum spacing between deliveries.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(1000);

/// Per-subscription throttle bookkeeping.
///
/// The first snapshot is always admitted. After a delivery, snapshots are
/// rejected until `window` has elapsed.
#[derive(Debug, Clone)]
pub struct ThrottleState {
    key: String,
    path: StorePath,
    window: Duration,
    last_emit_at: Option<Instant>,
    delivered: u64,
    suppressed: u64,
}

impl ThrottleState {
    pub fn new(path: StorePath, window: Duration) -> Self {
        Self {
            key: subscription_key(&path),
            path,
            window,
            last_emit_at: None,
            delivered: 0,
            suppressed: 0,
        }
    }

    /// Decides whether a snapshot arriving at `now` is delivered.
    pub fn admit(&mut self, now: Instant) -> bool {
        let open = match self.last_emit_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.window,
        };
        if open {
            self.mark_emitted(now);
        } else {
            self.suppressed += 1;
        }
        open
    }

    /// Records a delivery made outside [`admit`](Self::admit), such as a
    /// trailing flush.
    pub fn mark_emitted(&mut self, now: Instant) {
        self.last_emit_at = Some(now);
        self.delivered += 1;
    }

    /// When the current window closes, if anything was delivered yet.
    pub fn window_end(&self) -> Option<Instant> {
        self.last_emit_at.map(|last| last + self.window)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last_emit_at(&self) -> Option<Instant> {
        self.last_emit_at
    }

    /// Snapshots delivered so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Snapshots rejected on arrival.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}
