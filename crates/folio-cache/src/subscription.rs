//! Live subscriptions to store paths.
//!
//! Each subscription owns a pump task that reads the store's change feed,
//! applies the throttle and forwards values to the consumer. Cancelling
//! (explicitly, through any handle clone, or by dropping the
//! [`Subscription`]) stops the pump and removes its throttle state.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use folio_core::StorePath;
use folio_store::{ChangeFeed, Snapshot};
use futures::Stream;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

use crate::metrics::{PushOutcome, record_subscription_push, update_active_subscriptions};
use crate::throttle::ThrottleState;

/// Values buffered per subscription before the pump waits on the consumer.
pub const SUBSCRIPTION_BUFFER: usize = 16;

/// Introspection data for one active subscription.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub id: u64,
    pub key: String,
    pub path: StorePath,
    pub throttle_ms: u64,
    pub trailing: bool,
    pub delivered: u64,
    pub suppressed: u64,
    pub ms_since_last_delivery: Option<u64>,
}

struct RegistryEntry {
    throttle: Arc<Mutex<ThrottleState>>,
    trailing: bool,
    cancel: watch::Sender<bool>,
}

/// Active subscriptions keyed by id.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Mutex<HashMap<u64, RegistryEntry>>,
    next_id: AtomicU64,
}

impl Registry {
    pub(crate) fn register(
        &self,
        throttle: ThrottleState,
        trailing: bool,
    ) -> (u64, Arc<Mutex<ThrottleState>>, watch::Receiver<bool>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let throttle = Arc::new(Mutex::new(throttle));
        let (cancel, cancel_rx) = watch::channel(false);
        let mut entries = self.entries.lock();
        entries.insert(
            id,
            RegistryEntry {
                throttle: Arc::clone(&throttle),
                trailing,
                cancel,
            },
        );
        update_active_subscriptions(entries.len());
        (id, throttle, cancel_rx)
    }

    /// Signals the pump and forgets the entry. False if already gone.
    pub(crate) fn cancel(&self, id: u64) -> bool {
        let mut entries = self.entries.lock();
        match entries.remove(&id) {
            Some(entry) => {
                entry.cancel.send_replace(true);
                update_active_subscriptions(entries.len());
                true
            },
            None => false,
        }
    }

    pub(crate) fn cancel_all(&self) -> usize {
        let mut entries = self.entries.lock();
        let count = entries.len();
        for (_, entry) in entries.drain() {
            entry.cancel.send_replace(true);
        }
        update_active_subscriptions(0);
        count
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.entries.lock().contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub(crate) fn snapshot(&self) -> Vec<SubscriptionInfo> {
        let now = Instant::now();
        let entries = self.entries.lock();
        let mut infos: Vec<SubscriptionInfo> = entries
            .iter()
            .map(|(id, entry)| {
                let throttle = entry.throttle.lock();
                SubscriptionInfo {
                    id: *id,
                    key: throttle.key().to_string(),
                    path: throttle.path().clone(),
                    throttle_ms: throttle.window().as_millis() as u64,
                    trailing: entry.trailing,
                    delivered: throttle.delivered(),
                    suppressed: throttle.suppressed(),
                    ms_since_last_delivery: throttle
                        .last_emit_at()
                        .map(|at| now.saturating_duration_since(at).as_millis() as u64),
                }
            })
            .collect();
        infos.sort_by_key(|info| info.id);
        infos
    }
}

/// Cloneable handle that cancels a subscription.
#[derive(Clone)]
pub struct SubscriptionHandle {
    id: u64,
    path: StorePath,
    cancelled: Arc<AtomicBool>,
    registry: Weak<Registry>,
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl SubscriptionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Stops the subscription. Only the first call has an effect.
    pub fn cancel(&self) -> bool {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.cancel(self.id);
        }
        debug!(id = self.id, path = %self.path, "Subscription cancelled");
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// True while the pump is running and the handle was not cancelled.
    pub fn is_active(&self) -> bool {
        !self.is_cancelled()
            && self
                .registry
                .upgrade()
                .is_some_and(|registry| registry.contains(self.id))
    }
}

/// Consumer side of a live subscription.
///
/// Yields the current value first, then throttled updates. Implements
/// [`Stream`]. Dropping it cancels the subscription.
pub struct Subscription {
    rx: mpsc::Receiver<Value>,
    handle: SubscriptionHandle,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .finish()
    }
}

impl Subscription {
    /// Waits for the next value. `None` once cancelled or the feed ended.
    pub async fn recv(&mut self) -> Option<Value> {
        if self.handle.is_cancelled() {
            return None;
        }
        let value = self.rx.recv().await;
        if self.handle.is_cancelled() {
            return None;
        }
        value
    }

    /// Returns a handle that can cancel this subscription from elsewhere.
    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    pub fn id(&self) -> u64 {
        self.handle.id
    }

    pub fn path(&self) -> &StorePath {
        &self.handle.path
    }

    /// Stops the subscription; buffered values are discarded.
    pub fn cancel(&mut self) -> bool {
        let first = self.handle.cancel();
        self.rx.close();
        first
    }
}

impl Stream for Subscription {
    type Item = Value;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Value>> {
        if self.handle.is_cancelled() {
            return Poll::Ready(None);
        }
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

/// Settings of one pump.
pub(crate) struct PumpConfig {
    pub path: StorePath,
    pub window: Duration,
    pub trailing: bool,
    pub fallback: Value,
}

/// Starts the pump task for `feed` and returns the consumer side.
pub(crate) fn spawn(registry: &Arc<Registry>, feed: ChangeFeed, config: PumpConfig) -> Subscription {
    let PumpConfig {
        path,
        window,
        trailing,
        fallback,
    } = config;

    let (id, throttle, cancel_rx) =
        registry.register(ThrottleState::new(path.clone(), window), trailing);
    let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);

    let handle = SubscriptionHandle {
        id,
        path: path.clone(),
        cancelled: Arc::new(AtomicBool::new(false)),
        registry: Arc::downgrade(registry),
    };

    let pump = Pump {
        id,
        path,
        feed,
        out: tx,
        throttle,
        trailing,
        fallback,
        cancel: cancel_rx,
        registry: Arc::downgrade(registry),
    };
    tokio::spawn(pump.run());

    Subscription { rx, handle }
}

struct Pump {
    id: u64,
    path: StorePath,
    feed: ChangeFeed,
    out: mpsc::Sender<Value>,
    throttle: Arc<Mutex<ThrottleState>>,
    trailing: bool,
    fallback: Value,
    cancel: watch::Receiver<bool>,
    registry: Weak<Registry>,
}

impl Pump {
    async fn run(self) {
        let Pump {
            id,
            path,
            mut feed,
            out,
            throttle,
            trailing,
            fallback,
            mut cancel,
            registry,
        } = self;

        debug!(id, path = %path, "Subscription started");
        let mut deferred: Option<Value> = None;

        loop {
            let flush_at = match deferred {
                Some(_) => throttle.lock().window_end(),
                None => None,
            };

            tokio::select! {
                biased;

                _ = cancelled(&mut cancel) => break,

                _ = out.closed() => break,

                _ = sleep_until(flush_at.unwrap_or_else(Instant::now)), if flush_at.is_some() => {
                    if let Some(value) = deferred.take() {
                        throttle.lock().mark_emitted(Instant::now());
                        record_subscription_push(PushOutcome::Delivered);
                        if !deliver(&out, &mut cancel, value).await {
                            break;
                        }
                    }
                }

                snapshot = feed.recv() => {
                    let Some(snapshot) = snapshot else {
                        debug!(id, path = %path, "Change feed ended");
                        break;
                    };
                    let value = resolve(&path, snapshot, &fallback);
                    let admitted = throttle.lock().admit(Instant::now());
                    if admitted {
                        deferred = None;
                        record_subscription_push(PushOutcome::Delivered);
                        if !deliver(&out, &mut cancel, value).await {
                            break;
                        }
                    } else if trailing {
                        record_subscription_push(PushOutcome::Deferred);
                        deferred = Some(value);
                    } else {
                        record_subscription_push(PushOutcome::Dropped);
                    }
                }
            }
        }

        if let Some(registry) = registry.upgrade() {
            registry.cancel(id);
        }
        debug!(id, path = %path, "Subscription stopped");
    }
}

/// Turns a feed snapshot into the value handed to the consumer.
fn resolve(path: &StorePath, snapshot: Snapshot, fallback: &Value) -> Value {
    match snapshot {
        Ok(Some(value)) => value,
        Ok(None) => {
            record_subscription_push(PushOutcome::Fallback);
            debug!(path = %path, "No data at path, delivering fallback");
            fallback.clone()
        },
        Err(e) => {
            record_subscription_push(PushOutcome::Fallback);
            warn!(path = %path, error = %e, "Subscription error, delivering fallback");
            fallback.clone()
        },
    }
}

/// Completes once the subscription is cancelled or its handle dropped.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|cancelled| *cancelled).await;
}

/// Sends unless cancelled first. False when the pump should stop.
async fn deliver(out: &mpsc::Sender<Value>, cancel: &mut watch::Receiver<bool>, value: Value) -> bool {
    tokio::select! {
        biased;
        _ = cancelled(cancel) => false,
        sent = out.send(value) => sent.is_ok(),
    }
}
