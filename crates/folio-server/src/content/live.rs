//! Typed live views.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use folio_cache::{Subscription, SubscriptionHandle};
use folio_core::StorePath;
use futures::Stream;
use serde_json::Value;

type Decoder<T> = Box<dyn Fn(Value) -> T + Send + Sync>;

/// A subscription whose deliveries are decoded into `T`.
///
/// Dropping the feed cancels the underlying subscription.
pub struct LiveFeed<T> {
    subscription: Subscription,
    decode: Decoder<T>,
}

impl<T> fmt::Debug for LiveFeed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveFeed")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

impl<T> LiveFeed<T> {
    pub fn new(
        subscription: Subscription,
        decode: impl Fn(Value) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            subscription,
            decode: Box::new(decode),
        }
    }

    /// Next decoded delivery, or `None` once the feed is closed.
    pub async fn recv(&mut self) -> Option<T> {
        let value = self.subscription.recv().await?;
        Some((self.decode)(value))
    }

    pub fn handle(&self) -> SubscriptionHandle {
        self.subscription.handle()
    }

    pub fn path(&self) -> &StorePath {
        self.subscription.path()
    }

    /// Stops the feed. Returns false if it was already cancelled.
    pub fn cancel(&mut self) -> bool {
        self.subscription.cancel()
    }
}

impl<T> Stream for LiveFeed<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        Pin::new(&mut this.subscription)
            .poll_next(cx)
            .map(|item| item.map(|value| (this.decode)(value)))
    }
}
