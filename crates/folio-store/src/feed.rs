//! Change feeds delivered by `RemoteStore::watch`.

use folio_core::StorePath;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::StoreError;

/// One delivery of a feed: the current value at the watched path
/// (`None` when nothing is stored there) or an error.
pub type Snapshot = Result<Option<Value>, StoreError>;

/// Buffered snapshots per feed before the producer waits.
pub const FEED_CAPACITY: usize = 16;

/// Producer half of a change feed.
#[derive(Debug, Clone)]
pub struct FeedSender {
    tx: mpsc::Sender<Snapshot>,
}

impl FeedSender {
    /// Delivers a snapshot. Returns false once the feed has been dropped.
    pub async fn send(&self, snapshot: Snapshot) -> bool {
        self.tx.send(snapshot).await.is_ok()
    }

    /// Resolves when the consumer drops its `ChangeFeed`.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    /// Returns true if the consumer is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A live stream of snapshots for one path.
///
/// The first delivery is the current value; later deliveries follow each
/// change under the path. Dropping the feed detaches it from the store.
#[derive(Debug)]
pub struct ChangeFeed {
    path: StorePath,
    rx: mpsc::Receiver<Snapshot>,
}

impl ChangeFeed {
    /// Creates a connected sender/feed pair.
    pub fn channel(path: StorePath, capacity: usize) -> (FeedSender, ChangeFeed) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (FeedSender { tx }, ChangeFeed { path, rx })
    }

    /// A feed that yields a single error and then ends.
    pub fn failed(path: StorePath, error: StoreError) -> ChangeFeed {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 and a fresh channel: cannot fail.
        let _ = tx.try_send(Err(error));
        ChangeFeed { path, rx }
    }

    /// Watched path.
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Waits for the next snapshot; `None` once the store side has ended.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}
