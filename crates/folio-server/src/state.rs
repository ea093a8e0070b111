//! Application state.

use std::sync::Arc;
use std::time::Duration;

use folio_cache::DataFacade;
use folio_store::{ConnectionState, RemoteStore};

use crate::content::ContentService;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    content: ContentService,
    connection: Arc<ConnectionState>,
    keep_alive: Duration,
}

impl AppState {
    /// Creates the state from the content service and the store's
    /// connection tracker.
    pub fn new(content: ContentService, connection: Arc<ConnectionState>) -> Self {
        Self {
            content,
            connection,
            keep_alive: Duration::from_secs(15),
        }
    }

    /// Interval of SSE keep-alive comments.
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn content(&self) -> &ContentService {
        &self.content
    }

    pub fn facade(&self) -> &DataFacade {
        self.content.facade()
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        self.content.facade().store()
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }
}
