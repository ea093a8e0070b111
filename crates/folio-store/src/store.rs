//! Remote document store trait definition.

use std::sync::Arc;

use async_trait::async_trait;
use folio_core::StorePath;
use serde_json::Value;

use crate::error::StoreError;
use crate::feed::ChangeFeed;

/// A real-time document store addressed by slash-separated paths.
///
/// This trait abstracts over the hosted store so the cache and content
/// layers never depend on its wire protocol. Values are JSON trees; a
/// path with nothing stored reads as `None`.
///
/// # Implementors
///
/// - `MemoryStore` - In-process tree with change notifications
/// - `RetryingStore` - Retries transient failures of another store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Reads the value at `path`.
    ///
    /// # Errors
    ///
    /// - `StoreError::Unavailable` / `StoreError::Timeout` on transport problems
    /// - `StoreError::PermissionDenied` if the store's rules reject the read
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;

    /// Replaces the value at `path`. Writing `null` removes it.
    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;

    /// Appends `value` under `path` with a fresh, time-ordered key and
    /// returns the key.
    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError>;

    /// Removes the value at `path`.
    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        self.write(path, Value::Null).await
    }

    /// Opens a change feed for `path`.
    ///
    /// Must be called from within a Tokio runtime. The feed stays attached
    /// until it is dropped or the store shuts down.
    fn watch(&self, path: &StorePath) -> ChangeFeed;

    /// Verifies that the store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Returns the name of this store, for logs and health reports.
    fn name(&self) -> &str;
}

#[async_trait]
impl<S: RemoteStore + ?Sized> RemoteStore for Arc<S> {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        (**self).read(path).await
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        (**self).write(path, value).await
    }

    async fn push(&self, path: &StorePath, value: Value) -> Result<String, StoreError> {
        (**self).push(path, value).await
    }

    async fn remove(&self, path: &StorePath) -> Result<(), StoreError> {
        (**self).remove(path).await
    }

    fn watch(&self, path: &StorePath) -> ChangeFeed {
        (**self).watch(path)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        (**self).health_check().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct SingleValue {
        value: Mutex<Option<Value>>,
    }

    #[async_trait]
    impl RemoteStore for SingleValue {
        async fn read(&self, _path: &StorePath) -> Result<Option<Value>, StoreError> {
            Ok(self.value.lock().clone())
        }

        async fn write(&self, _path: &StorePath, value: Value) -> Result<(), StoreError> {
            *self.value.lock() = (!value.is_null()).then_some(value);
            Ok(())
        }

        async fn push(&self, _path: &StorePath, _value: Value) -> Result<String, StoreError> {
            Err(StoreError::unavailable("push not supported"))
        }

        fn watch(&self, path: &StorePath) -> ChangeFeed {
            ChangeFeed::failed(path.clone(), StoreError::Closed)
        }

        async fn health_check(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "single"
        }
    }

    #[tokio::test]
    async fn test_default_remove_writes_null() {
        let store = SingleValue {
            value: Mutex::new(Some(Value::from("x"))),
        };
        let path = StorePath::parse("a").unwrap();

        store.remove(&path).await.unwrap();
        assert_eq!(store.read(&path).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_arc_delegates() {
        let store: Arc<dyn RemoteStore> = Arc::new(SingleValue {
            value: Mutex::new(None),
        });
        let path = StorePath::parse("a").unwrap();

        store.write(&path, Value::from(3)).await.unwrap();
        assert_eq!(store.read(&path).await.unwrap(), Some(Value::from(3)));
        assert_eq!(store.name(), "single");
        assert!(store.health_check().await.is_ok());
    }
}
