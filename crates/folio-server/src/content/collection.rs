//! Generic accessor for the array-valued collections under `website/`.

use std::marker::PhantomData;

use folio_cache::ReadOptions;
use folio_core::ordering::{self, OrderStatistics, next_display_order, sort_for_display};
use folio_core::{EntityId, FolioError, Principal, Record, StorePath, decode_list, now_millis};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::live::LiveFeed;
use super::{ContentError, ContentResult, ContentService, to_document, website_path};

/// Fields a patch may not overwrite.
const PROTECTED_FIELDS: [&str; 2] = ["id", "createdAt"];

/// Typed view of `website/<T::SECTION>`.
///
/// The whole collection is stored as one array; writes read it fresh,
/// change it and write it back while holding the path's write lock.
pub struct Collection<T> {
    content: ContentService,
    path: StorePath,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            content: self.content.clone(),
            path: self.path.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("path", &self.path).finish()
    }
}

impl ContentService {
    /// Accessor for the collection holding `T`.
    pub fn collection<T: Record>(&self) -> ContentResult<Collection<T>> {
        Ok(Collection {
            content: self.clone(),
            path: website_path(T::SECTION)?,
            _record: PhantomData,
        })
    }
}

impl<T: Record> Collection<T> {
    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Every record in display order, drafts included.
    pub async fn list(&self, options: ReadOptions) -> ContentResult<Vec<T>> {
        let action = format!("fetch {}", T::SECTION);
        let value = self.content.read(&self.path, options, &action).await?;
        let mut items: Vec<T> = decode_list(&value)
            .map_err(|e| FolioError::decode_error(self.path.as_str(), e))?;
        sort_for_display(&mut items);
        Ok(items)
    }

    /// Records the public site may show, in display order.
    pub async fn list_public(&self) -> ContentResult<Vec<T>> {
        let mut items = self.list(ReadOptions::default()).await?;
        items.retain(T::is_public);
        Ok(items)
    }

    pub async fn get(&self, id: &str) -> ContentResult<T> {
        self.list(ReadOptions::default())
            .await?
            .into_iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| FolioError::not_found(T::LABEL, id).into())
    }

    /// Adds a record.
    ///
    /// Assigns an id when none is given, stamps both timestamps and puts
    /// the record last when it has no display order.
    pub async fn create(&self, principal: Option<&Principal>, mut record: T) -> ContentResult<T> {
        let admin = self.content.authorize(principal)?;
        record.validate()?;

        let _writing = self.content.lock_writes(&self.path).await;
        let mut items = self.list(ReadOptions::refresh()).await?;
        if record.id().is_empty() {
            record.set_id(EntityId::generate());
        } else if items.iter().any(|item| item.id() == record.id()) {
            return Err(FolioError::validation_error(
                "id",
                format!("{} '{}' already exists", T::LABEL, record.id()),
            )
            .into());
        }
        record.stamp_created(now_millis());
        if record.order() == 0 {
            record.set_order(next_display_order(&items));
        }

        items.push(record.clone());
        self.save(&items, "create").await?;
        info!(
            section = T::SECTION,
            id = %record.id(),
            by = %admin.email,
            "Record created"
        );
        Ok(record)
    }

    /// Merges `patch` (an object of camelCase fields) into a record.
    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: &str,
        patch: Value,
    ) -> ContentResult<T> {
        let admin = self.content.authorize(principal)?;
        let Value::Object(patch) = patch else {
            return Err(FolioError::validation_error("patch", "must be a JSON object").into());
        };

        let _writing = self.content.lock_writes(&self.path).await;
        let mut items = self.list(ReadOptions::refresh()).await?;
        let index = self.position(&items, id)?;
        let mut updated = merge(&items[index], patch)?;
        updated.validate()?;
        updated.stamp_updated(now_millis());

        items[index] = updated.clone();
        self.save(&items, "update").await?;
        info!(section = T::SECTION, id, by = %admin.email, "Record updated");
        Ok(updated)
    }

    pub async fn delete(&self, principal: Option<&Principal>, id: &str) -> ContentResult<T> {
        let admin = self.content.authorize(principal)?;
        let _writing = self.content.lock_writes(&self.path).await;
        let mut items = self.list(ReadOptions::refresh()).await?;
        let index = self.position(&items, id)?;
        let removed = items.remove(index);

        self.save(&items, "delete").await?;
        info!(section = T::SECTION, id, by = %admin.email, "Record deleted");
        Ok(removed)
    }

    /// Moves a record to a 1-based position and renumbers the collection.
    pub async fn move_to_position(
        &self,
        principal: Option<&Principal>,
        id: &str,
        position: i64,
    ) -> ContentResult<Vec<T>> {
        self.content.authorize(principal)?;
        let _writing = self.content.lock_writes(&self.path).await;
        let items = self.list(ReadOptions::refresh()).await?;
        self.position(&items, id)?;

        let items = ordering::move_to_position(items, &EntityId::new(id), position);
        self.save(&items, "reorder").await?;
        Ok(items)
    }

    /// Gaps and duplicates in the current display orders.
    pub async fn order_statistics(&self) -> ContentResult<OrderStatistics> {
        let items = self.list(ReadOptions::default()).await?;
        Ok(ordering::order_statistics(&items))
    }

    /// Live view of the collection in display order.
    ///
    /// A document that cannot be decoded is delivered as an empty list.
    pub fn subscribe(&self) -> LiveFeed<Vec<T>> {
        let subscription = self
            .content
            .facade()
            .subscribe(&self.path, self.content.subscribe_options(Value::Array(Vec::new())));
        let path = self.path.clone();
        LiveFeed::new(subscription, move |value| {
            match decode_list::<T>(&value) {
                Ok(mut items) => {
                    sort_for_display(&mut items);
                    items
                },
                Err(e) => {
                    warn!(path = %path, error = %e, "Undecodable collection snapshot");
                    Vec::new()
                },
            }
        })
    }

    fn position(&self, items: &[T], id: &str) -> ContentResult<usize> {
        items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| FolioError::not_found(T::LABEL, id).into())
    }

    async fn save(&self, items: &[T], verb: &str) -> ContentResult<()> {
        let action = format!("{verb} {}", T::LABEL);
        let document = to_document(&items, &action)?;
        self.content.write(&self.path, document, &action).await
    }
}

fn merge<T: Record>(current: &T, patch: Map<String, Value>) -> Result<T, ContentError> {
    let mut document = match serde_json::to_value(current) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => return Err(FolioError::internal(e.to_string()).into()),
    };
    for (field, value) in patch {
        if !PROTECTED_FIELDS.contains(&field.as_str()) {
            document.insert(field, value);
        }
    }
    serde_json::from_value(Value::Object(document))
        .map_err(|e| FolioError::validation_error("patch", e.to_string()).into())
}
