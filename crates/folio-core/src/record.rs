//! Traits shared by the records stored in `website/<section>` collections.

use crate::error::Result;
use crate::types::{EntityId, Millis};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An item with a display position.
///
/// Lower `order` values appear first. Records that never had an order
/// are treated as `0`.
pub trait Orderable {
    /// Record identifier.
    fn id(&self) -> &EntityId;

    /// Current display order.
    fn order(&self) -> i64;

    /// Sets the display order.
    fn set_order(&mut self, order: i64);

    /// Featured items are placed ahead of the rest.
    fn featured(&self) -> bool {
        false
    }

    /// Creation stamp, used to break order ties.
    fn created_at(&self) -> Millis {
        0
    }
}

/// A record kept as an element of an array-valued collection.
pub trait Record: Orderable + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name under `website/`.
    const SECTION: &'static str;

    /// Human label used in errors and logs.
    const LABEL: &'static str;

    /// Assigns the identifier.
    fn set_id(&mut self, id: EntityId);

    /// Sets both creation and update stamps.
    fn stamp_created(&mut self, now: Millis);

    /// Sets the update stamp.
    fn stamp_updated(&mut self, now: Millis);

    /// Checks the record's required fields.
    fn validate(&self) -> Result<()>;

    /// Whether the public site may show this record.
    fn is_public(&self) -> bool {
        true
    }
}

/// Implements `Orderable` for a struct with `id`, `order`, `featured`, `created_at` and `updated_at`.
macro_rules! orderable_record {
    ($ty:ty) => {
        impl $crate::record::Orderable for $ty {
            fn id(&self) -> &$crate::types::EntityId {
                &self.id
            }

            fn order(&self) -> i64 {
                self.order
            }

            fn set_order(&mut self, order: i64) {
                self.order = order;
            }

            fn featured(&self) -> bool {
                self.featured
            }

            fn created_at(&self) -> $crate::types::Millis {
                self.created_at
            }
        }
    };
}

pub(crate) use orderable_record;
