//! Typed domain records.
//!
//! Field names follow the stored documents (camelCase on the wire). Every
//! field has a serde default so older documents with missing fields still
//! decode; `Record::validate` enforces the required ones.

mod contact;
mod course;
mod inquiry;
mod project;
mod service;
mod team;
mod website;

pub use contact::{ContactMessage, ContactStats, ContactSubmission};
pub use course::{Course, CourseFilter};
pub use inquiry::{
    InboxItem, InboxRecord, InquiryKind, InquirySource, PackageInquiry, PackageSelection, Priority,
    UserInfo, merge_inbox,
};
pub use project::{Project, ProjectFilter};
pub use service::{ProcessStep, Service, ServicePackage};
pub use team::{SocialLinks, TeamMember};
pub use website::{WebsiteSection, WebsiteSnapshot};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Case-insensitive equality used by the catalogue filters.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Decodes a collection document into records.
///
/// Collections are usually arrays, but documents written with push keys
/// are objects keyed by id; both are accepted. An absent document is an
/// empty collection.
pub fn decode_list<T: DeserializeOwned>(value: &Value) -> serde_json::Result<Vec<T>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| T::deserialize(item))
            .collect(),
        Value::Object(map) => map.values().map(T::deserialize).collect(),
        other => T::deserialize(other).map(|item| vec![item]),
    }
}
