//! Extractores de Axum para la API.

mod caller;
mod path;
mod query;

pub use caller::{AUTH_EMAIL_HEADER, AUTH_UID_HEADER, Caller};
pub(crate) use path::parse_collection;
pub use path::{CollectionPath, InquiryStatusPath, RecordPath, SectionPath};
pub use query::{ReadQuery, StatusUpdate};
