//! Common type definitions and newtypes for Folio.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Returns the current wall-clock time in milliseconds.
pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

/// Returns true if both timestamps fall in the same UTC calendar month.
pub fn same_month(a: Millis, b: Millis) -> bool {
    match (
        DateTime::<Utc>::from_timestamp_millis(a),
        DateTime::<Utc>::from_timestamp_millis(b),
    ) {
        (Some(a), Some(b)) => a.year() == b.year() && a.month() == b.month(),
        _ => false,
    }
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Record identifier.
///
/// Records created here get a millisecond timestamp id. Older documents
/// carry numeric ids (`1`, `2`, ...), which deserialize into the same
/// string form.
///
/// # Example
///
/// ```
/// use folio_core::EntityId;
///
/// let legacy: EntityId = serde_json::from_str("3").unwrap();
/// assert_eq!(legacy.as_str(), "3");
///
/// let a = EntityId::generate();
/// let b = EntityId::generate();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh timestamp id, strictly increasing within the process.
    pub fn generate() -> Self {
        let now = now_millis();
        let mut last = LAST_ID.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match LAST_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return Self(next.to_string()),
                Err(actual) => last = actual,
            }
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if no id has been assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Int(n) => Self(n.to_string()),
            RawId::Float(n) => Self(n.to_string()),
        })
    }
}

/// Visibility of catalogue records on the public site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    /// Shown on the public site
    #[default]
    Published,
    /// Only visible in the dashboard
    Draft,
}

impl PublishStatus {
    /// Returns true for published records.
    pub fn is_published(self) -> bool {
        self == Self::Published
    }
}

/// Whether a team member is shown on the team page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Shown on the public site
    #[default]
    Active,
    /// Hidden
    Inactive,
}

/// Triage state of contact messages and package inquiries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryStatus {
    /// Not yet looked at
    #[default]
    New,
    /// Opened by an admin
    Read,
    /// Answered
    Replied,
    /// Filed away
    Archived,
}

impl InquiryStatus {
    /// All statuses in triage order.
    pub const ALL: [InquiryStatus; 4] = [Self::New, Self::Read, Self::Replied, Self::Archived];

    /// Returns the wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Read => "read",
            Self::Replied => "replied",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InquiryStatus {
    type Err = crate::FolioError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                crate::FolioError::validation_error(
                    "status",
                    format!("unknown status '{s}', expected new, read, replied or archived"),
                )
            })
    }
}
