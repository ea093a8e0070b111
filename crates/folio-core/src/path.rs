//! Slash-separated document store paths.

use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters the document store refuses inside a path segment.
const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// A validated, normalised path into the document store.
///
/// Leading, trailing and repeated slashes are collapsed, so
/// `"/website//services/"` and `"website/services"` are the same path.
/// The empty path is the root of the tree.
///
/// # Example
///
/// ```
/// use folio_core::StorePath;
///
/// let path = StorePath::parse("/website//services/").unwrap();
/// assert_eq!(path.as_str(), "website/services");
/// assert_eq!(path.parent().unwrap().as_str(), "website");
/// assert!(StorePath::parse("website/a.b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorePath(String);

impl StorePath {
    /// Parses and normalises a path.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = Vec::new();
        for segment in raw.split('/').filter(|s| !s.is_empty()) {
            if let Some(bad) = segment.chars().find(|c| FORBIDDEN.contains(c) || c.is_control()) {
                return Err(FolioError::invalid_path(
                    raw,
                    format!("segment '{segment}' contains forbidden character {bad:?}"),
                ));
            }
            segments.push(segment);
        }
        Ok(Self(segments.join("/")))
    }

    /// The root of the document tree.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment, if any.
    pub fn key(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Parent path, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Appends a child segment (or sub-path).
    pub fn child(&self, segment: &str) -> Result<Self> {
        let tail = Self::parse(segment)?;
        if tail.is_root() {
            return Err(FolioError::invalid_path(segment, "child segment is empty"));
        }
        if self.is_root() {
            return Ok(tail);
        }
        Ok(Self(format!("{}/{}", self.0, tail.0)))
    }

    /// Returns true if `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &StorePath) -> bool {
        if self.0.len() >= other.0.len() {
            return false;
        }
        if self.is_root() {
            return true;
        }
        other.0.starts_with(&self.0) && other.0.as_bytes()[self.0.len()] == b'/'
    }

    /// Returns true if the paths are equal or one contains the other.
    ///
    /// A change at either path is visible in a read of the other.
    pub fn relates_to(&self, other: &StorePath) -> bool {
        self == other || self.is_ancestor_of(other) || other.is_ancestor_of(self)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StorePath {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StorePath {
    type Error = FolioError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl TryFrom<&str> for StorePath {
    type Error = FolioError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<StorePath> for String {
    fn from(path: StorePath) -> Self {
        path.0
    }
}

impl AsRef<str> for StorePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
