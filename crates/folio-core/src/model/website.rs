use super::{Course, ProcessStep, Project, Service, ServicePackage, TeamMember};
use crate::error::{FolioError, Result};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Top-level sections of the `website` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebsiteSection {
    Hero,
    About,
    Contact,
    Services,
    Courses,
    Projects,
    Team,
    Process,
    Packages,
}

impl WebsiteSection {
    /// Every section, in page order.
    pub const ALL: [WebsiteSection; 9] = [
        Self::Hero,
        Self::About,
        Self::Services,
        Self::Courses,
        Self::Projects,
        Self::Team,
        Self::Process,
        Self::Packages,
        Self::Contact,
    ];

    /// Key of the section under `website/`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::About => "about",
            Self::Contact => "contact",
            Self::Services => "services",
            Self::Courses => "courses",
            Self::Projects => "projects",
            Self::Team => "team",
            Self::Process => "process",
            Self::Packages => "packages",
        }
    }

    /// Array-valued sections hold records; the others are free-form objects.
    pub fn is_collection(self) -> bool {
        !matches!(self, Self::Hero | Self::About | Self::Contact)
    }

    /// Value of the section when nothing is stored.
    pub fn empty_value(self) -> Value {
        if self.is_collection() {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    }
}

impl fmt::Display for WebsiteSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebsiteSection {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|section| section.as_str() == wanted)
            .ok_or_else(|| {
                FolioError::validation_error("section", format!("unknown website section '{s}'"))
            })
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Keeps the items of a stored collection that decode, dropping the rest.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    let items: Vec<Value> = match raw {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Checks that a stored collection is a list whose items all decode.
fn strict_list<T: DeserializeOwned>(field: &str, raw: Option<&Value>) -> serde_json::Result<()> {
    let items: Vec<&Value> = match raw {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        Some(_) => return Err(de::Error::custom(format!("'{field}' is not a list"))),
    };
    for item in items {
        T::deserialize(item).map_err(|e| de::Error::custom(format!("'{field}': {e}")))?;
    }
    Ok(())
}

/// The whole `website` document.
///
/// `hero`, `about` and `contact` are free-form objects edited as a block;
/// the rest are record collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteSnapshot {
    pub hero: Value,
    pub about: Value,
    pub contact: Value,
    #[serde(deserialize_with = "lenient_list")]
    pub services: Vec<Service>,
    #[serde(deserialize_with = "lenient_list")]
    pub courses: Vec<Course>,
    #[serde(deserialize_with = "lenient_list")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "lenient_list")]
    pub team: Vec<TeamMember>,
    #[serde(deserialize_with = "lenient_list")]
    pub process: Vec<ProcessStep>,
    #[serde(deserialize_with = "lenient_list")]
    pub packages: Vec<ServicePackage>,
}

impl Default for WebsiteSnapshot {
    fn default() -> Self {
        Self {
            hero: empty_object(),
            about: empty_object(),
            contact: empty_object(),
            services: Vec::new(),
            courses: Vec::new(),
            projects: Vec::new(),
            team: Vec::new(),
            process: Vec::new(),
            packages: Vec::new(),
        }
    }
}

impl WebsiteSnapshot {
    /// Lenient decode for live updates: absent or malformed input gives
    /// the empty structure and bad collection items are dropped.
    pub fn from_document(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::deserialize(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Strict decode for one-shot reads. `null` is the empty structure;
    /// anything else must be an object whose collections decode fully.
    pub fn try_from_document(value: &Value) -> serde_json::Result<Self> {
        let map = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            _ => return Err(de::Error::custom("website document is not an object")),
        };
        strict_list::<Service>("services", map.get("services"))?;
        strict_list::<Course>("courses", map.get("courses"))?;
        strict_list::<Project>("projects", map.get("projects"))?;
        strict_list::<TeamMember>("team", map.get("team"))?;
        strict_list::<ProcessStep>("process", map.get("process"))?;
        strict_list::<ServicePackage>("packages", map.get("packages"))?;
        Self::deserialize(value)
    }
}
