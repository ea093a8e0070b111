use crate::error::Result;
use crate::record::{Record, orderable_record};
use crate::types::{EntityId, Millis, PublishStatus};
use crate::validation::{require, validate_http_url};
use serde::{Deserialize, Serialize};

/// A portfolio project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub url: String,
    pub category: String,
    pub technologies: Vec<String>,
    pub featured: bool,
    pub status: PublishStatus,
    pub order: i64,
    pub created_at: Millis,
    pub updated_at: Millis,
}

orderable_record!(Project);

impl Record for Project {
    const SECTION: &'static str = "projects";
    const LABEL: &'static str = "project";

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn stamp_created(&mut self, now: Millis) {
        self.created_at = now;
        self.updated_at = now;
    }

    fn stamp_updated(&mut self, now: Millis) {
        self.updated_at = now;
    }

    fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("description", &self.description)?;
        require("category", &self.category)?;
        validate_http_url("url", &self.url)
    }

    fn is_public(&self) -> bool {
        self.status.is_published()
    }
}

/// Optional project filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectFilter {
    /// Case-insensitive category match
    pub category: Option<String>,
    /// Featured flag must equal this value
    pub featured: Option<bool>,
}

impl ProjectFilter {
    /// Returns true if the project passes every given filter.
    pub fn matches(&self, project: &Project) -> bool {
        self.category
            .as_deref()
            .is_none_or(|c| super::eq_ignore_case(c, &project.category))
            && self.featured.is_none_or(|f| f == project.featured)
    }
}
