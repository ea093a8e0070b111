use crate::error::Result;
use crate::record::{Record, orderable_record};
use crate::types::{EntityId, Millis, PublishStatus};
use crate::validation::{require, validate_optional_url};
use serde::{Deserialize, Serialize};

/// A course recommended on the courses page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Course {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub category: String,
    pub provider: String,
    pub duration: String,
    pub featured: bool,
    pub status: PublishStatus,
    pub order: i64,
    pub created_at: Millis,
    pub updated_at: Millis,
}

orderable_record!(Course);

impl Record for Course {
    const SECTION: &'static str = "courses";
    const LABEL: &'static str = "course";

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
        require("provider", &self.provider)?;
        require("duration", &self.duration)?;
        validate_optional_url("url", self.url.as_deref())
    }

    fn is_public(&self) -> bool {
        self.status.is_published()
    }
}

/// Optional course filters; both are case-insensitive exact matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CourseFilter {
    pub category: Option<String>,
    pub provider: Option<String>,
}

impl CourseFilter {
    /// Returns true if the course passes every given filter.
    pub fn matches(&self, course: &Course) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| super::eq_ignore_case(c, &course.category));
        let provider_ok = self
            .provider
            .as_deref()
            .is_none_or(|p| super::eq_ignore_case(p, &course.provider));
        category_ok && provider_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        Course {
            title: "Rust for the Web".into(),
            description: "Axum from scratch".into(),
            category: "Programming".into(),
            provider: "Udemy".into(),
            duration: "12h".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(course().validate().is_ok());

        let mut missing = course();
        missing.provider = " ".into();
        let err = missing.validate().unwrap_err();
        assert!(err.to_string().contains("provider"));
    }

    #[test]
    fn test_validate_url_only_when_present() {
        let mut c = course();
        c.url = Some("https://udemy.com/rust".into());
        assert!(c.validate().is_ok());
        c.url = Some("udemy rust".into());
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filter = CourseFilter {
            category: Some("programming".into()),
            provider: Some("UDEMY".into()),
        };
        assert!(filter.matches(&course()));

        let filter = CourseFilter {
            provider: Some("coursera".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&course()));
        assert!(CourseFilter::default().matches(&course()));
    }

    #[test]
    fn test_decodes_camel_case_with_missing_fields() {
        let c: Course = serde_json::from_str(
            r#"{"id": 7, "title": "T", "createdAt": 1700000000000, "status": "draft"}"#,
        )
        .unwrap();
        assert_eq!(c.id, "7");
        assert_eq!(c.created_at, 1_700_000_000_000);
        assert!(!c.is_public());
        assert_eq!(c.order, 0);
    }
}
