use crate::error::Result;
use crate::record::{Orderable, Record};
use crate::types::{EntityId, MemberStatus, Millis};
use crate::validation::require;
use serde::{Deserialize, Serialize};

/// Optional profile links shown as icons on a member card.
///
/// Stored inline on the member document; blank strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dribbble: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl SocialLinks {
    /// Returns the `(network, link)` pairs that are actually filled in.
    pub fn present(&self) -> Vec<(&'static str, &str)> {
        [
            ("linkedin", &self.linkedin),
            ("twitter", &self.twitter),
            ("email", &self.email),
            ("github", &self.github),
            ("instagram", &self.instagram),
            ("facebook", &self.facebook),
            ("youtube", &self.youtube),
            ("tiktok", &self.tiktok),
            ("discord", &self.discord),
            ("behance", &self.behance),
            ("dribbble", &self.dribbble),
            ("medium", &self.medium),
            ("website", &self.website),
        ]
        .into_iter()
        .filter_map(|(name, link)| {
            link.as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| (name, l))
        })
        .collect()
    }
}

/// A member of the agency team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMember {
    pub id: EntityId,
    pub name: String,
    pub role: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub status: MemberStatus,
    pub order: i64,
    #[serde(flatten)]
    pub social: SocialLinks,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl Orderable for TeamMember {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }

    fn created_at(&self) -> Millis {
        self.created_at
    }
}

impl Record for TeamMember {
    const SECTION: &'static str = "team";
    const LABEL: &'static str = "team member";

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
        require("name", &self.name)?;
        require("role", &self.role)?;
        require("description", &self.description)
    }

    fn is_public(&self) -> bool {
        self.status == MemberStatus::Active
    }
}
