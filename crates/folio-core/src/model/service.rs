use crate::error::Result;
use crate::record::{Orderable, Record, orderable_record};
use crate::types::{EntityId, Millis, PublishStatus};
use crate::validation::{require, require_non_empty};
use serde::{Deserialize, Serialize};

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// One step of the delivery process.
///
/// Steps are embedded in each service and also kept as the standalone
/// `website/process` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessStep {
    #[serde(skip_serializing_if = "EntityId::is_empty")]
    pub id: EntityId,
    pub step: u32,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "is_zero")]
    pub created_at: Millis,
    #[serde(skip_serializing_if = "is_zero")]
    pub updated_at: Millis,
}

impl ProcessStep {
    /// Creates a step with its number, title and description.
    pub fn new(step: u32, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            step,
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    fn is_blank(&self) -> bool {
        self.title.trim().is_empty() || self.description.trim().is_empty()
    }
}

impl Orderable for ProcessStep {
    fn id(&self) -> &EntityId {
        &self.id
    }

    /// Steps without an explicit order sort by their step number.
    fn order(&self) -> i64 {
        self.order.unwrap_or(i64::from(self.step))
    }

    fn set_order(&mut self, order: i64) {
        self.order = Some(order);
    }

    fn created_at(&self) -> Millis {
        self.created_at
    }
}

impl Record for ProcessStep {
    const SECTION: &'static str = "process";
    const LABEL: &'static str = "process step";

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
        require("description", &self.description)
    }
}

/// A priced package offered for a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePackage {
    #[serde(skip_serializing_if = "EntityId::is_empty")]
    pub id: EntityId,
    pub name: String,
    /// Display price, e.g. `"$2,999"`
    pub price: String,
    pub description: String,
    pub features: Vec<String>,
    pub featured: bool,
    pub popular: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "is_zero")]
    pub created_at: Millis,
    #[serde(skip_serializing_if = "is_zero")]
    pub updated_at: Millis,
}

impl ServicePackage {
    fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            || self.price.trim().is_empty()
            || self.description.trim().is_empty()
    }
}

impl Orderable for ServicePackage {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order.unwrap_or(0)
    }

    fn set_order(&mut self, order: i64) {
        self.order = Some(order);
    }

    fn featured(&self) -> bool {
        self.featured
    }

    fn created_at(&self) -> Millis {
        self.created_at
    }
}

impl Record for ServicePackage {
    const SECTION: &'static str = "packages";
    const LABEL: &'static str = "package";

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
        require("price", &self.price)?;
        require("description", &self.description)
    }
}

/// A service offered by the agency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    /// Icon name understood by the front end (`"Code"`, `"Search"`, ...)
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub features: Vec<String>,
    pub process: Vec<ProcessStep>,
    pub packages: Vec<ServicePackage>,
    pub featured: bool,
    pub status: PublishStatus,
    pub order: i64,
    pub created_at: Millis,
    pub updated_at: Millis,
}

orderable_record!(Service);

impl Service {
    /// Drops blank features, steps and packages and renumbers the steps.
    pub fn prune_blank_entries(&mut self) {
        self.features.retain(|f| !f.trim().is_empty());
        self.process.retain(|s| !s.is_blank());
        self.packages.retain(|p| !p.is_blank());
        for (i, step) in self.process.iter_mut().enumerate() {
            step.step = (i + 1) as u32;
        }
    }
}

impl Record for Service {
    const SECTION: &'static str = "services";
    const LABEL: &'static str = "service";

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
        require("icon", &self.icon)?;

        let features: Vec<_> = self.features.iter().filter(|f| !f.trim().is_empty()).collect();
        require_non_empty("features", &features, "feature")?;

        let steps: Vec<_> = self.process.iter().filter(|s| !s.is_blank()).collect();
        require_non_empty("process", &steps, "process step")?;

        let packages: Vec<_> = self.packages.iter().filter(|p| !p.is_blank()).collect();
        require_non_empty("packages", &packages, "package")
    }

    fn is_public(&self) -> bool {
        self.status.is_published()
    }
}
