//! The `website` document as a whole and by section.

use folio_cache::ReadOptions;
use folio_core::{FolioError, Principal, StorePath, WebsiteSection, WebsiteSnapshot};
use serde_json::Value;
use tracing::{info, warn};

use super::live::LiveFeed;
use super::{ContentResult, ContentService, WEBSITE_ROOT, website_path};

fn website_root() -> ContentResult<StorePath> {
    Ok(StorePath::parse(WEBSITE_ROOT)?)
}

impl ContentService {
    /// The whole site document; the empty structure when nothing is stored.
    /// A document that does not decode is an error.
    pub async fn get_website_data(&self, options: ReadOptions) -> ContentResult<WebsiteSnapshot> {
        let value = self
            .read(&website_root()?, options, "fetch website data")
            .await?;
        WebsiteSnapshot::try_from_document(&value)
            .map_err(|e| FolioError::decode_error(WEBSITE_ROOT, e).into())
    }

    pub fn subscribe_to_website_data(&self) -> ContentResult<LiveFeed<WebsiteSnapshot>> {
        let subscription = self
            .facade()
            .subscribe(&website_root()?, self.subscribe_options(Value::Null));
        Ok(LiveFeed::new(subscription, |value| {
            if let Err(e) = WebsiteSnapshot::try_from_document(&value) {
                warn!(error = %e, "Live website document only partially decoded");
            }
            WebsiteSnapshot::from_document(&value)
        }))
    }

    /// Live raw value of one section, or its empty value when absent.
    pub fn subscribe_to_section(&self, section: WebsiteSection) -> ContentResult<LiveFeed<Value>> {
        let path = website_path(section.as_str())?;
        let subscription = self
            .facade()
            .subscribe(&path, self.subscribe_options(section.empty_value()));
        Ok(LiveFeed::new(subscription, move |value| {
            if value.is_null() {
                section.empty_value()
            } else {
                value
            }
        }))
    }

    /// Replaces one section. Collections take an array, the rest an object.
    pub async fn update_website_section(
        &self,
        principal: Option<&Principal>,
        section: WebsiteSection,
        value: Value,
    ) -> ContentResult<()> {
        let admin = self.authorize(principal)?;
        let shape_ok = if section.is_collection() {
            value.is_array()
        } else {
            value.is_object()
        };
        if !shape_ok {
            let expected = if section.is_collection() {
                "an array"
            } else {
                "an object"
            };
            return Err(FolioError::validation_error(
                section.as_str(),
                format!("section '{section}' must be {expected}"),
            )
            .into());
        }

        let action = format!("update website section {section}");
        self.write(&website_path(section.as_str())?, value, &action)
            .await?;
        info!(%section, by = %admin.email, "Website section updated");
        Ok(())
    }

    /// Writes the initial site document unless one already exists.
    ///
    /// Returns true if the document was written.
    pub async fn initialize_website_data(
        &self,
        principal: Option<&Principal>,
        document: Value,
    ) -> ContentResult<bool> {
        let admin = self.authorize(principal)?;
        if !document.is_object() {
            return Err(FolioError::validation_error("website", "must be a JSON object").into());
        }

        let root = website_root()?;
        let current = self
            .read(&root, ReadOptions::refresh(), "fetch website data")
            .await?;
        if !current.is_null() {
            return Ok(false);
        }

        self.write(&root, document, "initialize website data")
            .await?;
        info!(by = %admin.email, "Website data initialized");
        Ok(true)
    }
}
