//! Contact messages and package inquiries.
//!
//! Both live in top-level collections keyed by push keys; the key is the
//! record's id.

use folio_cache::ReadOptions;
use folio_core::{
    ContactMessage, ContactStats, ContactSubmission, EntityId, FolioError, InboxItem,
    InquiryKind, InquiryStatus, PackageInquiry, PackageSelection, Principal, StorePath, UserInfo,
    merge_inbox, now_millis,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use super::live::LiveFeed;
use super::{ContentError, ContentResult, ContentService, to_document};

/// Records stored under a push key.
trait Keyed: DeserializeOwned {
    fn id_mut(&mut self) -> &mut EntityId;
    fn timestamp(&self) -> i64;
}

impl Keyed for ContactMessage {
    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl Keyed for PackageInquiry {
    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Decodes a keyed collection, newest first. Keys fill in missing ids.
fn decode_keyed<T: Keyed>(value: &Value) -> serde_json::Result<Vec<T>> {
    let mut items = match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, item)| !item.is_null())
            .map(|(key, item)| {
                let mut record = T::deserialize(item)?;
                if record.id_mut().is_empty() {
                    *record.id_mut() = EntityId::new(key.as_str());
                }
                Ok(record)
            })
            .collect::<serde_json::Result<Vec<T>>>()?,
        other => folio_core::decode_list(other)?,
    };
    items.sort_by_key(|item| std::cmp::Reverse(item.timestamp()));
    Ok(items)
}

fn collection_path(kind: InquiryKind) -> ContentResult<StorePath> {
    Ok(StorePath::parse(kind.collection())?)
}

impl ContentService {
    /// Validates and stores a contact form message.
    ///
    /// Nothing is written when validation fails.
    pub async fn submit_contact_form(
        &self,
        submission: ContactSubmission,
    ) -> ContentResult<ContactMessage> {
        let mut message = submission.into_message(now_millis())?;
        let document = to_document(&message, "submit contact form")?;

        let key = self
            .facade()
            .push(&collection_path(InquiryKind::Contact)?, document)
            .await
            .map_err(|e| ContentError::write("submit contact form", e))?;
        message.id = EntityId::new(key);
        info!(id = %message.id, "Contact form submitted");
        Ok(message)
    }

    /// Validates and stores a package inquiry.
    pub async fn submit_package_inquiry(
        &self,
        package: PackageSelection,
        user_info: Option<UserInfo>,
        user_agent: Option<String>,
    ) -> ContentResult<PackageInquiry> {
        let mut inquiry = PackageInquiry::submit(package, user_info, now_millis())?;
        inquiry.user_agent = user_agent.filter(|ua| !ua.trim().is_empty());
        let document = to_document(&inquiry, "submit package inquiry")?;

        let key = self
            .facade()
            .push(&collection_path(InquiryKind::PackageInquiry)?, document)
            .await
            .map_err(|e| ContentError::write("submit package inquiry", e))?;
        inquiry.id = EntityId::new(key);
        info!(
            id = %inquiry.id,
            package = %inquiry.package_name,
            source = ?inquiry.source,
            "Package inquiry submitted"
        );
        Ok(inquiry)
    }

    /// Contact messages, newest first. Admin only.
    pub async fn get_contacts(
        &self,
        principal: Option<&Principal>,
    ) -> ContentResult<Vec<ContactMessage>> {
        self.authorize(principal)?;
        self.read_keyed(InquiryKind::Contact).await
    }

    /// Package inquiries, newest first. Admin only.
    pub async fn get_package_inquiries(
        &self,
        principal: Option<&Principal>,
    ) -> ContentResult<Vec<PackageInquiry>> {
        self.authorize(principal)?;
        self.read_keyed(InquiryKind::PackageInquiry).await
    }

    /// Contacts and package inquiries merged, newest first. Admin only.
    pub async fn get_all_inquiries(
        &self,
        principal: Option<&Principal>,
    ) -> ContentResult<Vec<InboxItem>> {
        self.authorize(principal)?;
        let (contacts, inquiries) = tokio::try_join!(
            self.read_keyed::<ContactMessage>(InquiryKind::Contact),
            self.read_keyed::<PackageInquiry>(InquiryKind::PackageInquiry),
        )?;
        Ok(merge_inbox(contacts, inquiries))
    }

    /// Totals per status and for the current month. Admin only.
    pub async fn contact_stats(&self, principal: Option<&Principal>) -> ContentResult<ContactStats> {
        let contacts = self.get_contacts(principal).await?;
        Ok(ContactStats::tally(&contacts, now_millis()))
    }

    pub async fn update_contact_status(
        &self,
        principal: Option<&Principal>,
        id: &str,
        status: InquiryStatus,
    ) -> ContentResult<()> {
        self.update_inquiry_status(principal, InquiryKind::Contact, id, status)
            .await
    }

    /// Sets the triage status of a contact message or package inquiry.
    pub async fn update_inquiry_status(
        &self,
        principal: Option<&Principal>,
        kind: InquiryKind,
        id: &str,
        status: InquiryStatus,
    ) -> ContentResult<()> {
        let admin = self.authorize(principal)?;
        let record = collection_path(kind)?.child(id)?;
        let action = format!("update {kind} status");

        let current = self.read(&record, ReadOptions::refresh(), &action).await?;
        if current.is_null() {
            return Err(FolioError::not_found(kind.as_str(), id).into());
        }

        self.write(
            &record.child("status")?,
            Value::String(status.as_str().to_string()),
            &action,
        )
        .await?;
        info!(%kind, id, %status, by = %admin.email, "Inquiry status updated");
        Ok(())
    }

    pub fn subscribe_to_contacts(&self) -> ContentResult<LiveFeed<Vec<ContactMessage>>> {
        self.subscribe_keyed(InquiryKind::Contact)
    }

    pub fn subscribe_to_package_inquiries(
        &self,
    ) -> ContentResult<LiveFeed<Vec<PackageInquiry>>> {
        self.subscribe_keyed(InquiryKind::PackageInquiry)
    }

    /// Live merged inbox, newest first.
    pub fn subscribe_to_all_inquiries(&self) -> ContentResult<InboxFeed> {
        Ok(InboxFeed {
            contacts: Some(self.subscribe_to_contacts()?),
            inquiries: Some(self.subscribe_to_package_inquiries()?),
            latest_contacts: None,
            latest_inquiries: None,
        })
    }

    async fn read_keyed<T: Keyed>(&self, kind: InquiryKind) -> ContentResult<Vec<T>> {
        let path = collection_path(kind)?;
        let action = format!("fetch {}", kind.collection());
        let value = self.read(&path, ReadOptions::default(), &action).await?;
        Ok(decode_keyed(&value).map_err(|e| FolioError::decode_error(path.as_str(), e))?)
    }

    fn subscribe_keyed<T: Keyed + Send + 'static>(
        &self,
        kind: InquiryKind,
    ) -> ContentResult<LiveFeed<Vec<T>>> {
        let path = collection_path(kind)?;
        let subscription = self
            .facade()
            .subscribe(&path, self.subscribe_options(Value::Null));
        Ok(LiveFeed::new(subscription, move |value| {
            decode_keyed(&value).unwrap_or_else(|e| {
                warn!(path = %path, error = %e, "Undecodable inbox snapshot");
                Vec::new()
            })
        }))
    }
}

enum InboxUpdate {
    Contacts(Option<Vec<ContactMessage>>),
    Inquiries(Option<Vec<PackageInquiry>>),
}

/// Live merged view of contacts and package inquiries.
///
/// The first delivery waits until both collections have reported; after
/// that every change to either one yields the full merged list.
#[derive(Debug)]
pub struct InboxFeed {
    contacts: Option<LiveFeed<Vec<ContactMessage>>>,
    inquiries: Option<LiveFeed<Vec<PackageInquiry>>>,
    latest_contacts: Option<Vec<ContactMessage>>,
    latest_inquiries: Option<Vec<PackageInquiry>>,
}

impl InboxFeed {
    /// Next merged inbox, or `None` once both feeds are closed.
    pub async fn recv(&mut self) -> Option<Vec<InboxItem>> {
        loop {
            if self.contacts.is_none() && self.inquiries.is_none() {
                return None;
            }

            let update = tokio::select! {
                next = recv_from(&mut self.contacts) => InboxUpdate::Contacts(next),
                next = recv_from(&mut self.inquiries) => InboxUpdate::Inquiries(next),
            };

            match update {
                InboxUpdate::Contacts(Some(items)) => self.latest_contacts = Some(items),
                InboxUpdate::Contacts(None) => {
                    self.contacts = None;
                    self.latest_contacts.get_or_insert_with(Vec::new);
                    continue;
                },
                InboxUpdate::Inquiries(Some(items)) => self.latest_inquiries = Some(items),
                InboxUpdate::Inquiries(None) => {
                    self.inquiries = None;
                    self.latest_inquiries.get_or_insert_with(Vec::new);
                    continue;
                },
            }

            if let (Some(contacts), Some(inquiries)) = (&self.latest_contacts, &self.latest_inquiries)
            {
                return Some(merge_inbox(contacts.clone(), inquiries.clone()));
            }
        }
    }

    /// Stops both underlying subscriptions.
    pub fn cancel(&mut self) {
        if let Some(feed) = self.contacts.as_mut() {
            feed.cancel();
        }
        if let Some(feed) = self.inquiries.as_mut() {
            feed.cancel();
        }
    }
}

async fn recv_from<T>(feed: &mut Option<LiveFeed<T>>) -> Option<T> {
    match feed {
        Some(feed) => feed.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_keyed_uses_keys_and_sorts_newest_first() {
        let doc = json!({
            "-Nb1": {"name": "Ana", "email": "ana@x.io", "timestamp": 10},
            "-Nb2": {"name": "Luis", "email": "luis@x.io", "timestamp": 30},
            "-Nb3": null
        });
        let contacts: Vec<ContactMessage> = decode_keyed(&doc).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].id, "-Nb2");
        assert_eq!(contacts[1].id, "-Nb1");
    }

    #[test]
    fn test_decode_keyed_keeps_stored_id() {
        let doc = json!({"-Nb1": {"id": "legacy-7", "packageName": "Starter", "timestamp": 1}});
        let inquiries: Vec<PackageInquiry> = decode_keyed(&doc).unwrap();
        assert_eq!(inquiries[0].id, "legacy-7");

        let empty: Vec<PackageInquiry> = decode_keyed(&Value::Null).unwrap();
        assert!(empty.is_empty());
    }
}
