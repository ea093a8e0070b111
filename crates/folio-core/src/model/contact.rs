use crate::error::Result;
use crate::types::{EntityId, InquiryStatus, Millis, same_month};
use crate::validation::{require, validate_email};
use serde::{Deserialize, Serialize};

/// A message sent through the public contact form.
///
/// Stored under `contacts/<push key>`; the key becomes the id on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactMessage {
    #[serde(skip_serializing_if = "EntityId::is_empty")]
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub timestamp: Millis,
    pub status: InquiryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Raw contact form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub user_agent: Option<String>,
}

impl ContactSubmission {
    /// Validates the form and builds the stored message.
    ///
    /// All fields are required, the email must be well formed. Values are
    /// trimmed and the email lowercased. The message starts as `new`.
    pub fn into_message(self, now: Millis) -> Result<ContactMessage> {
        require("name", &self.name)?;
        validate_email("email", &self.email)?;
        require("subject", &self.subject)?;
        require("message", &self.message)?;

        Ok(ContactMessage {
            id: EntityId::default(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
            timestamp: now,
            status: InquiryStatus::New,
            user_agent: self.user_agent.filter(|ua| !ua.trim().is_empty()),
        })
    }
}

/// Counts of contact messages by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total: usize,
    pub new: usize,
    pub read: usize,
    pub replied: usize,
    pub archived: usize,
    /// Messages received in the current calendar month (UTC)
    pub this_month: usize,
}

impl ContactStats {
    /// Tallies the given messages relative to `now`.
    pub fn tally<'a>(messages: impl IntoIterator<Item = &'a ContactMessage>, now: Millis) -> Self {
        let mut stats = Self::default();
        for message in messages {
            stats.total += 1;
            match message.status {
                InquiryStatus::New => stats.new += 1,
                InquiryStatus::Read => stats.read += 1,
                InquiryStatus::Replied => stats.replied += 1,
                InquiryStatus::Archived => stats.archived += 1,
            }
            if same_month(message.timestamp, now) {
                stats.this_month += 1;
            }
        }
        stats
    }
}
