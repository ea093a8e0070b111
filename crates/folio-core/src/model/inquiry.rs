use super::contact::ContactMessage;
use super::service::ServicePackage;
use crate::error::{FolioError, Result};
use crate::types::{EntityId, InquiryStatus, Millis};
use crate::validation::{require, validate_email};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two kinds of inbound requests an admin triages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryKind {
    /// Contact form message
    Contact,
    /// Package inquiry
    PackageInquiry,
}

impl InquiryKind {
    /// Top-level collection holding records of this kind.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Contact => "contacts",
            Self::PackageInquiry => "package_inquiries",
        }
    }

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::PackageInquiry => "package_inquiry",
        }
    }

    fn display_type(self) -> &'static str {
        match self {
            Self::Contact => "Contact Form",
            Self::PackageInquiry => "Package Inquiry",
        }
    }
}

impl fmt::Display for InquiryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InquiryKind {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "contact" | "contacts" => Ok(Self::Contact),
            "package_inquiry" | "package_inquiries" | "package" => Ok(Self::PackageInquiry),
            other => Err(FolioError::validation_error(
                "kind",
                format!("unknown inquiry kind '{other}'"),
            )),
        }
    }
}

/// How a package inquiry was submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquirySource {
    /// Through the details modal, with contact information
    ModalForm,
    /// Quick selection without contact information
    #[default]
    DirectSelection,
}

/// Contact details left with a package inquiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub company: Option<String>,
}

impl UserInfo {
    fn normalized(self) -> Result<Self> {
        require("name", &self.name)?;
        validate_email("email", &self.email)?;
        require("mobile", &self.mobile)?;

        Ok(Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            mobile: self.mobile.trim().to_string(),
            company: self
                .company
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        })
    }
}

/// The package a visitor picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSelection {
    pub name: String,
    pub price: String,
    pub description: String,
    pub features: Vec<String>,
    pub featured: bool,
}

impl From<&ServicePackage> for PackageSelection {
    fn from(pkg: &ServicePackage) -> Self {
        Self {
            name: pkg.name.clone(),
            price: pkg.price.clone(),
            description: pkg.description.clone(),
            features: pkg.features.clone(),
            featured: pkg.featured,
        }
    }
}

/// A visitor's interest in a service package.
///
/// Stored under `package_inquiries/<push key>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageInquiry {
    #[serde(skip_serializing_if = "EntityId::is_empty")]
    pub id: EntityId,
    pub package_name: String,
    pub package_price: String,
    pub package_description: String,
    pub package_features: Vec<String>,
    pub package_featured: bool,
    pub user_info: Option<UserInfo>,
    pub timestamp: Millis,
    pub status: InquiryStatus,
    pub source: InquirySource,
    pub has_user_details: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl PackageInquiry {
    /// Validates the submission and builds the stored inquiry.
    ///
    /// Contact details are optional; when given, name, email and mobile
    /// are required and the email must be well formed.
    pub fn submit(
        package: PackageSelection,
        user_info: Option<UserInfo>,
        now: Millis,
    ) -> Result<Self> {
        require("packageName", &package.name)?;
        let user_info = user_info.map(UserInfo::normalized).transpose()?;
        let source = if user_info.is_some() {
            InquirySource::ModalForm
        } else {
            InquirySource::DirectSelection
        };

        Ok(Self {
            id: EntityId::default(),
            package_name: package.name.trim().to_string(),
            package_price: package.price,
            package_description: package.description,
            package_features: package.features,
            package_featured: package.featured,
            has_user_details: user_info.is_some(),
            user_info,
            timestamp: now,
            status: InquiryStatus::New,
            source,
            user_agent: None,
        })
    }
}

/// Admin attention level of an inbox item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
}

impl From<InquiryStatus> for Priority {
    fn from(status: InquiryStatus) -> Self {
        if status == InquiryStatus::New {
            Self::High
        } else {
            Self::Normal
        }
    }
}

/// Underlying record of an inbox item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InboxRecord {
    Contact(ContactMessage),
    Package(PackageInquiry),
}

/// One row of the combined admin inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxItem {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: InquiryKind,
    pub display_type: &'static str,
    pub title: String,
    pub subtitle: String,
    pub priority: Priority,
    pub status: InquiryStatus,
    pub timestamp: Millis,
    pub record: InboxRecord,
}

impl From<ContactMessage> for InboxItem {
    fn from(contact: ContactMessage) -> Self {
        Self {
            id: contact.id.clone(),
            kind: InquiryKind::Contact,
            display_type: InquiryKind::Contact.display_type(),
            title: contact.subject.clone(),
            subtitle: format!("{} • {}", contact.name, contact.email),
            priority: contact.status.into(),
            status: contact.status,
            timestamp: contact.timestamp,
            record: InboxRecord::Contact(contact),
        }
    }
}

impl From<PackageInquiry> for InboxItem {
    fn from(inquiry: PackageInquiry) -> Self {
        let subtitle = match &inquiry.user_info {
            Some(info) => format!("{} • {}", info.name, info.email),
            None => "Quick Selection".to_string(),
        };
        Self {
            id: inquiry.id.clone(),
            kind: InquiryKind::PackageInquiry,
            display_type: InquiryKind::PackageInquiry.display_type(),
            title: format!("{} Package", inquiry.package_name),
            subtitle,
            priority: inquiry.status.into(),
            status: inquiry.status,
            timestamp: inquiry.timestamp,
            record: InboxRecord::Package(inquiry),
        }
    }
}

/// Merges contacts and package inquiries, newest first.
pub fn merge_inbox(contacts: Vec<ContactMessage>, inquiries: Vec<PackageInquiry>) -> Vec<InboxItem> {
    let mut items: Vec<InboxItem> = contacts
        .into_iter()
        .map(InboxItem::from)
        .chain(inquiries.into_iter().map(InboxItem::from))
        .collect();
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> PackageSelection {
        PackageSelection {
            name: "Professional".into(),
            price: "$5,999".into(),
            description: "Growing brands".into(),
            features: vec!["10 pages".into()],
            featured: true,
        }
    }

    #[test]
    fn test_submit_without_user_info_is_direct_selection() {
        let inquiry = PackageInquiry::submit(selection(), None, 10).unwrap();
        assert_eq!(inquiry.source, InquirySource::DirectSelection);
        assert!(!inquiry.has_user_details);
        assert_eq!(inquiry.status, InquiryStatus::New);
        assert!(inquiry.package_featured);
    }

    #[test]
    fn test_submit_with_user_info_validates_and_normalizes() {
        let info = UserInfo {
            name: " Ana ".into(),
            email: "ANA@x.io".into(),
            mobile: " +34 600 ".into(),
            company: Some("  ".into()),
        };
        let inquiry = PackageInquiry::submit(selection(), Some(info), 10).unwrap();
        let info = inquiry.user_info.unwrap();
        assert_eq!(info.email, "ana@x.io");
        assert_eq!(info.mobile, "+34 600");
        assert_eq!(info.company, None);
        assert_eq!(inquiry.source, InquirySource::ModalForm);

        let bad = UserInfo {
            name: "Ana".into(),
            email: "ana@x.io".into(),
            mobile: String::new(),
            company: None,
        };
        let err = PackageInquiry::submit(selection(), Some(bad), 10).unwrap_err();
        assert!(err.to_string().contains("mobile"));
    }

    #[test]
    fn test_wire_names() {
        let inquiry = PackageInquiry::submit(selection(), None, 10).unwrap();
        let json = serde_json::to_value(&inquiry).unwrap();
        assert_eq!(json["packageName"], "Professional");
        assert_eq!(json["source"], "direct_selection");
        assert_eq!("contacts".parse::<InquiryKind>().unwrap(), InquiryKind::Contact);
        assert_eq!(InquiryKind::PackageInquiry.collection(), "package_inquiries");
    }

    #[test]
    fn test_merge_inbox_newest_first_with_priority() {
        let contact = ContactMessage {
            id: "c1".into(),
            name: "Ana".into(),
            email: "ana@x.io".into(),
            subject: "Hello".into(),
            timestamp: 200,
            status: InquiryStatus::Read,
            ..Default::default()
        };
        let mut inquiry = PackageInquiry::submit(selection(), None, 300).unwrap();
        inquiry.id = "p1".into();

        let inbox = merge_inbox(vec![contact], vec![inquiry]);
        assert_eq!(inbox[0].id, "p1");
        assert_eq!(inbox[0].title, "Professional Package");
        assert_eq!(inbox[0].subtitle, "Quick Selection");
        assert_eq!(inbox[0].priority, Priority::High);
        assert_eq!(inbox[1].subtitle, "Ana • ana@x.io");
        assert_eq!(inbox[1].priority, Priority::Normal);

        let json = serde_json::to_value(&inbox[1]).unwrap();
        assert_eq!(json["type"], "contact");
        assert_eq!(json["displayType"], "Contact Form");
    }
}
