//! Caller identity and the admin allowlist.
//!
//! Identity comes from an external provider; only the uid and email it
//! vouches for are read here.

use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub uid: String,
    pub email: String,
}

impl Principal {
    /// Creates a principal from the provider's uid and email.
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

/// Emails allowed to change site content and read the inbox.
///
/// Matching ignores case and surrounding whitespace.
///
/// # Example
///
/// ```
/// use folio_core::{AdminPolicy, Principal};
///
/// let policy = AdminPolicy::new(["Owner@Studio.dev"]);
/// assert!(policy.is_admin(&Principal::new("u1", "owner@studio.dev")));
/// assert!(policy.authorize(Some(&Principal::new("u2", "guest@x.io"))).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AdminPolicy {
    emails: HashSet<String>,
}

impl AdminPolicy {
    /// Builds a policy from the allowlisted emails.
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|e| normalize(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Returns true if the principal's email is allowlisted.
    pub fn is_admin(&self, principal: &Principal) -> bool {
        self.emails.contains(&normalize(&principal.email))
    }

    /// Fails with `Unauthenticated` without a principal and with `Forbidden`
    /// unless it is allowlisted.
    pub fn authorize<'a>(&self, principal: Option<&'a Principal>) -> Result<&'a Principal> {
        match principal {
            None => Err(FolioError::Unauthenticated),
            Some(p) if self.is_admin(p) => Ok(p),
            Some(p) => Err(FolioError::forbidden(&p.email, "not an administrator")),
        }
    }

    /// Number of allowlisted emails.
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    /// Returns true if nobody is allowlisted.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_is_case_insensitive() {
        let policy = AdminPolicy::new([" ADMIN@studio.dev ", ""]);
        assert_eq!(policy.len(), 1);
        assert!(policy.is_admin(&Principal::new("1", "admin@Studio.dev")));
        assert!(!policy.is_admin(&Principal::new("2", "other@studio.dev")));
    }

    #[test]
    fn test_authorize() {
        let policy = AdminPolicy::new(["admin@studio.dev"]);
        let admin = Principal::new("1", "admin@studio.dev");

        assert_eq!(policy.authorize(Some(&admin)).unwrap().uid, "1");
        assert!(policy.authorize(None).unwrap_err().is_unauthenticated());

        let guest = Principal::new("2", "guest@studio.dev");
        let err = policy.authorize(Some(&guest)).unwrap_err();
        assert!(err.to_string().contains("guest@studio.dev"));
    }

    #[test]
    fn test_anonymous_named_principal_is_forbidden() {
        let policy = AdminPolicy::new(["admin@studio.dev"]);
        let named = Principal::new("3", "anonymous");

        let err = policy.authorize(Some(&named)).unwrap_err();
        assert!(err.is_forbidden());
        assert!(!err.is_unauthenticated());
    }

    #[test]
    fn test_empty_policy_denies_everyone() {
        let policy = AdminPolicy::default();
        assert!(policy.is_empty());
        assert!(policy.authorize(Some(&Principal::new("1", "a@b.co"))).is_err());
    }
}
