//! Field validation helpers.
//!
//! Every check runs before any store access, so a rejected form never
//! touches the network.

use crate::error::{FolioError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static HTTP_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+").expect("url pattern is valid"));

/// Fails with "`<field>` is required" when the trimmed value is empty.
pub fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FolioError::validation_error(
            field,
            format!("{field} is required"),
        ));
    }
    Ok(())
}

/// Fails when the list has no element.
pub fn require_non_empty<T>(field: &str, items: &[T], what: &str) -> Result<()> {
    if items.is_empty() {
        return Err(FolioError::validation_error(
            field,
            format!("at least one {what} is required"),
        ));
    }
    Ok(())
}

/// Returns true for `local@domain.tld` shaped addresses.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Fails unless the value is a well-formed email address.
pub fn validate_email(field: &str, email: &str) -> Result<()> {
    require(field, email)?;
    if !is_valid_email(email) {
        return Err(FolioError::validation_error(
            field,
            "please enter a valid email address",
        ));
    }
    Ok(())
}

/// Returns true if the value parses as an absolute URL.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value.trim()).is_ok()
}

/// Fails unless an optional URL is absent, blank or well-formed.
pub fn validate_optional_url(field: &str, value: Option<&str>) -> Result<()> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() && !is_valid_url(v) => Err(FolioError::validation_error(
            field,
            "please enter a valid URL",
        )),
        _ => Ok(()),
    }
}

/// Fails unless the value starts with `http://` or `https://`.
pub fn validate_http_url(field: &str, value: &str) -> Result<()> {
    require(field, value)?;
    if !HTTP_URL_RE.is_match(value.trim()) {
        return Err(FolioError::validation_error(
            field,
            "URL must start with http:// or https://",
        ));
    }
    Ok(())
}
