//! HTTP handlers.

/// Runs `$body` with `$T` bound to the record type of a collection section.
macro_rules! with_record_type {
    ($section:expr, $T:ident => $body:expr) => {
        match $section {
            folio_core::WebsiteSection::Courses => {
                type $T = folio_core::Course;
                $body
            },
            folio_core::WebsiteSection::Projects => {
                type $T = folio_core::Project;
                $body
            },
            folio_core::WebsiteSection::Services => {
                type $T = folio_core::Service;
                $body
            },
            folio_core::WebsiteSection::Team => {
                type $T = folio_core::TeamMember;
                $body
            },
            folio_core::WebsiteSection::Process => {
                type $T = folio_core::ProcessStep;
                $body
            },
            folio_core::WebsiteSection::Packages => {
                type $T = folio_core::ServicePackage;
                $body
            },
            other => Err($crate::error::AppError::NotFound(format!(
                "Unknown collection '{other}'"
            ))),
        }
    };
}

pub mod admin;
pub mod cache;
pub mod content;
pub mod forms;
pub mod health;
pub mod live;
pub mod metrics;
