//! URL slugs for services and courses.

use crate::model::{Course, Service};

/// Slugs kept for the first four services so their old links stay valid.
const LEGACY_SERVICE_SLUGS: [(&str, &str); 4] = [
    ("1", "web-design-development"),
    ("2", "seo-services"),
    ("3", "admin-panels"),
    ("4", "full-stack-solutions"),
];

/// Lowercase, dash-separated slug of a title. Empty titles give `""`.
pub fn create_slug(title: &str) -> String {
    ::slug::slugify(title)
}

/// Slug of a service: its legacy slug if it has one, else from the title.
pub fn service_slug(service: &Service) -> String {
    LEGACY_SERVICE_SLUGS
        .iter()
        .find(|(id, _)| service.id == *id)
        .map(|(_, slug)| (*slug).to_string())
        .unwrap_or_else(|| create_slug(&service.title))
}

/// Slug of a course.
pub fn course_slug(course: &Course) -> String {
    create_slug(&course.title)
}

/// Finds a service by id or slug.
pub fn find_service<'a>(services: &'a [Service], id_or_slug: &str) -> Option<&'a Service> {
    let wanted = id_or_slug.trim();
    services
        .iter()
        .find(|s| s.id == wanted)
        .or_else(|| services.iter().find(|s| service_slug(s) == wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(id: &str, title: &str) -> Service {
        Service {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_slug() {
        assert_eq!(create_slug("Web Design & Development"), "web-design-development");
        assert_eq!(create_slug("  Hello, World!  "), "hello-world");
        assert_eq!(create_slug(""), "");
    }

    #[test]
    fn test_service_slug_prefers_legacy_map() {
        assert_eq!(service_slug(&service("2", "Search Engine Optimisation")), "seo-services");
        assert_eq!(
            service_slug(&service("1712345678901", "Brand Identity")),
            "brand-identity"
        );
    }

    #[test]
    fn test_find_service() {
        let services = vec![service("3", "Admin Panels"), service("99", "Mobile Apps")];
        assert_eq!(find_service(&services, "admin-panels").unwrap().id, "3");
        assert_eq!(find_service(&services, "mobile-apps").unwrap().id, "99");
        assert_eq!(find_service(&services, "99").unwrap().title, "Mobile Apps");
        assert!(find_service(&services, "nope").is_none());
    }
}
