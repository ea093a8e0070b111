use folio_core::{InquiryKind, WebsiteSection};
use serde::Deserialize;

use crate::error::AppError;

/// Extractor para rutas /api/admin/{collection}
#[derive(Debug, Deserialize)]
pub struct CollectionPath {
    pub collection: String,
}

/// Extractor para rutas /api/admin/{collection}/{id}
#[derive(Debug, Deserialize)]
pub struct RecordPath {
    pub collection: String,
    pub id: String,
}

/// Extractor para rutas /api/live/{section} y /api/admin/website/{section}
#[derive(Debug, Deserialize)]
pub struct SectionPath {
    pub section: String,
}

/// Extractor para rutas /api/admin/inquiries/{kind}/{id}/status
#[derive(Debug, Deserialize)]
pub struct InquiryStatusPath {
    pub kind: String,
    pub id: String,
}

/// Parsea el nombre de una coleccion editable (courses, projects, ...).
pub(crate) fn parse_collection(name: &str) -> Result<WebsiteSection, AppError> {
    match name.parse::<WebsiteSection>() {
        Ok(section) if section.is_collection() => Ok(section),
        _ => Err(AppError::NotFound(format!("Unknown collection '{name}'"))),
    }
}

impl SectionPath {
    pub fn section(&self) -> Result<WebsiteSection, AppError> {
        self.section
            .parse()
            .map_err(|_| AppError::NotFound(format!("Unknown website section '{}'", self.section)))
    }
}

impl InquiryStatusPath {
    pub fn kind(&self) -> Result<InquiryKind, AppError> {
        self.kind
            .parse()
            .map_err(|e: folio_core::FolioError| AppError::BadRequest(e.to_string()))
    }
}
