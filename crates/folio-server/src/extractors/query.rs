use folio_core::InquiryStatus;
use serde::Deserialize;

/// Query parameters opcionales para lecturas.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ReadQuery {
    /// Forzar refresh del cache (bypass).
    #[serde(rename = "forceRefresh")]
    pub force_refresh: bool,
}

/// Cuerpo de PUT /api/admin/inquiries/{kind}/{id}/status
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: InquiryStatus,
}
