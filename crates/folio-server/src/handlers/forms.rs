//! Public form submissions.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};
use folio_core::{ContactMessage, ContactSubmission, PackageInquiry, PackageSelection, UserInfo};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Cuerpo de POST /api/inquiries
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    pub package: PackageSelection,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut submission): Json<ContactSubmission>,
) -> Result<(StatusCode, Json<ContactMessage>), AppError> {
    if submission.user_agent.is_none() {
        submission.user_agent = user_agent(&headers);
    }
    let message = state.content().submit_contact_form(submission).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/inquiries
pub async fn submit_inquiry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<InquiryRequest>,
) -> Result<(StatusCode, Json<PackageInquiry>), AppError> {
    let inquiry = state
        .content()
        .submit_package_inquiry(request.package, request.user_info, user_agent(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(inquiry)))
}
