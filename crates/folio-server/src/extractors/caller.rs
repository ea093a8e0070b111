use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, request::Parts},
};
use folio_core::Principal;

/// Email verificado por el proxy de identidad.
pub static AUTH_EMAIL_HEADER: HeaderName = HeaderName::from_static("x-auth-email");

/// UID verificado por el proxy de identidad.
pub static AUTH_UID_HEADER: HeaderName = HeaderName::from_static("x-auth-uid");

/// Identidad del llamante, si el proxy la envio.
///
/// Nunca rechaza: la autorizacion la decide `ContentService`.
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<Principal>);

impl Caller {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let principal = header(&AUTH_EMAIL_HEADER).map(|email| {
            let uid = header(&AUTH_UID_HEADER).unwrap_or(email);
            Principal::new(uid, email)
        });
        Self(principal)
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
