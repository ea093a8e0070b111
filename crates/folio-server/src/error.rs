use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_core::FolioError;
use serde::Serialize;

use crate::content::ContentError;

#[derive(Debug)]
pub enum AppError {
    /// Recurso no encontrado
    NotFound(String),

    /// Parametros o cuerpo invalidos
    BadRequest(String),

    /// Falta la identidad del llamante
    Unauthorized(String),

    /// Identidad valida pero sin permisos
    Forbidden(String),

    /// El store remoto no responde
    ServiceUnavailable(String),

    /// Error interno
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        let message = err.to_string();
        match err {
            ContentError::Domain(domain) => match domain {
                FolioError::ValidationError { .. } | FolioError::InvalidPath { .. } => {
                    AppError::BadRequest(message)
                },
                FolioError::NotFound { .. } => AppError::NotFound(message),
                FolioError::Unauthenticated => AppError::Unauthorized(message),
                FolioError::Forbidden { .. } => AppError::Forbidden(message),
                FolioError::DecodeError { .. } | FolioError::Internal(_) => {
                    AppError::Internal(message)
                },
            },
            ref other if other.is_transient() => AppError::ServiceUnavailable(message),
            _ => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", msg),
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                msg,
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                msg,
            ),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), %message, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
