//! Middleware stack para el servidor HTTP.
//!
//! - `RequestIdLayer`: genera o propaga X-Request-Id (UUID v7, ordenable por tiempo)
//! - `LoggingLayer`: span por request y log de cierre con status y duracion

mod logging;
mod request_id;

pub use logging::{LoggingLayer, LoggingMiddleware};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer, RequestIdMiddleware};
