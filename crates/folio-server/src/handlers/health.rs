use axum::{Json, extract::State, http::StatusCode};
use folio_cache::CacheStats;
use folio_store::ConnectionReport;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub connection: ConnectionReport,
    pub cache: CacheStats,
    pub subscriptions: usize,
}

/// GET /health
/// UP si el store responde; DOWN (503) si no.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.store();
    let (code, status) = match store.health_check().await {
        Ok(()) => (StatusCode::OK, "UP"),
        Err(e) => {
            warn!(store = store.name(), error = %e, "Store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "DOWN")
        },
    };

    let body = HealthResponse {
        status: status.to_string(),
        store: store.name().to_string(),
        connection: state.connection().report(),
        cache: state.facade().cache_stats(),
        subscriptions: state.facade().subscription_count(),
    };
    (code, Json(body))
}
