//! Cache invalidation and introspection endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use folio_cache::{CacheStats, SubscriptionInfo};
use folio_core::StorePath;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Response para operaciones de invalidación.
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Número de entries invalidadas.
    pub invalidated: usize,
    /// Mensaje descriptivo.
    pub message: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct InvalidateAllQuery {
    /// Solo elimina entries expiradas.
    #[serde(rename = "expiredOnly")]
    pub expired_only: bool,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub cache: CacheStats,
    pub subscriptions: Vec<SubscriptionInfo>,
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// DELETE /cache
/// Invalida toda la cache, o solo lo expirado con ?expiredOnly=true.
#[instrument(skip_all)]
pub async fn invalidate_all(
    State(state): State<AppState>,
    Query(query): Query<InvalidateAllQuery>,
) -> Json<InvalidateResponse> {
    let cache = state.facade().cache();

    let response = if query.expired_only {
        let count = cache.purge_expired();
        InvalidateResponse {
            invalidated: count,
            message: format!("Purged {count} expired cache entries"),
        }
    } else {
        let count = cache.len();
        cache.clear();
        InvalidateResponse {
            invalidated: count,
            message: format!("Invalidated all {count} cache entries"),
        }
    };

    tracing::info!(count = response.invalidated, "Cache invalidated");
    Json(response)
}

/// DELETE /cache/{*pattern}
/// Un path (`website/courses`) invalida sus lecturas, ancestros y
/// descendientes; un glob (`website/*`) se aplica sobre las keys.
#[instrument(skip(state))]
pub async fn invalidate_by_pattern(
    State(state): State<AppState>,
    Path(pattern): Path<String>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let pattern = pattern.trim_matches('/');
    let facade = state.facade();

    let (result, target) = if is_glob(pattern) {
        let key_pattern = format!("{}_{pattern}", folio_cache::keys::STORE_KEY_PREFIX);
        (facade.invalidate_matching(&key_pattern), format!("pattern '{pattern}'"))
    } else {
        let path = StorePath::parse(pattern).map_err(|e| AppError::BadRequest(e.to_string()))?;
        (facade.invalidate(&path), format!("path '{path}'"))
    };

    Ok(Json(InvalidateResponse {
        invalidated: result.count,
        message: format!("Invalidated {} cache entries for {target}", result.count),
    }))
}

/// GET /cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let facade = state.facade();
    Json(CacheStatsResponse {
        cache: facade.cache_stats(),
        subscriptions: facade.active_subscriptions(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_glob() {
        assert!(is_glob("website/*"));
        assert!(is_glob("contact?"));
        assert!(!is_glob("website/courses"));
    }
}
