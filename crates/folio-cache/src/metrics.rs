//! Cache and subscription metrics.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache y suscripciones.
/// Llamar una vez al inicio, despues de instalar el recorder.
pub fn register_cache_metrics() {
    metrics::describe_counter!("folio_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("folio_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "folio_cache_dedup_joins_total",
        "Requests that joined an in-flight producer instead of starting one"
    );
    metrics::describe_counter!(
        "folio_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_gauge!("folio_cache_entries", "Current number of entries in cache");
    metrics::describe_histogram!(
        "folio_cache_producer_seconds",
        "Time spent by producers of cache misses"
    );
    metrics::describe_counter!(
        "folio_subscription_pushes_total",
        "Snapshots received by live subscriptions, by outcome"
    );
    metrics::describe_gauge!(
        "folio_subscriptions_active",
        "Current number of live subscriptions"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos para que `stats()` no dependa del recorder.
#[derive(Debug, Clone)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    joins: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            joins: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("folio_cache_hits_total").increment(1);
    }

    /// Registra un cache miss (arranca un productor)
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("folio_cache_misses_total").increment(1);
    }

    /// Registra un request que se unio a uno en curso
    pub fn record_join(&self) {
        self.joins.fetch_add(1, Ordering::Relaxed);
        counter!("folio_cache_dedup_joins_total").increment(1);
    }

    /// Registra una eviction
    pub fn record_eviction(&self, reason: &str, count: u64) {
        if count > 0 {
            counter!("folio_cache_evictions_total", "reason" => reason.to_string())
                .increment(count);
        }
    }

    /// Actualiza el gauge de entries
    pub fn update_entry_count(&self, count: usize) {
        gauge!("folio_cache_entries").set(count as f64);
    }

    /// Registra la duracion de un productor
    pub fn record_producer_duration(&self, outcome: &str, duration: Duration) {
        histogram!(
            "folio_cache_producer_seconds",
            "outcome" => outcome.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64 + self.joins() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Retorna el numero de hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Retorna el numero de misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Retorna el numero de joins
    pub fn joins(&self) -> u64 {
        self.joins.load(Ordering::Relaxed)
    }
}

impl Default for CacheMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Resultado de un snapshot recibido por una suscripcion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Entregado al consumidor
    Delivered,
    /// Descartado por el throttle
    Dropped,
    /// Guardado para entregar al cerrar la ventana
    Deferred,
    /// Error o valor ausente, se entrego el fallback
    Fallback,
}

impl PushOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::Dropped => "dropped",
            Self::Deferred => "deferred",
            Self::Fallback => "fallback",
        }
    }
}

/// Registra un snapshot de suscripcion
pub fn record_subscription_push(outcome: PushOutcome) {
    counter!("folio_subscription_pushes_total", "outcome" => outcome.as_str()).increment(1);
}

/// Actualiza el gauge de suscripciones activas
pub fn update_active_subscriptions(count: usize) {
    gauge!("folio_subscriptions_active").set(count as f64);
}
