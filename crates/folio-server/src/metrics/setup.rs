//! Metrics setup and initialization.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;
use tracing::info;

/// Buckets para histogramas de latencia (en segundos).
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, // 100 microsegundos
    0.0005, // 500 microsegundos
    0.001,  // 1 milisegundo
    0.005,  // 5 milisegundos
    0.01,   // 10 milisegundos
    0.025,  // 25 milisegundos
    0.05,   // 50 milisegundos
    0.1,    // 100 milisegundos
    0.25,   // 250 milisegundos
    0.5,    // 500 milisegundos
    1.0,    // 1 segundo
    2.5,    // 2.5 segundos
    5.0,    // 5 segundos
];

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to configure metrics exporter: {0}")]
    Build(#[from] BuildError),
}

fn builder() -> Result<PrometheusBuilder, MetricsError> {
    Ok(PrometheusBuilder::new().set_buckets(LATENCY_BUCKETS)?)
}

/// Instala el recorder global y retorna el handle para el endpoint /metrics.
pub fn init_metrics() -> Result<PrometheusHandle, MetricsError> {
    let handle = builder()?.install_recorder()?;
    register_all_metrics();

    info!("Metrics system initialized");
    Ok(handle)
}

/// Crea un handle sin instalar el recorder global (tests).
pub fn build_metrics() -> Result<PrometheusHandle, MetricsError> {
    Ok(builder()?.build_recorder().handle())
}

/// Registra las descripciones de todas las metricas del servidor.
pub fn register_all_metrics() {
    super::http::register_http_metrics();
    folio_cache::register_cache_metrics();
    metrics::describe_counter!(
        "folio_store_retries_total",
        "Store operations retried after a transient failure"
    );
}
