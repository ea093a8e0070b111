use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::handlers::{admin, cache, content, forms, health::health_check, live, metrics::metrics_handler};
use crate::middleware::{LoggingLayer, RequestIdLayer};
use crate::state::AppState;

/// Public reads, forms and live feeds.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/website", get(content::get_website))
        .route("/api/courses", get(content::list_courses))
        .route("/api/projects", get(content::list_projects))
        .route("/api/services", get(content::list_services))
        .route("/api/services/{slug}", get(content::get_service))
        .route("/api/team", get(content::list_team))
        .route("/api/process", get(content::list_process))
        .route("/api/packages", get(content::list_packages))
        .route("/api/contact", post(forms::submit_contact))
        .route("/api/inquiries", post(forms::submit_inquiry))
        .route("/api/live/{section}", get(live::live_section))
}

/// Dashboard routes; handlers check the caller against the allowlist.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/inquiries", get(admin::list_inquiries))
        .route(
            "/api/admin/inquiries/{kind}/{id}/status",
            put(admin::update_inquiry_status),
        )
        .route("/api/admin/contacts/stats", get(admin::contact_stats))
        .route("/api/admin/live/inquiries", get(live::live_inquiries))
        .route("/api/admin/website/initialize", post(admin::initialize_website))
        .route("/api/admin/website/{section}", put(admin::update_section))
        .route(
            "/api/admin/{collection}",
            get(admin::list_records).post(admin::create_record),
        )
        .route("/api/admin/{collection}/order", get(admin::order_statistics))
        .route(
            "/api/admin/{collection}/{id}",
            put(admin::update_record).delete(admin::delete_record),
        )
        .route("/api/admin/{collection}/{id}/position", put(admin::move_record))
}

fn cache_routes() -> Router<AppState> {
    Router::new()
        .route("/cache", delete(cache::invalidate_all))
        .route("/cache/stats", get(cache::cache_stats))
        .route("/cache/{*pattern}", delete(cache::invalidate_by_pattern))
}

fn build_router(state: AppState, prometheus_handle: Option<PrometheusHandle>) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer);

    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(public_routes())
        .merge(admin_routes())
        .merge(cache_routes())
        .with_state(state);

    // Router del endpoint de metricas (otro state)
    if let Some(handle) = prometheus_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics_handler))
                .with_state(handle),
        );
    }

    router
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(middleware_stack)
}

/// Creates the application router without the metrics endpoint.
pub fn create_router(state: AppState) -> Router {
    build_router(state, None)
}

/// Creates the application router with `/metrics` served from `prometheus_handle`.
pub fn create_router_with_metrics(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    build_router(state, Some(prometheus_handle))
}

/// Runs the server until a shutdown signal arrives.
pub async fn run_server_with_state(
    addr: SocketAddr,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router_with_metrics(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Completes on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
