//! Tests del endpoint de salud.

mod helpers;

use axum::http::StatusCode;
use helpers::app;
use serde_json::Value;

#[tokio::test]
async fn health_check_returns_up() {
    let app = app();

    let response = app.client.get("/health").await;
    response.assert_status(StatusCode::OK);

    let json: Value = response.json();
    assert_eq!(json["status"], "UP");
    assert_eq!(json["store"], "memory");
    assert_eq!(json["subscriptions"], 0);
    assert!(json["cache"].is_object());
    assert!(json["connection"].is_object());
}

#[tokio::test]
async fn health_check_reports_down_when_store_is_offline() {
    let app = app();
    app.store.set_offline(true);

    let response = app.client.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json: Value = response.json();
    assert_eq!(json["status"], "DOWN");
}

#[tokio::test]
async fn health_check_includes_cache_stats() {
    let app = app();
    app.client.get("/api/courses").await;

    let json: Value = app.client.get("/health").await.json();
    assert_eq!(json["cache"]["entries"], 1);
    assert_eq!(json["cache"]["misses"], 1);
}
