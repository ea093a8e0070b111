//! Tests del middleware de request id y CORS.

mod helpers;

use helpers::app;
use uuid::Uuid;

#[tokio::test]
async fn response_carries_generated_request_id() {
    let app = app();

    let response = app.client.get("/health").await;
    response.assert_header_exists("x-request-id");

    let id = Uuid::parse_str(response.header("x-request-id").unwrap()).unwrap();
    assert_eq!(id.get_version_num(), 7);
}

#[tokio::test]
async fn incoming_request_id_is_propagated() {
    let app = app();

    let response = app
        .client
        .get_with_headers("/api/team", &[("x-request-id", "edge-1234")])
        .await;
    response.assert_header("x-request-id", "edge-1234");
}

#[tokio::test]
async fn oversized_request_id_is_replaced() {
    let app = app();
    let huge = "x".repeat(200);

    let response = app
        .client
        .get_with_headers("/health", &[("x-request-id", huge.as_str())])
        .await;
    assert_ne!(response.header("x-request-id"), Some(huge.as_str()));
}

#[tokio::test]
async fn request_ids_are_unique() {
    let app = app();

    let first = app.client.get("/health").await;
    let second = app.client.get("/health").await;
    assert_ne!(
        first.header("x-request-id").unwrap(),
        second.header("x-request-id").unwrap()
    );
}

#[tokio::test]
async fn request_id_present_on_errors() {
    let app = app();

    let response = app.client.get("/api/services/missing").await;
    response.assert_header_exists("x-request-id");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app();

    let response = app
        .client
        .get_with_headers("/api/courses", &[("origin", "https://agency.example")])
        .await;
    response.assert_header("access-control-allow-origin", "*");
}
