//! Tests de las lecturas publicas.

mod helpers;

use axum::http::StatusCode;
use helpers::{app, app_with, assert_error_body, field_values};
use serde_json::{Value, json};

#[tokio::test]
async fn courses_are_published_only_and_in_display_order() {
    let app = app();

    let response = app.client.get("/api/courses").await;
    response.assert_status(StatusCode::OK);

    let json: Value = response.json();
    assert_eq!(field_values(&json, "title"), vec!["Figma Pro", "Rust Basics"]);
}

#[tokio::test]
async fn course_filters_ignore_case() {
    let app = app();

    let json: Value = app.client.get("/api/courses?category=programming").await.json();
    assert_eq!(field_values(&json, "title"), vec!["Rust Basics"]);

    let json: Value = app.client.get("/api/courses?provider=UDEMY").await.json();
    assert_eq!(field_values(&json, "title"), vec!["Figma Pro"]);

    let json: Value = app
        .client
        .get("/api/courses?category=design&provider=folio%20academy")
        .await
        .json();
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn project_featured_filter() {
    let app = app();

    let json: Value = app.client.get("/api/projects?featured=true").await.json();
    assert_eq!(field_values(&json, "id"), vec!["p1"]);

    let json: Value = app.client.get("/api/projects?featured=false").await.json();
    assert_eq!(field_values(&json, "id"), vec!["p2"]);
}

#[tokio::test]
async fn service_lookup_by_id_slug_and_legacy_slug() {
    let app = app();

    let json: Value = app
        .client
        .get("/api/services/web-design-development")
        .await
        .json();
    assert_eq!(json["id"], "1");

    let json: Value = app.client.get("/api/services/brand-strategy").await.json();
    assert_eq!(json["id"], "s9");

    let json: Value = app.client.get("/api/services/s9").await.json();
    assert_eq!(json["title"], "Brand Strategy");
}

#[tokio::test]
async fn unknown_service_is_not_found() {
    let app = app();

    let response = app.client.get("/api/services/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_error_body(&response.json(), "Not Found");
}

#[tokio::test]
async fn team_hides_inactive_members() {
    let app = app();

    let json: Value = app.client.get("/api/team").await.json();
    assert_eq!(field_values(&json, "name"), vec!["Ana"]);
}

#[tokio::test]
async fn process_and_packages_are_listed() {
    let app = app();

    let json: Value = app.client.get("/api/process").await.json();
    assert_eq!(field_values(&json, "title"), vec!["Discover"]);

    let json: Value = app.client.get("/api/packages").await.json();
    assert_eq!(field_values(&json, "name"), vec!["Starter"]);
}

#[tokio::test]
async fn website_document_without_drafts() {
    let app = app();

    let json: Value = app.client.get("/api/website").await.json();
    assert_eq!(json["hero"]["title"], "Folio");
    assert_eq!(json["courses"].as_array().unwrap().len(), 2);
    assert_eq!(json["team"].as_array().unwrap().len(), 1);
    assert_eq!(json["contact"], json!({}));
}

#[tokio::test]
async fn empty_store_gives_empty_structure() {
    let app = app_with(Value::Null);

    let json: Value = app.client.get("/api/website").await.json();
    assert_eq!(json["hero"], json!({}));
    assert_eq!(json["services"], json!([]));

    let json: Value = app.client.get("/api/courses").await.json();
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn repeated_reads_hit_the_cache() {
    let app = app();

    app.client.get("/api/courses").await;
    app.client.get("/api/courses?category=design").await;
    app.client.get("/api/courses").await;
    assert_eq!(app.store.read_count(), 1);

    app.client.get("/api/website").await;
    app.client.get("/api/website?forceRefresh=true").await;
    assert_eq!(app.store.read_count(), 3);
}

#[tokio::test]
async fn offline_store_is_service_unavailable() {
    let app = app();
    app.store.set_offline(true);

    let response = app.client.get("/api/courses").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json: Value = response.json();
    assert_error_body(&json, "Service Unavailable");
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .starts_with("failed to fetch courses")
    );
}

#[tokio::test]
async fn failed_read_is_not_cached() {
    let app = app();
    app.store.set_offline(true);
    app.client.get("/api/courses").await;

    app.store.set_offline(false);
    app.client
        .get("/api/courses")
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn malformed_website_document_is_internal_error() {
    let app = app_with(json!({"website": {"services": "broken", "hero": {"title": "Folio"}}}));

    let response = app.client.get("/api/website").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_error_body(&response.json(), "Internal Server Error");
    assert!(response.text().contains("website"));
}

#[tokio::test]
async fn undecodable_collection_is_internal_error() {
    let app = app_with(json!({"website": {"courses": [{"title": 5}]}}));

    let response = app.client.get("/api/courses").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
