//! Tests de los endpoints de administracion.

mod helpers;

use axum::http::StatusCode;
use helpers::{app, app_with, assert_error_body, field_values};
use serde_json::{Value, json};

fn new_course() -> Value {
    json!({
        "title": "Async Rust",
        "description": "Tokio in depth",
        "category": "Programming",
        "provider": "Folio Academy",
        "duration": "6 weeks"
    })
}

fn contact_form() -> Value {
    json!({
        "name": "Ana",
        "email": "ana@example.com",
        "subject": "Hello",
        "message": "Quote please"
    })
}

// ============================================
// Autorizacion
// ============================================

#[tokio::test]
async fn anonymous_caller_is_unauthorized() {
    let app = app();

    let response = app.client.post("/api/admin/courses", new_course()).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_error_body(&response.json(), "Unauthorized");
    assert_eq!(app.store.operation_counts().writes, 0);
}

#[tokio::test]
async fn caller_named_anonymous_is_forbidden_not_unauthorized() {
    let app = app();

    let response = app
        .client
        .as_caller("anonymous")
        .post("/api/admin/courses", new_course())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_error_body(&response.json(), "Forbidden");
}

#[tokio::test]
async fn non_admin_caller_is_forbidden() {
    let app = app();

    let response = app.guest().post("/api/admin/courses", new_course()).await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_error_body(&response.json(), "Forbidden");

    app.guest()
        .get("/api/admin/inquiries")
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.guest()
        .put("/api/admin/website/hero", json!({"title": "Hacked"}))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    assert_eq!(app.store.operation_counts().writes, 0);
}

#[tokio::test]
async fn admin_email_matches_case_insensitively() {
    let app = app();

    app.client
        .as_caller("ADMIN@Studio.dev")
        .get("/api/admin/courses")
        .await
        .assert_status(StatusCode::OK);
}

// ============================================
// Colecciones
// ============================================

#[tokio::test]
async fn admin_list_includes_drafts() {
    let app = app();

    let json: Value = app.admin().get("/api/admin/courses").await.json();
    assert_eq!(field_values(&json, "id"), vec!["c2", "c1", "c3"]);
}

#[tokio::test]
async fn create_course_assigns_id_order_and_stamps() {
    let app = app();

    let response = app.admin().post("/api/admin/courses", new_course()).await;
    response.assert_status(StatusCode::CREATED);

    let created: Value = response.json();
    assert!(!created["id"].as_str().unwrap().is_empty());
    assert_eq!(created["order"], 4);
    assert!(created["createdAt"].as_i64().unwrap() > 0);
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let public: Value = app.client.get("/api/courses").await.json();
    assert_eq!(
        field_values(&public, "title"),
        vec!["Figma Pro", "Rust Basics", "Async Rust"]
    );
}

#[tokio::test]
async fn create_with_missing_field_is_bad_request() {
    let app = app();

    let mut course = new_course();
    course.as_object_mut().unwrap().remove("duration");

    let response = app.admin().post("/api/admin/courses", course).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let json: Value = response.json();
    assert!(json["message"].as_str().unwrap().contains("duration"));
    assert_eq!(app.store.operation_counts().writes, 0);
}

#[tokio::test]
async fn create_with_duplicate_id_is_rejected() {
    let app = app();

    let mut course = new_course();
    course["id"] = json!("c1");

    app.admin()
        .post("/api/admin/courses", course)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_is_visible_on_the_next_public_read() {
    let app = app();

    // Cachea la lista publica
    app.client.get("/api/courses").await;

    let response = app
        .admin()
        .put("/api/admin/courses/c1", json!({"title": "Rust Fundamentals", "id": "other"}))
        .await;
    response.assert_status(StatusCode::OK);

    let updated: Value = response.json();
    assert_eq!(updated["id"], "c1");
    assert_eq!(updated["title"], "Rust Fundamentals");
    assert_eq!(updated["provider"], "Folio Academy");
    assert!(updated["updatedAt"].as_i64().unwrap() > 0);

    let public: Value = app.client.get("/api/courses").await.json();
    assert_eq!(
        field_values(&public, "title"),
        vec!["Figma Pro", "Rust Fundamentals"]
    );
}

#[tokio::test]
async fn update_unknown_record_is_not_found() {
    let app = app();

    let response = app
        .admin()
        .put("/api/admin/courses/zzz", json!({"title": "Nope"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_that_breaks_validation_is_rejected() {
    let app = app();

    app.admin()
        .put("/api/admin/projects/p1", json!({"url": "ftp://cafe.example"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_record() {
    let app = app();

    app.admin()
        .delete("/api/admin/projects/p2")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let public: Value = app.client.get("/api/projects").await.json();
    assert_eq!(field_values(&public, "id"), vec!["p1"]);

    app.admin()
        .delete("/api/admin/projects/p2")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn move_record_renumbers_collection() {
    let app = app();

    let response = app
        .admin()
        .put("/api/admin/courses/c3/position", json!({"position": 1}))
        .await;
    response.assert_status(StatusCode::OK);

    let json: Value = response.json();
    assert_eq!(field_values(&json, "id"), vec!["c3", "c2", "c1"]);
    let orders: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[tokio::test]
async fn order_statistics_of_collection() {
    let app = app();

    let json: Value = app.admin().get("/api/admin/courses/order").await.json();
    assert_eq!(json["total"], 3);
    assert_eq!(json["minOrder"], 1);
    assert_eq!(json["maxOrder"], 3);
    assert_eq!(json["hasGaps"], false);
    assert_eq!(json["duplicates"], json!([]));
}

#[tokio::test]
async fn unknown_collection_is_not_found() {
    let app = app();

    app.admin()
        .get("/api/admin/blog")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.admin()
        .post("/api/admin/hero", json!({}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============================================
// Secciones del sitio
// ============================================

#[tokio::test]
async fn update_section_replaces_value() {
    let app = app();

    app.client.get("/api/website").await;
    app.admin()
        .put("/api/admin/website/hero", json!({"title": "Folio Studio"}))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let json: Value = app.client.get("/api/website").await.json();
    assert_eq!(json["hero"]["title"], "Folio Studio");
    assert_eq!(json["hero"]["cta"], Value::Null);
}

#[tokio::test]
async fn update_section_checks_shape() {
    let app = app();

    app.admin()
        .put("/api/admin/website/hero", json!(["not", "an", "object"]))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.admin()
        .put("/api/admin/website/courses", json!({"not": "a list"}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.admin()
        .put("/api/admin/website/blog", json!({}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn initialize_website_only_once() {
    let app = app_with(Value::Null);
    let document = json!({"hero": {"title": "Folio"}, "courses": []});

    let json: Value = app
        .admin()
        .post("/api/admin/website/initialize", document.clone())
        .await
        .json();
    assert_eq!(json["initialized"], true);
    assert_eq!(app.store.dump()["website"]["hero"]["title"], "Folio");

    let json: Value = app
        .admin()
        .post("/api/admin/website/initialize", document)
        .await
        .json();
    assert_eq!(json["initialized"], false);
}

// ============================================
// Bandeja de entrada
// ============================================

#[tokio::test]
async fn inbox_merges_contacts_and_inquiries() {
    let app = app();

    app.client.post("/api/contact", contact_form()).await;
    app.client
        .post("/api/inquiries", json!({"package": {"name": "Starter"}}))
        .await;

    let json: Value = app.admin().get("/api/admin/inquiries").await.json();
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 2);

    let mut kinds: Vec<&str> = items.iter().map(|i| i["type"].as_str().unwrap()).collect();
    kinds.sort_unstable();
    assert_eq!(kinds, vec!["contact", "package_inquiry"]);
    assert!(items.iter().all(|i| i["priority"] == "high"));
}

#[tokio::test]
async fn empty_inbox() {
    let app = app();

    let json: Value = app.admin().get("/api/admin/inquiries").await.json();
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn status_update_is_reflected_in_stats() {
    let app = app();

    let created: Value = app.client.post("/api/contact", contact_form()).await.json();
    let id = created["id"].as_str().unwrap();

    let stats: Value = app.admin().get("/api/admin/contacts/stats").await.json();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["new"], 1);

    app.admin()
        .put(
            &format!("/api/admin/inquiries/contact/{id}/status"),
            json!({"status": "read"}),
        )
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stats: Value = app.admin().get("/api/admin/contacts/stats").await.json();
    assert_eq!(stats["new"], 0);
    assert_eq!(stats["read"], 1);
    assert_eq!(app.store.dump()["contacts"][id]["status"], "read");
}

#[tokio::test]
async fn status_update_errors() {
    let app = app();

    app.admin()
        .put(
            "/api/admin/inquiries/contact/missing/status",
            json!({"status": "read"}),
        )
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.admin()
        .put(
            "/api/admin/inquiries/letters/x/status",
            json!({"status": "read"}),
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
