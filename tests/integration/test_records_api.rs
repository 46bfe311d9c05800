use crate::common::TestApp;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_database_lifecycle() {
    let app = TestApp::new();

    let (status, created) = app
        .post("/databases", json!({ "name": "main", "description": "primary" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["kind"], "database");
    assert_eq!(created["description"], "primary");
    assert!(created["deletedAt"].is_null());

    let (status, fetched) = app.get("/databases/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "main");

    let (status, updated) = app
        .patch("/databases/1", json!({ "name": "renamed" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "renamed");
    assert_eq!(updated["description"], "primary");

    let (status, deleted) = app.delete("/databases/1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(deleted["deletedAt"].is_string());

    let (status, body) = app.get("/databases/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = app.delete("/databases/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ids_are_never_reused() {
    let app = TestApp::new();
    app.create("/databases", "a").await;
    app.delete("/databases/1").await;
    assert_eq!(app.create("/databases", "a").await, 2);
}

#[tokio::test]
async fn test_duplicate_name_conflicts() {
    let app = TestApp::new();
    app.create("/databases", "main").await;

    let (status, body) = app.post("/databases", json!({ "name": "main" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    app.create("/databases", "other").await;
    let (status, _) = app.patch("/databases/2", json!({ "name": "main" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_validation() {
    let app = TestApp::new();

    let (status, body) = app.post("/databases", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["field"], "name");
    assert_eq!(body["details"][0]["tag"], "required");

    let (status, _) = app.post("/databases", json!({ "name": 42 })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.post("/databases", json!({ "name": "x".repeat(256) })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_patch_validation_and_missing() {
    let app = TestApp::new();
    app.create("/databases", "main").await;

    let (status, _) = app.patch("/databases/1", json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.patch("/databases/7", json!({ "name": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_path_id_is_validation_error() {
    let app = TestApp::new();
    for uri in ["/databases/abc", "/databases/0"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_collections_and_documents() {
    let app = TestApp::new();
    app.create("/databases", "db1").await;
    app.create("/databases", "db2").await;

    let collection = app.create("/collections/1", "col").await;
    // Same name under another database is fine
    app.create("/collections/2", "col").await;

    let (status, body) = app.get(&format!("/collections/1/{collection}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parentId"], 1);
    assert_eq!(body["kind"], "collection");

    // Wrong parent
    let (status, _) = app.get(&format!("/collections/2/{collection}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let documents = format!("/databases/1/collections/{collection}/documents");
    let doc = app.create(&documents, "readme").await;

    let (status, body) = app.get(&format!("{documents}/{doc}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "document");
    assert_eq!(body["parentId"], collection);

    let (status, _) = app
        .patch(&format!("{documents}/{doc}"), json!({ "description": "docs" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Collection exists but belongs to another database
    let (status, _) = app
        .get(&format!("/databases/2/collections/{collection}/documents/{doc}"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("{documents}/{doc}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("{documents}/{doc}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_children_of_missing_parent() {
    let app = TestApp::new();
    let (status, body) = app.post("/collections/5", json!({ "name": "c" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Database not found");

    let (status, _) = app
        .post("/databases/5/collections/1/documents", json!({ "name": "d" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
