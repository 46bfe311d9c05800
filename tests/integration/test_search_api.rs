use crate::common::TestApp;
use axum::http::StatusCode;
use pangolin::EmbeddingClient;
use pangolin::config::EmbeddingConfig;
use pangolin::vector::{EmbeddingBackend, EmbeddingError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Embeds each text as `[len, vowels]`.
struct CountingBackend;

impl EmbeddingBackend for CountingBackend {
    fn inference(&self, texts: &[String], _model: &str) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|text| {
                let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count();
                vec![text.len() as f32, vowels as f32]
            })
            .collect())
    }

    fn model_list(&self) -> Result<Vec<String>, EmbeddingError> {
        Ok(vec!["AllMiniLML6V2".to_string()])
    }
}

struct StalledBackend;

impl EmbeddingBackend for StalledBackend {
    fn inference(&self, _: &[String], _: &str) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(Vec::new())
    }

    fn model_list(&self) -> Result<Vec<String>, EmbeddingError> {
        Err(EmbeddingError::Inference("listing unavailable".to_string()))
    }
}

async fn with_abc_vectors() -> TestApp {
    let app = TestApp::new();
    app.create("/databases", "vectors").await;
    let (status, body) = app
        .post(
            "/collections/1/vectors",
            json!({ "vectors": [
                { "id": "A", "vector": [1.0, 0.0] },
                { "id": "B", "vector": [0.0, 1.0] },
                { "id": "C", "vector": [1.0, 1.0] },
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "inserted": 3, "total": 3 }));
    app
}

#[tokio::test]
async fn test_search_ranks_by_cosine() {
    let app = with_abc_vectors().await;

    let (status, body) = app
        .post("/collections/1/search", json!({ "vector": [1.0, 0.0], "topN": 2 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ids"], json!(["A", "C"]));
    assert_eq!(body["data"][0]["score"], 1.0);
    let c_score = body["data"][1]["score"].as_f64().unwrap();
    assert!((c_score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
}

#[tokio::test]
async fn test_search_with_euclidean_metric() {
    let app = with_abc_vectors().await;

    let (status, body) = app
        .post(
            "/collections/1/search",
            json!({ "vector": [0.0, 1.0], "topN": 3, "metric": "euclidean" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ids"], json!(["B", "C", "A"]));
    assert_eq!(body["data"][0]["score"], 0.0);
}

#[tokio::test]
async fn test_top_n_larger_than_store() {
    let app = with_abc_vectors().await;
    let (status, body) = app
        .post("/collections/1/search", json!({ "vector": [1.0, 0.0], "topN": 50 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ids"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_search_failures() {
    let app = with_abc_vectors().await;

    let (status, body) = app
        .post("/collections/1/search", json!({ "vector": [1.0, 0.0, 0.0] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DIMENSION_MISMATCH");

    let (status, body) = app
        .post("/collections/1/search", json!({ "vector": [0.0, 0.0] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ZERO_MAGNITUDE");

    let (status, body) = app
        .post("/collections/1/search", json!({ "vector": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DIMENSION_MISMATCH");

    let (status, _) = app
        .post("/collections/1/search", json!({ "vector": [1.0, 0.0], "metric": "manhattan" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .post("/collections/1/search", json!({ "vector": [1.0, 0.0], "topN": 5000 }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_search_empty_or_missing_database() {
    let app = TestApp::new();
    app.create("/databases", "empty").await;

    let (status, body) = app
        .post("/collections/1/search", json!({ "vector": [1.0] }))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app
        .post("/collections/9/search", json!({ "vector": [1.0] }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_overwrite_and_mixed_dimensions() {
    let app = with_abc_vectors().await;

    let (_, body) = app
        .post(
            "/collections/1/vectors",
            json!({ "vectors": [{ "id": "A", "vector": [0.0, 1.0] }] }),
        )
        .await;
    assert_eq!(body, json!({ "inserted": 1, "total": 3 }));

    let (_, body) = app
        .post("/collections/1/search", json!({ "vector": [0.0, 1.0], "topN": 2 }))
        .await;
    assert_eq!(body["ids"], json!(["A", "B"]));

    // Accepted at insert, fails the whole query later
    let (status, _) = app
        .post(
            "/collections/1/vectors",
            json!({ "vectors": [{ "id": "D", "vector": [1.0, 2.0, 3.0] }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post("/collections/1/search", json!({ "vector": [0.0, 1.0] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vectors_require_database() {
    let app = TestApp::new();
    let (status, _) = app
        .post(
            "/collections/3/vectors",
            json!({ "vectors": [{ "id": "A", "vector": [1.0] }] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_database_drops_vectors() {
    let app = with_abc_vectors().await;
    app.delete("/databases/1").await;
    assert_eq!(app.ctx.vectors().total_vectors(), 0);
}

#[tokio::test]
async fn test_embed_then_search() {
    let config = EmbeddingConfig::default();
    let app = TestApp::with_embeddings(EmbeddingClient::new(Arc::new(CountingBackend), &config));
    app.create("/databases", "texts").await;

    let (status, body) = app
        .post(
            "/collections/1/embed",
            json!({ "items": [
                { "id": "short", "text": "abc" },
                { "id": "long", "text": "xyzxyzxyzxyz" },
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, json!({ "inserted": 2, "total": 2 }));

    let (status, body) = app
        .post("/collections/1/search", json!({ "vector": [12.0, 0.0], "topN": 1 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ids"], json!(["long"]));

    let (status, body) = app.get("/models").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"], json!(["AllMiniLML6V2"]));
}

#[tokio::test]
async fn test_embedding_timeouts_and_failures() {
    let config = EmbeddingConfig::default();
    let client = EmbeddingClient::new(Arc::new(StalledBackend), &config)
        .with_timeouts(Duration::from_millis(50), Duration::from_millis(50));
    let app = TestApp::with_embeddings(client);
    app.create("/databases", "texts").await;

    let (status, body) = app
        .post(
            "/collections/1/embed",
            json!({ "items": [{ "id": "a", "text": "hello" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "UPSTREAM_TIMEOUT");

    let (status, body) = app.get("/models").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_embedding_disabled_is_bad_gateway() {
    let app = TestApp::new();
    app.create("/databases", "texts").await;
    let (status, _) = app
        .post(
            "/collections/1/embed",
            json!({ "items": [{ "id": "a", "text": "hello" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
