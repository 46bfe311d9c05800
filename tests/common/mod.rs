#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use pangolin::http::create_router;
use pangolin::{AppContext, EmbeddingClient, MemoryRecordStore, Settings};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// In-process API over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub ctx: Arc<AppContext>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_context(AppContext::from_settings(Settings::default()))
    }

    pub fn with_embeddings(client: EmbeddingClient) -> Self {
        Self::with_context(AppContext::new(
            Arc::new(Settings::default()),
            Arc::new(MemoryRecordStore::new()),
            Some(client),
        ))
    }

    fn with_context(ctx: AppContext) -> Self {
        let ctx = Arc::new(ctx);
        Self {
            router: create_router(Arc::clone(&ctx)),
            ctx,
        }
    }

    /// Sends one request; the body is `Value::Null` when empty.
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Creates a record through the API and returns its id.
    pub async fn create(&self, uri: &str, name: &str) -> u64 {
        let (status, body) = self
            .post(uri, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create {name}: {body}");
        body["id"].as_u64().unwrap()
    }
}

/// `path?query` with the pairs url-encoded.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    let query = serde_urlencoded::to_string(params).unwrap();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

pub fn names(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["name"].as_str().unwrap().to_string())
        .collect()
}
