//! Request and response bodies.

use crate::vector::{DistanceMetric, SearchHit, Vector};
use serde::{Deserialize, Serialize};

/// Query string of every list endpoint.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page_size: Option<i64>,
    pub continuation_token: Option<String>,
    pub order_desc: Option<bool>,
    pub include_deleted: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VectorEntry {
    pub id: String,
    pub vector: Vector,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AddVectorsRequest {
    pub vectors: Vec<VectorEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmbedItem {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub items: Vec<EmbedItem>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub vector: Vector,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub metric: Option<DistanceMetric>,
}

/// Ranked hits, closest first. `ids` repeats the hit order without scores.
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchResponse {
    pub data: Vec<SearchHit>,
    pub ids: Vec<String>,
}

impl FromIterator<SearchHit> for SearchResponse {
    fn from_iter<I: IntoIterator<Item = SearchHit>>(hits: I) -> Self {
        let data: Vec<SearchHit> = hits.into_iter().collect();
        let ids = data.iter().map(|hit| hit.id.clone()).collect();
        Self { data, ids }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}
