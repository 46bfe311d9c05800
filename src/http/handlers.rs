//! HTTP request handlers.
//!
//! Handlers translate requests into [`AppContext`] calls and nothing more;
//! validation and parent checks live in the service.

use crate::http::errors::ApiError;
use crate::http::extract::{ValidJson, ValidPath, ValidQuery};
use crate::http::models::{
    AddVectorsRequest, EmbedRequest, ListParams, ModelsResponse, SearchRequest, SearchResponse,
};
use crate::pagination::{Page, PageRequest};
use crate::service::{AppContext, Location, SearchQuery, VectorInsert};
use crate::storage::{NewRecord, Record, RecordId, RecordPatch};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;

pub type AppState = Arc<AppContext>;

type ApiResult<T> = Result<T, ApiError>;

/// `GET /health`
pub async fn health() -> &'static str {
    "OK"
}

fn list(ctx: &AppContext, location: Location, params: ListParams) -> ApiResult<Json<Page<Record>>> {
    let request = PageRequest::from_params(
        params.page_size,
        params.continuation_token.as_deref(),
        params.order_desc,
    )?;
    let page = ctx.list_records(location, &request, params.include_deleted.unwrap_or(false))?;
    Ok(Json(page))
}

fn create(
    ctx: &AppContext,
    location: Location,
    body: NewRecord,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let record = ctx.create_record(location, body)?;
    Ok((StatusCode::CREATED, Json(record)))
}

// Databases

/// `GET /databases`
pub async fn list_databases(
    State(ctx): State<AppState>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> ApiResult<Json<Page<Record>>> {
    list(&ctx, Location::Databases, params)
}

/// `POST /databases`
pub async fn create_database(
    State(ctx): State<AppState>,
    ValidJson(body): ValidJson<NewRecord>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    create(&ctx, Location::Databases, body)
}

/// `GET /databases/{id}`
pub async fn get_database(
    State(ctx): State<AppState>,
    ValidPath(id): ValidPath<RecordId>,
) -> ApiResult<Json<Record>> {
    Ok(Json(ctx.get_record(Location::Databases, id)?))
}

/// `PATCH /databases/{id}`
pub async fn update_database(
    State(ctx): State<AppState>,
    ValidPath(id): ValidPath<RecordId>,
    ValidJson(patch): ValidJson<RecordPatch>,
) -> ApiResult<Json<Record>> {
    Ok(Json(ctx.update_record(Location::Databases, id, patch)?))
}

/// `DELETE /databases/{id}`
pub async fn delete_database(
    State(ctx): State<AppState>,
    ValidPath(id): ValidPath<RecordId>,
) -> ApiResult<Json<Record>> {
    Ok(Json(ctx.delete_record(Location::Databases, id)?))
}

// Collections

/// `GET /collections/{dbId}`
pub async fn list_collections(
    State(ctx): State<AppState>,
    ValidPath(database): ValidPath<RecordId>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> ApiResult<Json<Page<Record>>> {
    list(&ctx, Location::Collections { database }, params)
}

/// `POST /collections/{dbId}`
pub async fn create_collection(
    State(ctx): State<AppState>,
    ValidPath(database): ValidPath<RecordId>,
    ValidJson(body): ValidJson<NewRecord>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    create(&ctx, Location::Collections { database }, body)
}

/// `GET /collections/{dbId}/{collectionId}`
pub async fn get_collection(
    State(ctx): State<AppState>,
    ValidPath((database, id)): ValidPath<(RecordId, RecordId)>,
) -> ApiResult<Json<Record>> {
    Ok(Json(ctx.get_record(Location::Collections { database }, id)?))
}

/// `PATCH /collections/{dbId}/{collectionId}`
pub async fn update_collection(
    State(ctx): State<AppState>,
    ValidPath((database, id)): ValidPath<(RecordId, RecordId)>,
    ValidJson(patch): ValidJson<RecordPatch>,
) -> ApiResult<Json<Record>> {
    Ok(Json(ctx.update_record(
        Location::Collections { database },
        id,
        patch,
    )?))
}

/// `DELETE /collections/{dbId}/{collectionId}`
pub async fn delete_collection(
    State(ctx): State<AppState>,
    ValidPath((database, id)): ValidPath<(RecordId, RecordId)>,
) -> ApiResult<Json<Record>> {
    Ok(Json(ctx.delete_record(Location::Collections { database }, id)?))
}

// Documents

/// `GET /databases/{dbId}/collections/{colId}/documents`
pub async fn list_documents(
    State(ctx): State<AppState>,
    ValidPath((database, collection)): ValidPath<(RecordId, RecordId)>,
    ValidQuery(params): ValidQuery<ListParams>,
) -> ApiResult<Json<Page<Record>>> {
    let location = Location::Documents {
        database,
        collection,
    };
    list(&ctx, location, params)
}

/// `POST /databases/{dbId}/collections/{colId}/documents`
pub async fn create_document(
    State(ctx): State<AppState>,
    ValidPath((database, collection)): ValidPath<(RecordId, RecordId)>,
    ValidJson(body): ValidJson<NewRecord>,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let location = Location::Documents {
        database,
        collection,
    };
    create(&ctx, location, body)
}

/// `GET /databases/{dbId}/collections/{colId}/documents/{id}`
pub async fn get_document(
    State(ctx): State<AppState>,
    ValidPath((database, collection, id)): ValidPath<(RecordId, RecordId, RecordId)>,
) -> ApiResult<Json<Record>> {
    let location = Location::Documents {
        database,
        collection,
    };
    Ok(Json(ctx.get_record(location, id)?))
}

/// `PATCH /databases/{dbId}/collections/{colId}/documents/{id}`
pub async fn update_document(
    State(ctx): State<AppState>,
    ValidPath((database, collection, id)): ValidPath<(RecordId, RecordId, RecordId)>,
    ValidJson(patch): ValidJson<RecordPatch>,
) -> ApiResult<Json<Record>> {
    let location = Location::Documents {
        database,
        collection,
    };
    Ok(Json(ctx.update_record(location, id, patch)?))
}

/// `DELETE /databases/{dbId}/collections/{colId}/documents/{id}`
pub async fn delete_document(
    State(ctx): State<AppState>,
    ValidPath((database, collection, id)): ValidPath<(RecordId, RecordId, RecordId)>,
) -> ApiResult<Json<Record>> {
    let location = Location::Documents {
        database,
        collection,
    };
    Ok(Json(ctx.delete_record(location, id)?))
}

// Vectors

/// `POST /collections/{dbId}/vectors`
pub async fn add_vectors(
    State(ctx): State<AppState>,
    ValidPath(database): ValidPath<RecordId>,
    ValidJson(body): ValidJson<AddVectorsRequest>,
) -> ApiResult<Json<VectorInsert>> {
    let entries = body
        .vectors
        .into_iter()
        .map(|entry| (entry.id, entry.vector))
        .collect();
    Ok(Json(ctx.add_vectors(database, entries)?))
}

/// `POST /collections/{dbId}/embed`
pub async fn embed(
    State(ctx): State<AppState>,
    ValidPath(database): ValidPath<RecordId>,
    ValidJson(body): ValidJson<EmbedRequest>,
) -> ApiResult<Json<VectorInsert>> {
    let items = body
        .items
        .into_iter()
        .map(|item| (item.id, item.text))
        .collect();
    let result = ctx
        .embed_and_add(database, body.model.as_deref(), items)
        .await?;
    Ok(Json(result))
}

/// `POST /collections/{dbId}/search`
pub async fn search(
    State(ctx): State<AppState>,
    ValidPath(database): ValidPath<RecordId>,
    ValidJson(body): ValidJson<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    let query = SearchQuery {
        vector: body.vector,
        top_n: body.top_n,
        metric: body.metric,
    };
    let results = ctx.search(database, &query)?;
    Ok(Json(results.collect()))
}

/// `GET /models`
pub async fn models(State(ctx): State<AppState>) -> ApiResult<Json<ModelsResponse>> {
    let models = ctx.models().await?;
    Ok(Json(ModelsResponse { models }))
}
