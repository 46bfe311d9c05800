//! Service context shared by every request path.
//!
//! [`AppContext`] owns the record store, the per-database vector indexes and
//! the optional embedding client. It is built once at startup and handed to
//! the HTTP layer behind an `Arc`.

use crate::config::Settings;
use crate::error::{FieldError, ServiceError, ServiceResult};
use crate::pagination::{Page, PageRequest, ScopedRecords, paginate};
use crate::storage::{
    MemoryRecordStore, NewRecord, Record, RecordId, RecordKind, RecordPatch, RecordScope,
    RecordStore,
};
use crate::vector::{DistanceMetric, EmbeddingClient, SearchResults, Vector, VectorRegistry};
use serde::Serialize;
use std::sync::Arc;

/// Position of a record table in the database → collection → document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Databases,
    Collections {
        database: RecordId,
    },
    Documents {
        database: RecordId,
        collection: RecordId,
    },
}

impl Location {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Databases => RecordKind::Database,
            Self::Collections { .. } => RecordKind::Collection,
            Self::Documents { .. } => RecordKind::Document,
        }
    }

    /// Id of the record directly above this table.
    pub fn parent_id(&self) -> Option<RecordId> {
        match self {
            Self::Databases => None,
            Self::Collections { database } => Some(*database),
            Self::Documents { collection, .. } => Some(*collection),
        }
    }

    fn scope(&self, include_deleted: bool) -> RecordScope {
        let scope = match self.parent_id() {
            None => RecordScope::databases(),
            Some(parent) => RecordScope::children(self.kind(), parent),
        };
        scope.including_deleted(include_deleted)
    }
}

/// Outcome of a vector write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VectorInsert {
    /// Vectors written by this call (overwrites included)
    pub inserted: usize,
    /// Vectors now held for the database
    pub total: usize,
}

/// Parameters of a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub vector: Vector,
    pub top_n: Option<usize>,
    pub metric: Option<DistanceMetric>,
}

impl SearchQuery {
    pub fn new(vector: Vector) -> Self {
        Self {
            vector,
            top_n: None,
            metric: None,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = Some(metric);
        self
    }
}

pub struct AppContext {
    store: Arc<dyn RecordStore>,
    vectors: VectorRegistry,
    embeddings: Option<EmbeddingClient>,
    settings: Arc<Settings>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &"<RecordStore>")
            .field("vectors", &self.vectors)
            .field("embeddings", &self.embeddings)
            .finish()
    }
}

impl AppContext {
    pub fn new(
        settings: Arc<Settings>,
        store: Arc<dyn RecordStore>,
        embeddings: Option<EmbeddingClient>,
    ) -> Self {
        Self {
            store,
            vectors: VectorRegistry::new(settings.search.metric),
            embeddings,
            settings,
        }
    }

    /// Context over an in-memory store, with the local embedding backend
    /// when `embedding.enabled` is set.
    pub fn from_settings(settings: Settings) -> Self {
        let embeddings = if settings.embedding.enabled {
            let client = EmbeddingClient::local(&settings.embedding);
            if client.is_none() {
                tracing::warn!("embedding.enabled is set but local embeddings are not compiled in");
            }
            client
        } else {
            None
        };
        Self::new(
            Arc::new(settings),
            Arc::new(MemoryRecordStore::new()),
            embeddings,
        )
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn vectors(&self) -> &VectorRegistry {
        &self.vectors
    }

    // Records

    pub fn list_records(
        &self,
        location: Location,
        request: &PageRequest,
        include_deleted: bool,
    ) -> ServiceResult<Page<Record>> {
        self.check_parents(location)?;
        let source = ScopedRecords::new(self.store.as_ref(), location.scope(include_deleted));
        paginate(&source, request)
    }

    pub fn get_record(&self, location: Location, id: RecordId) -> ServiceResult<Record> {
        self.check_parents(location)?;
        self.get_child(location, id)
    }

    pub fn create_record(&self, location: Location, new: NewRecord) -> ServiceResult<Record> {
        new.validate()?;
        self.check_parents(location)?;
        let record = self
            .store
            .insert(location.kind(), location.parent_id(), new)?;
        tracing::info!(kind = %record.kind, id = %record.id, "record created");
        Ok(record)
    }

    pub fn update_record(
        &self,
        location: Location,
        id: RecordId,
        patch: RecordPatch,
    ) -> ServiceResult<Record> {
        patch.validate()?;
        self.check_parents(location)?;
        self.get_child(location, id)?;
        Ok(self.store.update(location.kind(), id, patch)?)
    }

    /// Soft-deletes a record. Deleting a database also drops its vectors.
    pub fn delete_record(&self, location: Location, id: RecordId) -> ServiceResult<Record> {
        self.check_parents(location)?;
        self.get_child(location, id)?;
        let record = self.store.soft_delete(location.kind(), id)?;
        if record.kind == RecordKind::Database && self.vectors.remove(id.get()).is_some() {
            tracing::debug!(database = %id, "dropped vector index");
        }
        tracing::info!(kind = %record.kind, id = %record.id, "record deleted");
        Ok(record)
    }

    /// Checks every ancestor of `location` is live and correctly nested.
    fn check_parents(&self, location: Location) -> ServiceResult<()> {
        match location {
            Location::Databases => Ok(()),
            Location::Collections { database } => {
                self.store.get(RecordKind::Database, database)?;
                Ok(())
            }
            Location::Documents {
                database,
                collection,
            } => {
                self.store.get(RecordKind::Database, database)?;
                let parent = self.store.get(RecordKind::Collection, collection)?;
                if parent.parent_id != Some(database) {
                    return Err(ServiceError::NotFound {
                        kind: RecordKind::Collection,
                        id: collection.get(),
                    });
                }
                Ok(())
            }
        }
    }

    fn get_child(&self, location: Location, id: RecordId) -> ServiceResult<Record> {
        let record = self.store.get(location.kind(), id)?;
        if record.parent_id != location.parent_id() {
            return Err(ServiceError::NotFound {
                kind: location.kind(),
                id: id.get(),
            });
        }
        Ok(record)
    }

    // Vectors

    /// Inserts or overwrites vectors in a database's index.
    pub fn add_vectors(
        &self,
        database: RecordId,
        entries: Vec<(String, Vector)>,
    ) -> ServiceResult<VectorInsert> {
        validate_entries(&entries)?;
        self.store.get(RecordKind::Database, database)?;

        let index = self.vectors.get_or_create(database.get());
        let inserted = index.add_vectors(entries);
        // A delete racing this write may have dropped the index before it
        // was recreated above
        if let Err(err) = self.store.get(RecordKind::Database, database) {
            self.vectors.remove(database.get());
            return Err(err.into());
        }
        let total = index.len();
        tracing::debug!(database = %database, inserted, total, "vectors added");
        Ok(VectorInsert { inserted, total })
    }

    /// Embeds `(id, text)` pairs and stores the resulting vectors.
    pub async fn embed_and_add(
        &self,
        database: RecordId,
        model: Option<&str>,
        items: Vec<(String, String)>,
    ) -> ServiceResult<VectorInsert> {
        let client = self.embedding_client()?;
        if let Some(model) = model {
            if !self.settings.embedding.models.iter().any(|m| m == model) {
                return Err(ServiceError::invalid("model", "oneof", model));
            }
        }
        if let Some(position) = items.iter().position(|(id, _)| id.is_empty()) {
            return Err(ServiceError::invalid(format!("items[{position}].id"), "required", ""));
        }
        self.store.get(RecordKind::Database, database)?;

        let (ids, texts): (Vec<String>, Vec<String>) = items.into_iter().unzip();
        let embeddings = client.inference(texts, model).await?;
        self.add_vectors(database, ids.into_iter().zip(embeddings).collect())
    }

    /// Ranks a database's vectors against `query`.
    ///
    /// # Errors
    /// - `NotFound` when the database does not exist
    /// - `EmptyStore` when no vector was ever stored for it
    /// - `Validation` for an out-of-range `top_n` or a non-finite query
    /// - metric errors for incomparable vectors
    pub fn search(&self, database: RecordId, query: &SearchQuery) -> ServiceResult<SearchResults> {
        let top_n = query.top_n.unwrap_or(self.settings.search.default_top_n);
        if top_n > self.settings.search.max_top_n {
            return Err(ServiceError::invalid("topN", "max", top_n.to_string()));
        }
        if let Some(field) = non_finite(&query.vector, "vector") {
            return Err(ServiceError::Validation(vec![field]));
        }
        self.store.get(RecordKind::Database, database)?;

        let index = self
            .vectors
            .get(database.get())
            .ok_or(ServiceError::EmptyStore)?;
        let metric = query.metric.unwrap_or_else(|| index.metric());
        let results = index.search_with_metric(&query.vector, top_n, metric)?;
        tracing::debug!(database = %database, %metric, top_n, hits = results.len(), "search");
        Ok(results)
    }

    /// Names of the embedding models the backend can serve.
    pub async fn models(&self) -> ServiceResult<Vec<String>> {
        self.embedding_client()?.model_list().await
    }

    fn embedding_client(&self) -> ServiceResult<&EmbeddingClient> {
        self.embeddings
            .as_ref()
            .ok_or_else(|| ServiceError::Upstream("embedding backend is not enabled".to_string()))
    }
}

fn validate_entries(entries: &[(String, Vector)]) -> ServiceResult<()> {
    let errors: Vec<FieldError> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, (id, vector))| {
            if id.is_empty() {
                Some(FieldError::new(format!("vectors[{i}].id"), "required", ""))
            } else {
                non_finite(vector, &format!("vectors[{i}].vector"))
            }
        })
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

fn non_finite(vector: &[f64], field: &str) -> Option<FieldError> {
    vector
        .iter()
        .position(|x| !x.is_finite())
        .map(|i| FieldError::new(format!("{field}[{i}]"), "finite", vector[i].to_string()))
}
