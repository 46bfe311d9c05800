/// The main library module for pangolin
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod pagination;
pub mod service;
pub mod storage;
pub mod vector;

// Explicit exports for better API clarity
pub use config::Settings;
pub use error::{FieldError, ServiceError, ServiceResult};
pub use pagination::{OrderDirection, Page, PageRequest, decode_cursor, encode_cursor, paginate};
pub use service::{AppContext, Location, SearchQuery, VectorInsert};
pub use storage::{
    MemoryRecordStore, NewRecord, Record, RecordId, RecordKind, RecordPatch, RecordStore,
};
pub use vector::{DistanceMetric, EmbeddingClient, SearchHit, VectorIndex};
