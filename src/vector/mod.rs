//! Vector similarity search.
//!
//! This module stores embedding vectors in memory and ranks them against a
//! query vector under a configurable distance metric.
//!
//! # Architecture
//! - `metric`: pure cosine / Euclidean scoring
//! - `index`: identifier → vector map with exact top-N search
//! - `registry`: one index per database, owned by the service context
//! - `embedding`: timeout-bounded inference client feeding the indexes

mod embedding;
mod index;
mod metric;
mod registry;
mod types;

#[cfg(test)]
pub use embedding::MockEmbeddingBackend;
pub use embedding::{EmbeddingBackend, EmbeddingClient, EmbeddingError};
#[cfg(feature = "local-embeddings")]
pub use embedding::{FastEmbedBackend, parse_embedding_model};
pub use index::{SearchResults, VectorIndex};
pub use metric::{DistanceMetric, cosine_similarity, euclidean_distance};
pub use registry::VectorRegistry;
pub use types::{SearchHit, Vector, VectorError};
