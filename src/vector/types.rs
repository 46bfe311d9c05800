//! Core types for vector search.
//!
//! Vectors are plain `f64` sequences; their dimension is the sequence length
//! and two vectors are only comparable when dimensions match.

use crate::error::ServiceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An embedding vector.
pub type Vector = Vec<f64>;

/// One ranked entry produced by a search.
///
/// `score` is the raw value of the metric that ranked it: a similarity in
/// `[-1, 1]` for cosine, a distance `>= 0` for Euclidean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
}

/// Errors that can occur during vector operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VectorError {
    #[error(
        "Vector dimension mismatch: expected {expected}, got {actual}\nSuggestion: Ensure all vectors use the same embedding model"
    )]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vectors must have at least one dimension")]
    EmptyVector,

    #[error(
        "Cannot compute cosine similarity with a zero magnitude vector\nSuggestion: Use the euclidean metric or drop all-zero vectors"
    )]
    ZeroMagnitude,

    #[error(
        "Score is not a finite number\nSuggestion: Check vectors for NaN, infinities or extreme magnitudes"
    )]
    NonFiniteScore,

    #[error("Vector store is empty\nSuggestion: Add vectors before searching")]
    EmptyStore,
}

impl From<VectorError> for ServiceError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::DimensionMismatch { expected, actual } => {
                ServiceError::DimensionMismatch { expected, actual }
            }
            VectorError::EmptyVector => ServiceError::EmptyVector,
            VectorError::ZeroMagnitude => ServiceError::ZeroMagnitude,
            VectorError::NonFiniteScore => ServiceError::NonFiniteScore,
            VectorError::EmptyStore => ServiceError::EmptyStore,
        }
    }
}
