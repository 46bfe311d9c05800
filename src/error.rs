//! Error types for the pangolin service
//!
//! This module provides the service-wide error taxonomy using thiserror.
//! Subsystem errors (vector math, cursor decoding, record storage, embedding
//! inference) convert into [`ServiceError`] so every operation surfaces a
//! single outcome type to the HTTP boundary.

use crate::storage::RecordKind;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// A single field-level validation failure.
///
/// Mirrors the `(field, failing rule, offending value)` triple returned to
/// clients so they can correct individual inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub tag: String,
    pub value: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            tag: tag.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.value.is_empty() {
            write!(f, "{} failed '{}'", self.field, self.tag)
        } else {
            write!(f, "{} failed '{}' ({})", self.field, self.tag, self.value)
        }
    }
}

/// Main error type for service operations
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed or out-of-range input
    #[error("Validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Continuation token is malformed: {reason}")]
    MalformedToken { reason: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: u64 },

    #[error("{kind} named '{name}' already exists")]
    Conflict { kind: RecordKind, name: String },

    /// No records matched the base query
    #[error("No records match the query")]
    EmptyResult,

    /// The vector index holds no vectors
    #[error("Vector store is empty")]
    EmptyStore,

    /// Vector precondition errors
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot compute cosine similarity with a zero magnitude vector")]
    ZeroMagnitude,

    #[error("Vectors must have at least one dimension")]
    EmptyVector,

    #[error("Score is not a finite number")]
    NonFiniteScore,

    /// Collaborator failures
    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Upstream {operation} timed out after {}s", .timeout.as_secs())]
    UpstreamTimeout {
        operation: &'static str,
        timeout: Duration,
    },
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ServiceError {
    /// Shorthand for a validation error on a single field.
    pub fn invalid(field: impl Into<String>, tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, tag, value)])
    }

    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::MalformedToken { .. } => "MALFORMED_TOKEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::EmptyResult => "EMPTY_RESULT",
            Self::EmptyStore => "EMPTY_STORE",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::ZeroMagnitude => "ZERO_MAGNITUDE",
            Self::EmptyVector => "EMPTY_VECTOR",
            Self::NonFiniteScore => "NON_FINITE_SCORE",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::UpstreamTimeout { .. } => "UPSTREAM_TIMEOUT",
        }
    }

    /// True for errors caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Upstream(_) | Self::UpstreamTimeout { .. } | Self::EmptyResult | Self::EmptyStore
        )
    }

    /// True for the "nothing to operate on" outcomes surfaced as no content.
    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::EmptyResult | Self::EmptyStore)
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
