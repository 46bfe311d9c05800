//! Service errors mapped to HTTP responses.
//!
//! | Error | Status |
//! |---|---|
//! | `Validation`, `MalformedToken` | 422 |
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `EmptyResult`, `EmptyStore` | 204, no body |
//! | `DimensionMismatch`, `ZeroMagnitude`, `EmptyVector`, `NonFiniteScore` | 400 |
//! | `Upstream` | 502 |
//! | `UpstreamTimeout` | 504 |
//!
//! Error bodies are `{"error": message, "code": status_code}`, plus
//! `"details"` for validation failures.

use crate::error::{FieldError, ServiceError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Handler error type that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl ApiError {
    /// An extractor rejected the request before it reached a handler.
    pub fn rejected(source: &str, reason: impl Into<String>) -> Self {
        Self(ServiceError::Validation(vec![FieldError::new(
            source,
            "parse",
            reason,
        )]))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation(_) | ServiceError::MalformedToken { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Conflict { .. } => StatusCode::CONFLICT,
            ServiceError::EmptyResult | ServiceError::EmptyStore => StatusCode::NO_CONTENT,
            ServiceError::DimensionMismatch { .. }
            | ServiceError::ZeroMagnitude
            | ServiceError::EmptyVector
            | ServiceError::NonFiniteScore => StatusCode::BAD_REQUEST,
            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServiceError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }

        let code = self.0.status_code();
        let body = match self.0 {
            ServiceError::Validation(details) => json!({
                "error": "Validation failed",
                "code": code,
                "details": details,
            }),
            ServiceError::NotFound { kind, .. } => json!({
                "error": format!("{kind} not found"),
                "code": code,
            }),
            ServiceError::Upstream(reason) => {
                tracing::warn!("upstream failure: {reason}");
                json!({ "error": "Upstream service failed", "code": code })
            }
            other => json!({ "error": other.to_string(), "code": code }),
        };
        (status, Json(body)).into_response()
    }
}
