use crate::error::ServiceError;
use crate::storage::RecordKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: u64 },

    #[error("{kind} named '{name}' already exists")]
    Conflict { kind: RecordKind, name: String },

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => ServiceError::NotFound { kind, id },
            StoreError::Conflict { kind, name } => ServiceError::Conflict { kind, name },
            StoreError::Unavailable(reason) => ServiceError::Upstream(reason),
        }
    }
}
