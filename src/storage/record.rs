//! Metadata record types.

use crate::error::{FieldError, ServiceError, ServiceResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Maximum length of a record name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// The three record tables exposed over REST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Database,
    Collection,
    Document,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Collection => "collection",
            Self::Document => "document",
        }
    }

    /// Kind of the record this kind is nested under.
    pub fn parent(self) -> Option<RecordKind> {
        match self {
            Self::Database => None,
            Self::Collection => Some(Self::Database),
            Self::Document => Some(Self::Collection),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => Ok(()),
        }
    }
}

/// Type-safe wrapper for record identifiers.
///
/// Identifiers start at 1, are assigned monotonically per kind and never
/// reused, so they double as the pagination cursor key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(NonZeroU64);

impl RecordId {
    /// Returns `None` if the provided ID is zero.
    #[must_use]
    pub fn new(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(Self)
    }

    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A database, collection or document row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub kind: RecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Body of a create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> ServiceResult<()> {
        let mut errors = Vec::new();
        check_name(&self.name, &mut errors);
        into_result(errors)
    }
}

/// Body of a partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RecordPatch {
    pub fn validate(&self) -> ServiceResult<()> {
        let mut errors = Vec::new();
        match &self.name {
            Some(name) => check_name(name, &mut errors),
            None if self.description.is_none() => {
                errors.push(FieldError::new("name", "required_without", "description"));
            }
            None => {}
        }
        into_result(errors)
    }
}

fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.trim().is_empty() {
        errors.push(FieldError::new("name", "required", ""));
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new("name", "max", name.chars().count().to_string()));
    }
}

fn into_result(errors: Vec<FieldError>) -> ServiceResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(errors))
    }
}

/// Base query for counting and windowing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordScope {
    pub kind: RecordKind,
    pub parent_id: Option<RecordId>,
    pub include_deleted: bool,
}

impl RecordScope {
    pub fn databases() -> Self {
        Self {
            kind: RecordKind::Database,
            parent_id: None,
            include_deleted: false,
        }
    }

    pub fn children(kind: RecordKind, parent_id: RecordId) -> Self {
        Self {
            kind,
            parent_id: Some(parent_id),
            include_deleted: false,
        }
    }

    pub fn including_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        record.kind == self.kind
            && record.parent_id == self.parent_id
            && (self.include_deleted || !record.is_deleted())
    }
}
