use crate::error::{ServiceError, ServiceResult};
use crate::pagination::cursor::decode_cursor;
use crate::storage::RecordId;
use serde::{Deserialize, Serialize};

/// Smallest accepted page size.
pub const MIN_PAGE_SIZE: i64 = 5;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort direction over record identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Ascending,
    #[default]
    Descending,
}

impl OrderDirection {
    pub fn from_desc_flag(order_desc: Option<bool>) -> Self {
        match order_desc {
            Some(false) => Self::Ascending,
            _ => Self::Descending,
        }
    }
}

/// A validated pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_size: usize,
    cursor: Option<RecordId>,
    direction: OrderDirection,
}

impl PageRequest {
    /// Validates raw request parameters.
    ///
    /// An empty token is treated as absent. `pageSize` is checked before the
    /// token is decoded.
    ///
    /// # Errors
    /// - `Validation` when `page_size` is missing or outside `[5, 100]`
    /// - `MalformedToken` when the token does not decode
    pub fn from_params(
        page_size: Option<i64>,
        continuation_token: Option<&str>,
        order_desc: Option<bool>,
    ) -> ServiceResult<Self> {
        let page_size = match page_size {
            None => return Err(ServiceError::invalid("pageSize", "required", "")),
            Some(size) if size < MIN_PAGE_SIZE => {
                return Err(ServiceError::invalid("pageSize", "min", size.to_string()));
            }
            Some(size) if size > MAX_PAGE_SIZE => {
                return Err(ServiceError::invalid("pageSize", "max", size.to_string()));
            }
            Some(size) => size as usize,
        };

        let cursor = match continuation_token {
            Some(token) if !token.is_empty() => Some(decode_cursor(token)?),
            _ => None,
        };

        Ok(Self {
            page_size,
            cursor,
            direction: OrderDirection::from_desc_flag(order_desc),
        })
    }

    /// First page in the default (descending) order.
    pub fn first(page_size: i64) -> ServiceResult<Self> {
        Self::from_params(Some(page_size), None, None)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn cursor(&self) -> Option<RecordId> {
        self.cursor
    }

    pub fn direction(&self) -> OrderDirection {
        self.direction
    }
}

/// One window of an ordered record sequence.
///
/// An empty `continuation_token` marks the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub continuation_token: String,
    pub total_records: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.continuation_token.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            continuation_token: self.continuation_token,
            total_records: self.total_records,
            total_pages: self.total_pages,
        }
    }
}
