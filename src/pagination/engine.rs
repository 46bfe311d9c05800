//! Keyset pagination over an id-ordered record sequence.
//!
//! Each page is fetched as `page_size + 1` rows from an inclusive cursor.
//! The extra row, when present, is trimmed and its id becomes the next
//! continuation token, so the following request starts exactly on it.
//!
//! The count query and the window query are independent reads. Under
//! concurrent writes the totals may lag the page contents, and rows inserted
//! or deleted at a page boundary may be skipped or repeated; no snapshot
//! spans a walk.

use crate::error::{ServiceError, ServiceResult};
use crate::pagination::cursor::encode_cursor;
use crate::pagination::types::{OrderDirection, Page, PageRequest};
use crate::storage::{Record, RecordId, RecordScope, RecordStore};

/// Items that can be paged by their identifier.
pub trait CursorKey {
    fn cursor_key(&self) -> RecordId;
}

impl CursorKey for Record {
    fn cursor_key(&self) -> RecordId {
        self.id
    }
}

/// An externally ordered sequence the engine can count and window.
pub trait WindowSource {
    type Item: CursorKey;

    /// Number of items in the whole sequence.
    fn total(&self) -> ServiceResult<u64>;

    /// Up to `limit` items ordered by key in `direction`, starting at
    /// `cursor` inclusive when one is given.
    fn window(
        &self,
        cursor: Option<RecordId>,
        direction: OrderDirection,
        limit: usize,
    ) -> ServiceResult<Vec<Self::Item>>;
}

/// A [`RecordStore`] narrowed to one base query.
pub struct ScopedRecords<'a, S: ?Sized> {
    store: &'a S,
    scope: RecordScope,
}

impl<'a, S: RecordStore + ?Sized> ScopedRecords<'a, S> {
    pub fn new(store: &'a S, scope: RecordScope) -> Self {
        Self { store, scope }
    }
}

impl<S: RecordStore + ?Sized> WindowSource for ScopedRecords<'_, S> {
    type Item = Record;

    fn total(&self) -> ServiceResult<u64> {
        Ok(self.store.count(&self.scope)?)
    }

    fn window(
        &self,
        cursor: Option<RecordId>,
        direction: OrderDirection,
        limit: usize,
    ) -> ServiceResult<Vec<Record>> {
        Ok(self.store.window(&self.scope, cursor, direction, limit)?)
    }
}

/// Produces the page described by `request`.
///
/// # Errors
/// - `EmptyResult` when the sequence holds no items at all
/// - any error raised by the source
pub fn paginate<W: WindowSource>(source: &W, request: &PageRequest) -> ServiceResult<Page<W::Item>> {
    let page_size = request.page_size();

    let total_records = source.total()?;
    if total_records == 0 {
        return Err(ServiceError::EmptyResult);
    }
    let total_pages = total_records.div_ceil(page_size as u64);

    let mut data = source.window(request.cursor(), request.direction(), page_size + 1)?;

    let continuation_token = if data.len() > page_size {
        let boundary = data[page_size].cursor_key();
        data.truncate(page_size);
        encode_cursor(boundary)
    } else {
        String::new()
    };

    tracing::debug!(
        page_size,
        returned = data.len(),
        total_records,
        last = continuation_token.is_empty(),
        "paginated"
    );

    Ok(Page {
        data,
        continuation_token,
        total_records,
        total_pages,
    })
}
