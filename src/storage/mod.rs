//! Record storage for databases, collections and documents.
//!
//! [`RecordStore`] is the seam to the relational backend. The service only
//! ever reads through `count`/`window`/`get` and mutates through
//! `insert`/`update`/`soft_delete`; [`MemoryRecordStore`] is the in-process
//! implementation.

mod error;
mod memory;
mod record;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryRecordStore;
pub use record::{
    MAX_NAME_LEN, NewRecord, Record, RecordId, RecordKind, RecordPatch, RecordScope,
};

use crate::pagination::OrderDirection;

/// Storage backend for metadata records.
///
/// Soft-deleted records are invisible to every read unless the scope asks
/// for them. Each call is its own read-committed query.
pub trait RecordStore: Send + Sync {
    /// Number of records matching `scope`.
    fn count(&self, scope: &RecordScope) -> StoreResult<u64>;

    /// Up to `limit` records matching `scope`, ordered by id in `direction`.
    ///
    /// With a cursor the window is inclusive: `id <= cursor` when descending,
    /// `id >= cursor` when ascending.
    fn window(
        &self,
        scope: &RecordScope,
        cursor: Option<RecordId>,
        direction: OrderDirection,
        limit: usize,
    ) -> StoreResult<Vec<Record>>;

    /// A live record by id.
    fn get(&self, kind: RecordKind, id: RecordId) -> StoreResult<Record>;

    fn insert(
        &self,
        kind: RecordKind,
        parent_id: Option<RecordId>,
        new: NewRecord,
    ) -> StoreResult<Record>;

    fn update(&self, kind: RecordKind, id: RecordId, patch: RecordPatch) -> StoreResult<Record>;

    /// Marks a live record deleted and returns its final state.
    fn soft_delete(&self, kind: RecordKind, id: RecordId) -> StoreResult<Record>;
}
