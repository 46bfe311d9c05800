use crate::pagination::OrderDirection;
use crate::storage::{
    NewRecord, Record, RecordId, RecordKind, RecordPatch, RecordScope, RecordStore, StoreError,
    StoreResult,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<RecordId, Record>,
    last_id: u64,
}

impl Table {
    fn next_id(&mut self, kind: RecordKind) -> StoreResult<RecordId> {
        let next = self
            .last_id
            .checked_add(1)
            .and_then(RecordId::new)
            .ok_or_else(|| StoreError::Unavailable(format!("{kind} identifiers exhausted")))?;
        self.last_id = next.get();
        Ok(next)
    }

    fn live(&self, kind: RecordKind, id: RecordId) -> StoreResult<&Record> {
        self.rows
            .get(&id)
            .filter(|record| !record.is_deleted())
            .ok_or(StoreError::NotFound { kind, id: id.get() })
    }

    fn name_taken(&self, parent_id: Option<RecordId>, name: &str, except: Option<RecordId>) -> bool {
        self.rows.values().any(|record| {
            !record.is_deleted()
                && record.parent_id == parent_id
                && record.name == name
                && Some(record.id) != except
        })
    }
}

#[derive(Debug, Default)]
struct Tables {
    databases: Table,
    collections: Table,
    documents: Table,
}

impl Tables {
    fn table(&self, kind: RecordKind) -> &Table {
        match kind {
            RecordKind::Database => &self.databases,
            RecordKind::Collection => &self.collections,
            RecordKind::Document => &self.documents,
        }
    }

    fn table_mut(&mut self, kind: RecordKind) -> &mut Table {
        match kind {
            RecordKind::Database => &mut self.databases,
            RecordKind::Collection => &mut self.collections,
            RecordKind::Document => &mut self.documents,
        }
    }
}

/// In-process record store keeping each table as an ordered map.
///
/// Ordered maps turn cursor windows into range scans. Every call takes the
/// lock once, so each query sees read-committed state; nothing spans calls.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn count(&self, scope: &RecordScope) -> StoreResult<u64> {
        let tables = self.tables.read();
        let count = tables
            .table(scope.kind)
            .rows
            .values()
            .filter(|record| scope.matches(record))
            .count();
        Ok(count as u64)
    }

    fn window(
        &self,
        scope: &RecordScope,
        cursor: Option<RecordId>,
        direction: OrderDirection,
        limit: usize,
    ) -> StoreResult<Vec<Record>> {
        let tables = self.tables.read();
        let rows = &tables.table(scope.kind).rows;

        let ordered: Box<dyn Iterator<Item = &Record> + '_> = match (direction, cursor) {
            (OrderDirection::Descending, Some(cursor)) => {
                Box::new(rows.range(..=cursor).rev().map(|(_, r)| r))
            }
            (OrderDirection::Descending, None) => Box::new(rows.values().rev()),
            (OrderDirection::Ascending, Some(cursor)) => {
                Box::new(rows.range(cursor..).map(|(_, r)| r))
            }
            (OrderDirection::Ascending, None) => Box::new(rows.values()),
        };

        Ok(ordered
            .filter(|record| scope.matches(record))
            .take(limit)
            .cloned()
            .collect())
    }

    fn get(&self, kind: RecordKind, id: RecordId) -> StoreResult<Record> {
        let tables = self.tables.read();
        tables.table(kind).live(kind, id).cloned()
    }

    fn insert(
        &self,
        kind: RecordKind,
        parent_id: Option<RecordId>,
        new: NewRecord,
    ) -> StoreResult<Record> {
        let mut tables = self.tables.write();
        let table = tables.table_mut(kind);

        if table.name_taken(parent_id, &new.name, None) {
            return Err(StoreError::Conflict {
                kind,
                name: new.name,
            });
        }

        let now = Utc::now();
        let record = Record {
            id: table.next_id(kind)?,
            kind,
            parent_id,
            name: new.name,
            description: new.description,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, kind: RecordKind, id: RecordId, patch: RecordPatch) -> StoreResult<Record> {
        let mut tables = self.tables.write();
        let table = tables.table_mut(kind);
        let parent_id = table.live(kind, id)?.parent_id;

        if let Some(name) = &patch.name {
            if table.name_taken(parent_id, name, Some(id)) {
                return Err(StoreError::Conflict {
                    kind,
                    name: name.clone(),
                });
            }
        }

        let record = table
            .rows
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind, id: id.get() })?;
        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(description) = patch.description {
            record.description = Some(description);
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn soft_delete(&self, kind: RecordKind, id: RecordId) -> StoreResult<Record> {
        let mut tables = self.tables.write();
        let table = tables.table_mut(kind);
        table.live(kind, id)?;

        let record = table
            .rows
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind, id: id.get() })?;
        let now = Utc::now();
        record.deleted_at = Some(now);
        record.updated_at = now;
        Ok(record.clone())
    }
}
